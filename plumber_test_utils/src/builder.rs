//! Writer for synthetic little-endian mdl files.
//!
//! Layout: header, then every top-level array, then nested arrays, then all
//! strings. Every name offset is relative to the record that holds it.

use byteorder::{ByteOrder, LittleEndian};

/// Byte offsets of header fields and record sizes.
pub mod offsets {
    pub const ID: usize = 0;
    pub const VERSION: usize = 4;
    pub const CHECKSUM: usize = 8;
    pub const NAME: usize = 12;
    pub const DATA_LENGTH: usize = 76;
    pub const EYE_POSITION: usize = 80;
    pub const ILLUM_POSITION: usize = 92;
    pub const HULL_MIN: usize = 104;
    pub const HULL_MAX: usize = 116;
    pub const VIEW_BB_MIN: usize = 128;
    pub const VIEW_BB_MAX: usize = 140;
    pub const FLAGS: usize = 152;
    pub const BONE_COUNT: usize = 156;
    pub const BONE_OFFSET: usize = 160;
    pub const BONE_CONTROLLER_COUNT: usize = 164;
    pub const BONE_CONTROLLER_OFFSET: usize = 168;
    pub const HITBOX_SET_COUNT: usize = 172;
    pub const HITBOX_SET_OFFSET: usize = 176;
    pub const LOCAL_ANIMATION_COUNT: usize = 180;
    pub const LOCAL_SEQUENCE_COUNT: usize = 188;
    pub const TEXTURE_COUNT: usize = 204;
    pub const TEXTURE_OFFSET: usize = 208;
    pub const TEXTURE_DIR_COUNT: usize = 212;
    pub const TEXTURE_DIR_OFFSET: usize = 216;
    pub const BODY_PART_COUNT: usize = 232;
    pub const BODY_PART_OFFSET: usize = 236;
    pub const SURFACE_PROP_OFFSET: usize = 308;
    pub const KEY_VALUE_OFFSET: usize = 312;
    pub const KEY_VALUE_SIZE: usize = 316;
    pub const MASS: usize = 328;
    pub const CONTENTS: usize = 332;

    pub const HEADER_SIZE: usize = 408;
    pub const BONE_SIZE: usize = 216;
    pub const BONE_CONTROLLER_SIZE: usize = 56;
    pub const HITBOX_SET_SIZE: usize = 12;
    pub const BBOX_SIZE: usize = 68;
    pub const BODY_PART_SIZE: usize = 16;
    pub const MODEL_SIZE: usize = 148;
    pub const EYEBALL_SIZE: usize = 172;
    pub const TEXTURE_SIZE: usize = 64;

    pub const NAME_LENGTH: usize = 64;
}

use offsets::*;

#[derive(Debug, Clone, PartialEq)]
pub struct BoneDef {
    pub name: String,
    pub parent: i32,
    pub flags: i32,
    pub contents: i32,
    pub position: [f32; 3],
    pub quat: [f32; 4],
    pub surface_prop: Option<String>,
}

impl BoneDef {
    pub fn new(name: &str, parent: i32) -> Self {
        Self {
            name: name.to_owned(),
            parent,
            flags: 0,
            contents: 0,
            position: [0.0; 3],
            quat: [0.0, 0.0, 0.0, 1.0],
            surface_prop: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneControllerDef {
    pub bone: i32,
    pub kind: i32,
    pub start: f32,
    pub end: f32,
    pub rest: i32,
    pub input_field: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDef {
    pub name: String,
    pub flags: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HitboxSetDef {
    pub name: String,
    pub boxes: Vec<BBoxDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BBoxDef {
    /// `None` writes a zero name offset.
    pub name: Option<String>,
    pub bone: i32,
    pub group: i32,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyPartDef {
    pub name: String,
    pub base: i32,
    pub models: Vec<ModelDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDef {
    pub name: String,
    pub kind: i32,
    pub bounding_radius: f32,
    pub vertex_count: i32,
    pub eyeballs: Vec<EyeBallDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EyeBallDef {
    pub name: String,
    pub bone: i32,
    pub texture: i32,
    pub origin: [f32; 3],
    pub up: [f32; 3],
    pub forward: [f32; 3],
    pub z_offset: f32,
    pub radius: f32,
    pub iris_scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MdlBuilder {
    pub id: [u8; 4],
    pub version: i32,
    pub checksum: i32,
    pub name: String,
    pub flags: i32,
    pub mass: f32,
    pub contents: i32,
    pub eye_position: [f32; 3],
    pub hull_min: [f32; 3],
    pub hull_max: [f32; 3],
    pub view_bb_min: [f32; 3],
    pub view_bb_max: [f32; 3],
    pub local_animation_count: i32,
    pub local_sequence_count: i32,
    pub textures: Vec<TextureDef>,
    pub texture_paths: Vec<String>,
    pub bones: Vec<BoneDef>,
    pub bone_controllers: Vec<BoneControllerDef>,
    pub hitbox_sets: Vec<HitboxSetDef>,
    pub body_parts: Vec<BodyPartDef>,
    pub surface_prop: Option<String>,
    pub key_values: Option<String>,
}

impl Default for MdlBuilder {
    fn default() -> Self {
        Self {
            id: *b"IDST",
            version: 48,
            checksum: 0,
            name: String::new(),
            flags: 0,
            mass: 0.0,
            contents: 0,
            eye_position: [0.0; 3],
            hull_min: [0.0; 3],
            hull_max: [0.0; 3],
            view_bb_min: [0.0; 3],
            view_bb_max: [0.0; 3],
            local_animation_count: 0,
            local_sequence_count: 0,
            textures: Vec::new(),
            texture_paths: Vec::new(),
            bones: Vec::new(),
            bone_controllers: Vec::new(),
            hitbox_sets: Vec::new(),
            body_parts: Vec::new(),
            surface_prop: None,
            key_values: None,
        }
    }
}

impl MdlBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    pub fn bone(mut self, bone: BoneDef) -> Self {
        self.bones.push(bone);
        self
    }

    pub fn texture(mut self, name: &str) -> Self {
        self.textures.push(TextureDef {
            name: name.to_owned(),
            flags: 0,
        });
        self
    }

    pub fn texture_path(mut self, path: &str) -> Self {
        self.texture_paths.push(path.to_owned());
        self
    }

    pub fn bone_controller(mut self, controller: BoneControllerDef) -> Self {
        self.bone_controllers.push(controller);
        self
    }

    pub fn hitbox_set(mut self, set: HitboxSetDef) -> Self {
        self.hitbox_sets.push(set);
        self
    }

    pub fn body_part(mut self, part: BodyPartDef) -> Self {
        self.body_parts.push(part);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut w = Writer::default();

        w.alloc(HEADER_SIZE);
        w.bytes[ID..ID + 4].copy_from_slice(&self.id);
        w.i32(VERSION, self.version);
        w.i32(CHECKSUM, self.checksum);
        w.fixed_name(NAME, &self.name);
        w.floats(EYE_POSITION, &self.eye_position);
        w.floats(HULL_MIN, &self.hull_min);
        w.floats(HULL_MAX, &self.hull_max);
        w.floats(VIEW_BB_MIN, &self.view_bb_min);
        w.floats(VIEW_BB_MAX, &self.view_bb_max);
        w.i32(FLAGS, self.flags);
        w.f32(MASS, self.mass);
        w.i32(CONTENTS, self.contents);
        w.i32(LOCAL_ANIMATION_COUNT, self.local_animation_count);
        w.i32(LOCAL_SEQUENCE_COUNT, self.local_sequence_count);

        self.write_textures(&mut w);
        self.write_bones(&mut w);
        self.write_bone_controllers(&mut w);
        self.write_hitbox_sets(&mut w);
        self.write_body_parts(&mut w);

        let dirs = w.array(TEXTURE_DIR_COUNT, self.texture_paths.len(), 4);
        for (i, path) in self.texture_paths.iter().enumerate() {
            w.string(dirs + i * 4, 0, path);
        }

        if let Some(surface_prop) = &self.surface_prop {
            w.string(SURFACE_PROP_OFFSET, 0, surface_prop);
        }

        if let Some(key_values) = &self.key_values {
            let at = w.alloc(key_values.len() + 1);
            w.bytes[at..at + key_values.len()].copy_from_slice(key_values.as_bytes());
            w.link(KEY_VALUE_OFFSET, 0, at);
            w.i32(KEY_VALUE_SIZE, to_i32(key_values.len() + 1));
        }

        w.finish()
    }

    fn write_textures(&self, w: &mut Writer) {
        let start = w.array(TEXTURE_COUNT, self.textures.len(), TEXTURE_SIZE);

        for (i, texture) in self.textures.iter().enumerate() {
            let at = start + i * TEXTURE_SIZE;
            w.string(at, at, &texture.name);
            w.i32(at + 4, texture.flags);
        }
    }

    fn write_bones(&self, w: &mut Writer) {
        let start = w.array(BONE_COUNT, self.bones.len(), BONE_SIZE);

        for (i, bone) in self.bones.iter().enumerate() {
            let at = start + i * BONE_SIZE;
            w.string(at, at, &bone.name);
            w.i32(at + 4, bone.parent);
            for controller in 0..6 {
                w.i32(at + 8 + controller * 4, -1);
            }
            w.floats(at + 32, &bone.position);
            w.floats(at + 44, &bone.quat);
            w.floats(at + 72, &[1.0; 3]);
            w.floats(at + 84, &[1.0; 3]);
            w.floats(at + 144, &[0.0, 0.0, 0.0, 1.0]);
            w.i32(at + 160, bone.flags);
            if let Some(surface_prop) = &bone.surface_prop {
                w.string(at + 176, at, surface_prop);
            }
            w.i32(at + 180, bone.contents);
        }
    }

    fn write_bone_controllers(&self, w: &mut Writer) {
        let start = w.array(
            BONE_CONTROLLER_COUNT,
            self.bone_controllers.len(),
            BONE_CONTROLLER_SIZE,
        );

        for (i, controller) in self.bone_controllers.iter().enumerate() {
            let at = start + i * BONE_CONTROLLER_SIZE;
            w.i32(at, controller.bone);
            w.i32(at + 4, controller.kind);
            w.f32(at + 8, controller.start);
            w.f32(at + 12, controller.end);
            w.i32(at + 16, controller.rest);
            w.i32(at + 20, controller.input_field);
        }
    }

    fn write_hitbox_sets(&self, w: &mut Writer) {
        let start = w.array(HITBOX_SET_COUNT, self.hitbox_sets.len(), HITBOX_SET_SIZE);

        for (i, set) in self.hitbox_sets.iter().enumerate() {
            let at = start + i * HITBOX_SET_SIZE;
            w.string(at, at, &set.name);

            let boxes = w.nested_array(at, at + 4, set.boxes.len(), BBOX_SIZE);
            for (j, bbox) in set.boxes.iter().enumerate() {
                let box_at = boxes + j * BBOX_SIZE;
                w.i32(box_at, bbox.bone);
                w.i32(box_at + 4, bbox.group);
                w.floats(box_at + 8, &bbox.min);
                w.floats(box_at + 20, &bbox.max);
                if let Some(name) = &bbox.name {
                    w.string(box_at + 32, box_at, name);
                }
            }
        }
    }

    fn write_body_parts(&self, w: &mut Writer) {
        let start = w.array(BODY_PART_COUNT, self.body_parts.len(), BODY_PART_SIZE);

        for (i, part) in self.body_parts.iter().enumerate() {
            let at = start + i * BODY_PART_SIZE;
            w.string(at, at, &part.name);
            w.i32(at + 8, part.base);

            // count at +4, offset at +12: not a contiguous pair
            w.i32(at + 4, to_i32(part.models.len()));
            if part.models.is_empty() {
                continue;
            }
            let models = w.alloc(part.models.len() * MODEL_SIZE);
            w.link(at + 12, at, models);

            for (j, model) in part.models.iter().enumerate() {
                let model_at = models + j * MODEL_SIZE;
                w.fixed_name(model_at, &model.name);
                w.i32(model_at + 64, model.kind);
                w.f32(model_at + 68, model.bounding_radius);
                w.i32(model_at + 80, model.vertex_count);

                let eyeballs =
                    w.nested_array(model_at, model_at + 100, model.eyeballs.len(), EYEBALL_SIZE);
                for (k, eyeball) in model.eyeballs.iter().enumerate() {
                    let eye_at = eyeballs + k * EYEBALL_SIZE;
                    w.string(eye_at, eye_at, &eyeball.name);
                    w.i32(eye_at + 4, eyeball.bone);
                    w.floats(eye_at + 8, &eyeball.origin);
                    w.f32(eye_at + 20, eyeball.z_offset);
                    w.f32(eye_at + 24, eyeball.radius);
                    w.floats(eye_at + 28, &eyeball.up);
                    w.floats(eye_at + 40, &eyeball.forward);
                    w.i32(eye_at + 52, eyeball.texture);
                    w.f32(eye_at + 60, eyeball.iris_scale);
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct Writer {
    bytes: Vec<u8>,
    strings: Vec<PendingString>,
}

#[derive(Debug)]
struct PendingString {
    field: usize,
    base: usize,
    value: String,
}

impl Writer {
    fn alloc(&mut self, size: usize) -> usize {
        let at = self.bytes.len();
        self.bytes.resize(at + size, 0);
        at
    }

    fn i32(&mut self, at: usize, value: i32) {
        LittleEndian::write_i32(&mut self.bytes[at..at + 4], value);
    }

    fn f32(&mut self, at: usize, value: f32) {
        LittleEndian::write_f32(&mut self.bytes[at..at + 4], value);
    }

    fn floats(&mut self, at: usize, values: &[f32]) {
        for (i, &value) in values.iter().enumerate() {
            self.f32(at + i * 4, value);
        }
    }

    fn fixed_name(&mut self, at: usize, name: &str) {
        let len = name.len().min(NAME_LENGTH - 1);
        self.bytes[at..at + len].copy_from_slice(&name.as_bytes()[..len]);
    }

    /// Writes `target - base` into `field`.
    fn link(&mut self, field: usize, base: usize, target: usize) {
        let offset = i64::try_from(target).unwrap() - i64::try_from(base).unwrap();
        self.i32(field, i32::try_from(offset).unwrap());
    }

    /// Allocates a header level array and writes its `(count, offset)` pair.
    fn array(&mut self, descriptor: usize, count: usize, size: usize) -> usize {
        self.nested_array(0, descriptor, count, size)
    }

    /// Allocates an array and writes its `(count, offset)` pair relative to
    /// `base`. Empty arrays are written as `(0, 0)`.
    fn nested_array(&mut self, base: usize, descriptor: usize, count: usize, size: usize) -> usize {
        let at = self.alloc(count * size);
        self.i32(descriptor, to_i32(count));
        if count > 0 {
            self.link(descriptor + 4, base, at);
        }
        at
    }

    fn string(&mut self, field: usize, base: usize, value: &str) {
        self.strings.push(PendingString {
            field,
            base,
            value: value.to_owned(),
        });
    }

    fn finish(mut self) -> Vec<u8> {
        for pending in std::mem::take(&mut self.strings) {
            let at = self.alloc(pending.value.len() + 1);
            self.bytes[at..at + pending.value.len()].copy_from_slice(pending.value.as_bytes());
            self.link(pending.field, pending.base, at);
        }

        let len = to_i32(self.bytes.len());
        self.i32(DATA_LENGTH, len);
        self.bytes
    }
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap()
}

/// Overwrites the little-endian `i32` at `at`.
pub fn patch_i32(bytes: &mut [u8], at: usize, value: i32) {
    LittleEndian::write_i32(&mut bytes[at..at + 4], value);
}

pub fn read_i32(bytes: &[u8], at: usize) -> i32 {
    LittleEndian::read_i32(&bytes[at..at + 4])
}
