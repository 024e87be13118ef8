//! On-disk record layouts of the mdl format.
//!
//! All records are little-endian and unaligned, so they can be viewed directly
//! from any position of the file buffer. Pointer-sized fields are 32 bits wide
//! on disk and never dereferenced.

use std::mem::size_of;

use byteorder::LittleEndian;
use glam::{Quat, Vec3};
use zerocopy::{
    byteorder::{I32, U32},
    FromBytes, Unaligned,
};

pub const MAGIC: [u8; 4] = *b"IDST";
pub const SUPPORTED_VERSIONS: std::ops::RangeInclusive<i32> = 44..=49;

pub const HEADER_SIZE: usize = 408;
pub const NAME_LENGTH: usize = 64;

pub type Int = I32<LittleEndian>;

#[derive(Debug, Clone, Copy, FromBytes, Unaligned)]
#[repr(C)]
pub struct Float(U32<LittleEndian>);

impl Float {
    pub fn get(self) -> f32 {
        f32::from_bits(self.0.get())
    }
}

#[derive(Debug, Clone, Copy, FromBytes, Unaligned)]
#[repr(C)]
pub struct Vector([Float; 3]);

impl Vector {
    pub fn get(self) -> Vec3 {
        let [x, y, z] = self.0;
        Vec3::new(x.get(), y.get(), z.get())
    }
}

#[derive(Debug, Clone, Copy, FromBytes, Unaligned)]
#[repr(C)]
pub struct Quaternion([Float; 4]);

impl Quaternion {
    pub fn get(self) -> Quat {
        let [x, y, z, w] = self.0;
        Quat::from_xyzw(x.get(), y.get(), z.get(), w.get())
    }
}

/// `(count, offset)` array descriptor.
#[derive(Debug, Clone, Copy, FromBytes, Unaligned)]
#[repr(C)]
pub struct ArrayDescriptor {
    pub count: Int,
    pub offset: Int,
}

// Padding and on-disk pointer fields are never read.
#[allow(dead_code)]
#[derive(Debug, FromBytes, Unaligned)]
#[repr(C)]
pub struct HeaderRecord {
    pub id: [u8; 4],
    pub version: Int,
    pub checksum: Int,
    pub name: [u8; NAME_LENGTH],
    pub data_length: Int,

    pub eye_position: Vector,
    pub illum_position: Vector,
    pub hull_min: Vector,
    pub hull_max: Vector,
    pub view_bb_min: Vector,
    pub view_bb_max: Vector,

    pub flags: Int,

    pub bones: ArrayDescriptor,
    pub bone_controllers: ArrayDescriptor,
    pub hitbox_sets: ArrayDescriptor,
    pub local_animations: ArrayDescriptor,
    pub local_sequences: ArrayDescriptor,

    pub activity_list_version: Int,
    pub events_indexed: Int,

    pub textures: ArrayDescriptor,
    pub texture_dirs: ArrayDescriptor,

    pub skin_reference_count: Int,
    pub skin_family_count: Int,
    pub skin_family_offset: Int,

    pub body_parts: ArrayDescriptor,
    pub attachments: ArrayDescriptor,

    pub local_node_count: Int,
    pub local_node_offset: Int,
    pub local_node_name_offset: Int,

    pub flex_descs: ArrayDescriptor,
    pub flex_controllers: ArrayDescriptor,
    pub flex_rules: ArrayDescriptor,
    pub ik_chains: ArrayDescriptor,
    pub mouths: ArrayDescriptor,
    pub local_pose_params: ArrayDescriptor,

    pub surface_prop_offset: Int,

    pub key_value_offset: Int,
    pub key_value_size: Int,

    pub ik_locks: ArrayDescriptor,

    pub mass: Float,
    pub contents: Int,

    pub include_models: ArrayDescriptor,

    pub virtual_model_p: Int,

    pub anim_block_name_offset: Int,
    pub anim_blocks: ArrayDescriptor,
    pub anim_block_model_p: Int,

    pub bone_table_by_name_offset: Int,

    pub vertex_base_p: Int,
    pub index_base_p: Int,

    pub constant_directional_light_dot: u8,
    pub root_lod: u8,
    pub allowed_root_lod_count: u8,
    pub unused: u8,

    pub unused_4: Int,

    pub flex_controller_uis: ArrayDescriptor,

    pub vert_anim_fixed_point_scale: Float,
    pub unused_3: Int,

    pub header_2_offset: Int,
    pub unused_2: Int,
}

#[allow(dead_code)]
#[derive(Debug, FromBytes, Unaligned)]
#[repr(C)]
pub struct BoneRecord {
    pub name_offset: Int,
    pub parent: Int,
    pub bone_controllers: [Int; 6],

    pub position: Vector,
    pub quat: Quaternion,
    pub rotation: Vector,
    pub position_scale: Vector,
    pub rotation_scale: Vector,

    pub pose_to_bone: [Float; 12],

    pub alignment: Quaternion,

    pub flags: Int,
    pub procedural_type: Int,
    pub procedural_offset: Int,
    pub physics_bone: Int,
    pub surface_prop_offset: Int,
    pub contents: Int,

    pub unused: [Int; 8],
}

#[allow(dead_code)]
#[derive(Debug, FromBytes, Unaligned)]
#[repr(C)]
pub struct BoneControllerRecord {
    pub bone: Int,
    pub kind: Int,
    pub start: Float,
    pub end: Float,
    pub rest: Int,
    pub input_field: Int,
    pub unused: [Int; 8],
}

#[derive(Debug, FromBytes, Unaligned)]
#[repr(C)]
pub struct HitboxSetRecord {
    pub name_offset: Int,
    pub hitboxes: ArrayDescriptor,
}

#[allow(dead_code)]
#[derive(Debug, FromBytes, Unaligned)]
#[repr(C)]
pub struct BBoxRecord {
    pub bone: Int,
    pub group: Int,
    pub min: Vector,
    pub max: Vector,
    pub name_offset: Int,
    pub unused: [Int; 8],
}

#[derive(Debug, FromBytes, Unaligned)]
#[repr(C)]
pub struct BodyPartRecord {
    pub name_offset: Int,
    pub model_count: Int,
    pub base: Int,
    pub model_offset: Int,
}

#[allow(dead_code)]
#[derive(Debug, FromBytes, Unaligned)]
#[repr(C)]
pub struct ModelRecord {
    pub name: [u8; NAME_LENGTH],
    pub kind: Int,
    pub bounding_radius: Float,

    pub meshes: ArrayDescriptor,

    pub vertex_count: Int,
    pub vertex_offset: Int,
    pub tangents_offset: Int,

    pub attachments: ArrayDescriptor,
    pub eyeballs: ArrayDescriptor,

    pub vertex_data_p: Int,
    pub tangent_data_p: Int,

    pub unused: [Int; 8],
}

#[allow(dead_code)]
#[derive(Debug, FromBytes, Unaligned)]
#[repr(C)]
pub struct EyeBallRecord {
    pub name_offset: Int,
    pub bone: Int,
    pub origin: Vector,
    pub z_offset: Float,
    pub radius: Float,
    pub up: Vector,
    pub forward: Vector,
    pub texture: Int,

    pub unused_1: Int,
    pub iris_scale: Float,
    pub unused_2: Int,

    pub upper_flex_descs: [Int; 3],
    pub lower_flex_descs: [Int; 3],
    pub upper_targets: [Float; 3],
    pub lower_targets: [Float; 3],

    pub upper_lid_flex_desc: Int,
    pub lower_lid_flex_desc: Int,
    pub unused: [Int; 4],
    pub non_facs: u8,
    pub unused_3: [u8; 3],
    pub unused_4: [Int; 7],
}

#[allow(dead_code)]
#[derive(Debug, FromBytes, Unaligned)]
#[repr(C)]
pub struct TextureRecord {
    pub name_offset: Int,
    pub flags: Int,
    pub used: Int,
    pub unused_1: Int,
    pub material_p: Int,
    pub client_material_p: Int,
    pub unused: [Int; 10],
}

const _: () = assert!(size_of::<HeaderRecord>() == HEADER_SIZE);
const _: () = assert!(size_of::<BoneRecord>() == 216);
const _: () = assert!(size_of::<BoneControllerRecord>() == 56);
const _: () = assert!(size_of::<HitboxSetRecord>() == 12);
const _: () = assert!(size_of::<BBoxRecord>() == 68);
const _: () = assert!(size_of::<BodyPartRecord>() == 16);
const _: () = assert!(size_of::<ModelRecord>() == 148);
const _: () = assert!(size_of::<EyeBallRecord>() == 172);
const _: () = assert!(size_of::<TextureRecord>() == 64);
