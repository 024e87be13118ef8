use approx::assert_relative_eq;
use glam::{Quat, Vec3};
use plumber_test_utils::{
    offsets, patch_i32, read_i32, BBoxDef, BodyPartDef, BoneControllerDef, BoneDef, EyeBallDef,
    HitboxSetDef, MdlBuilder, ModelDef,
};

use super::*;
use crate::{BoneFlags, ReferenceSource};

fn decode(bytes: Vec<u8>) -> Result<Model> {
    Model::from_bytes(bytes, LoadOptions::default())
}

fn bbox(bone: i32, name: Option<&str>) -> BBoxDef {
    BBoxDef {
        name: name.map(str::to_owned),
        bone,
        group: 0,
        min: [-1.0, -2.0, -3.0],
        max: [1.0, 2.0, 3.0],
    }
}

fn eyeball(name: &str, bone: i32, texture: i32) -> EyeBallDef {
    EyeBallDef {
        name: name.to_owned(),
        bone,
        texture,
        origin: [1.0, 2.0, 3.0],
        up: [0.0, 0.0, 1.0],
        forward: [1.0, 0.0, 0.0],
        z_offset: 0.5,
        radius: 0.75,
        iris_scale: 1.5,
    }
}

#[test]
fn header_only_model_is_empty() {
    let model = decode(MdlBuilder::new("empty").build()).unwrap();

    assert_eq!(model.name(), "empty");
    assert_eq!(model.bone_count(), 0);
    assert!(model.bones().is_empty());
    assert_eq!(model.material_count(), 0);
    assert!(model.texture_paths().is_empty());
    assert!(model.bone_controllers().is_empty());
    assert!(model.body_parts().is_empty());
    assert!(model.hitbox_sets().is_empty());
    assert_eq!(model.surface_prop(), None);
    assert_eq!(model.key_values(), None);
    assert!(model.bone(0).is_none());
    assert!(model.texture(0).is_none());
    assert!(model.dangling_references().is_empty());
}

#[test]
fn zero_count_ignores_offset() {
    let mut bytes = MdlBuilder::new("x").build();
    patch_i32(&mut bytes, offsets::BONE_OFFSET, 0x7fff_0000);
    patch_i32(&mut bytes, offsets::TEXTURE_OFFSET, -500);

    let model = decode(bytes).unwrap();
    assert_eq!(model.bone_count(), 0);
    assert_eq!(model.material_count(), 0);
}

#[test]
fn rejects_bad_magic() {
    let mut builder = MdlBuilder::new("x");
    builder.id = *b"IDSV";

    assert_eq!(
        decode(builder.build()),
        Err(Error::BadMagic("IDSV".to_owned()))
    );
}

#[test]
fn rejects_bones_past_end() {
    let mut bytes = MdlBuilder::new("x").bone(BoneDef::new("root", -1)).build();
    let len = bytes.len();
    patch_i32(&mut bytes, offsets::BONE_COUNT, 1000);

    match decode(bytes) {
        Err(Error::OutOfBounds {
            what,
            base,
            size,
            len: buffer_len,
            ..
        }) => {
            assert_eq!(what, "bones");
            assert_eq!(base, 0);
            assert_eq!(size, 1000 * offsets::BONE_SIZE);
            assert_eq!(buffer_len, len);
        }
        other => panic!("expected out of bounds, got {other:?}"),
    }
}

#[test]
fn rejects_negative_count() {
    let mut bytes = MdlBuilder::new("x").build();
    patch_i32(&mut bytes, offsets::HITBOX_SET_COUNT, -1);

    assert_eq!(
        decode(bytes),
        Err(Error::NegativeCount {
            what: "hitbox sets",
            count: -1,
        })
    );
}

#[test]
fn rejects_array_without_offset() {
    let mut bytes = MdlBuilder::new("x").build();
    patch_i32(&mut bytes, offsets::BONE_CONTROLLER_COUNT, 2);

    assert_eq!(
        decode(bytes),
        Err(Error::MissingArray {
            what: "bone controllers",
            count: 2,
        })
    );
}

#[test]
fn rejects_name_past_end() {
    let mut bytes = MdlBuilder::new("x").texture("metal").build();
    let texture = read_i32(&bytes, offsets::TEXTURE_OFFSET) as usize;
    patch_i32(&mut bytes, texture, 1 << 20);

    assert!(matches!(
        decode(bytes),
        Err(Error::OutOfBounds {
            what: "texture name",
            ..
        })
    ));
}

#[test]
fn names_resolve_relative_to_record() {
    let mut bytes = MdlBuilder::new("x")
        .bone(BoneDef::new("rootbone", -1))
        .bone(BoneDef::new("child", 0))
        .build();
    let second = read_i32(&bytes, offsets::BONE_OFFSET) as usize + offsets::BONE_SIZE;
    patch_i32(&mut bytes, second, 0);

    let model = decode(bytes).unwrap();
    assert_eq!(model.bone(0).unwrap().name, "rootbone");
    assert_eq!(model.bone(1).unwrap().name, "");
}

#[test]
fn only_model_name_is_lowercased() {
    let model = decode(
        MdlBuilder::new("Player_MDL")
            .texture("Face_Diffuse")
            .texture_path("Models\\Player\\")
            .bone(BoneDef::new("ValveBiped.Bip01", -1))
            .build(),
    )
    .unwrap();

    assert_eq!(model.name(), "player_mdl");
    assert_eq!(model.texture(0).unwrap().name, "Face_Diffuse");
    assert_eq!(model.texture_paths(), ["Models\\Player\\"]);
    assert_eq!(model.bone(0).unwrap().name, "ValveBiped.Bip01");
}

#[test]
fn bone_lookup() {
    let model = decode(
        MdlBuilder::new("x")
            .bone(BoneDef::new("a", -1))
            .bone(BoneDef::new("b", 0))
            .bone(BoneDef::new("c", 1))
            .build(),
    )
    .unwrap();

    assert_eq!(model.bone_count(), 3);
    assert_eq!(model.bone(2).unwrap().name, "c");
    assert!(model.bone(3).is_none());
    assert!(model.bone(usize::MAX).is_none());
    assert_eq!(
        model.bones().keys().copied().collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn decodes_bones() {
    let mut spine = BoneDef::new("spine", 0);
    spine.position = [0.0, 0.0, 12.5];
    spine.quat = [0.0, 0.0, 0.707_106_77, 0.707_106_77];
    spine.flags = (BoneFlags::USED_BY_HITBOX | BoneFlags::USED_BY_VERTEX_LOD0).bits();
    spine.surface_prop = Some("flesh".to_owned());
    spine.contents = 1;

    let model = decode(
        MdlBuilder::new("x")
            .bone(BoneDef::new("root", -1))
            .bone(spine)
            .build(),
    )
    .unwrap();

    let root = model.bone(0).unwrap();
    assert!(root.is_root());
    assert_eq!(root.parent(), None);
    assert_eq!(root.surface_prop, None);
    assert_eq!(root.bone_controllers, [-1; 6]);

    let spine = model.bone(1).unwrap();
    assert_eq!(spine.parent(), Some(0));
    assert!(!spine.is_root());
    assert_eq!(spine.position, Vec3::new(0.0, 0.0, 12.5));
    assert_relative_eq!(
        spine.quat,
        Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        epsilon = 1e-6
    );
    assert!(spine.flags().contains(BoneFlags::USED_BY_HITBOX));
    assert!(spine.flags().contains(BoneFlags::USED_BY_VERTEX_LOD0));
    assert!(!spine.flags().contains(BoneFlags::PHYSICALLY_SIMULATED));
    assert_eq!(spine.surface_prop.as_deref(), Some("flesh"));
    assert_eq!(spine.contents, 1);
}

#[test]
fn decodes_bone_controllers() {
    let model = decode(
        MdlBuilder::new("x")
            .bone(BoneDef::new("jaw", -1))
            .bone_controller(BoneControllerDef {
                bone: 0,
                kind: 0x20,
                start: -30.0,
                end: 30.0,
                rest: 0,
                input_field: 2,
            })
            .build(),
    )
    .unwrap();

    let controller = &model.bone_controllers()[0];
    assert_eq!(controller.bone(), Some(0));
    assert_eq!(controller.kind, 0x20);
    assert_eq!(controller.start, -30.0);
    assert_eq!(controller.end, 30.0);
    assert_eq!(controller.input_field, 2);
}

#[test]
fn skeleton_with_hitboxes() {
    let model = decode(
        MdlBuilder::new("x")
            .bone(BoneDef::new("root", -1))
            .bone(BoneDef::new("child", 0))
            .hitbox_set(HitboxSetDef {
                name: "default".to_owned(),
                boxes: vec![bbox(0, Some("body")), bbox(1, None)],
            })
            .build(),
    )
    .unwrap();

    assert_eq!(model.bone(0).unwrap().parent, -1);
    assert_eq!(model.bone(1).unwrap().parent, 0);

    let [set] = model.hitbox_sets() else {
        panic!("expected one hitbox set");
    };
    assert_eq!(set.name, "default");
    assert_eq!(set.boxes.len(), 2);
    assert_eq!(set.boxes[0].name, "body");
    assert_eq!(set.boxes[0].bone, 0);
    assert_eq!(set.boxes[1].name, "");
    assert_eq!(set.boxes[1].bone, 1);
    assert_eq!(set.boxes[1].min, Vec3::new(-1.0, -2.0, -3.0));
    assert_eq!(set.boxes[1].max, Vec3::new(1.0, 2.0, 3.0));
    assert!(model.dangling_references().is_empty());
}

#[test]
fn multiple_hitbox_sets() {
    let model = decode(
        MdlBuilder::new("x")
            .bone(BoneDef::new("root", -1))
            .hitbox_set(HitboxSetDef {
                name: "default".to_owned(),
                boxes: vec![bbox(0, None)],
            })
            .hitbox_set(HitboxSetDef {
                name: "cheap".to_owned(),
                boxes: Vec::new(),
            })
            .build(),
    )
    .unwrap();

    let names: Vec<_> = model.hitbox_sets().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["default", "cheap"]);
    assert!(model.hitbox_sets()[1].boxes.is_empty());
}

#[test]
fn body_parts_with_eyeballs() {
    let model = decode(
        MdlBuilder::new("x")
            .bone(BoneDef::new("head", -1))
            .texture("eyeball_l")
            .body_part(BodyPartDef {
                name: "head".to_owned(),
                base: 1,
                models: vec![
                    ModelDef {
                        name: "head_reference".to_owned(),
                        kind: 0,
                        bounding_radius: 12.0,
                        vertex_count: 512,
                        eyeballs: vec![eyeball("eye_left", 0, 0)],
                    },
                    ModelDef {
                        name: "blank".to_owned(),
                        kind: 0,
                        bounding_radius: 0.0,
                        vertex_count: 0,
                        eyeballs: Vec::new(),
                    },
                ],
            })
            .build(),
    )
    .unwrap();

    let [part] = model.body_parts() else {
        panic!("expected one body part");
    };
    assert_eq!(part.name, "head");
    assert_eq!(part.base, 1);
    assert_eq!(part.models.len(), 2);

    let head = &part.models[0];
    assert_eq!(head.name, "head_reference");
    assert_eq!(head.bounding_radius, 12.0);
    assert_eq!(head.vertex_count, 512);

    let [eye] = head.eyeballs.as_slice() else {
        panic!("expected one eyeball");
    };
    assert_eq!(eye.name, "eye_left");
    assert_eq!(eye.bone, 0);
    assert_eq!(eye.texture, 0);
    assert_eq!(eye.origin, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(eye.forward, Vec3::X);
    assert_eq!(eye.radius, 0.75);
    assert_eq!(eye.iris_scale, 1.5);

    assert_eq!(part.models[1].name, "blank");
    assert!(part.models[1].eyeballs.is_empty());
}

#[test]
fn dangling_references_are_reported_not_clamped() {
    let model = decode(
        MdlBuilder::new("x")
            .bone(BoneDef::new("root", -1))
            .bone(BoneDef::new("orphan", 7))
            .bone_controller(BoneControllerDef {
                bone: -1,
                kind: 0,
                start: 0.0,
                end: 1.0,
                rest: 0,
                input_field: 0,
            })
            .hitbox_set(HitboxSetDef {
                name: "default".to_owned(),
                boxes: vec![bbox(-1, None)],
            })
            .body_part(BodyPartDef {
                name: "eyes".to_owned(),
                base: 1,
                models: vec![ModelDef {
                    name: "eyes".to_owned(),
                    kind: 0,
                    bounding_radius: 1.0,
                    vertex_count: 0,
                    eyeballs: vec![eyeball("eye", 0, 3)],
                }],
            })
            .build(),
    )
    .unwrap();

    assert_eq!(model.bone(1).unwrap().parent, 7);
    assert_eq!(model.bone(1).unwrap().parent(), Some(7));

    assert_eq!(
        model.dangling_references(),
        vec![
            DanglingReference {
                source: ReferenceSource::BoneParent { bone: 1 },
                index: 7,
            },
            DanglingReference {
                source: ReferenceSource::HitboxBone { set: 0, hitbox: 0 },
                index: -1,
            },
            DanglingReference {
                source: ReferenceSource::EyeBallTexture {
                    body_part: 0,
                    model: 0,
                    eyeball: 0,
                },
                index: 3,
            },
        ]
    );
}

#[test]
fn reference_validation_can_be_disabled() {
    let bytes = MdlBuilder::new("x").bone(BoneDef::new("b", 4)).build();
    let options = LoadOptions {
        validate_references: false,
        ..LoadOptions::default()
    };

    let model = Model::from_bytes(bytes, options).unwrap();
    assert_eq!(model.dangling_references().len(), 1);
}

#[test]
fn surface_prop_and_key_values() {
    let mut builder = MdlBuilder::new("x");
    builder.surface_prop = Some("metal".to_owned());
    builder.key_values = Some("mdlkeyvalue{prop_data{base \"Metal.Small\"}}".to_owned());

    let model = decode(builder.build()).unwrap();
    assert_eq!(model.surface_prop(), Some("metal"));
    assert_eq!(
        model.key_values(),
        Some("mdlkeyvalue{prop_data{base \"Metal.Small\"}}")
    );
}

#[test]
fn negative_key_value_size() {
    let mut bytes = MdlBuilder::new("x").build();
    patch_i32(&mut bytes, offsets::KEY_VALUE_SIZE, -4);

    assert_eq!(
        decode(bytes),
        Err(Error::NegativeCount {
            what: "key values",
            count: -4,
        })
    );
}

#[test]
fn sequence_and_animation_counts() {
    let mut builder = MdlBuilder::new("x");
    builder.local_sequence_count = 4;
    builder.local_animation_count = 9;

    let model = decode(builder.build()).unwrap();
    assert_eq!(model.sequence_count(), 4);
    assert_eq!(model.animation_count(), 9);
}

#[test]
fn static_prop_flag() {
    let mut builder = MdlBuilder::new("x");
    builder.flags = HeaderFlags::STATIC_PROP.bits();

    let model = decode(builder.build()).unwrap();
    assert!(model.is_static_prop());
    assert_eq!(model.flags(), HeaderFlags::STATIC_PROP);
}

#[test]
fn keeps_raw_data() {
    let bytes = MdlBuilder::new("x").texture("a").build();
    let model = decode(bytes.clone()).unwrap();

    assert_eq!(model.raw_data(), bytes.as_slice());
}

#[test]
fn decoding_is_deterministic() {
    let bytes = MdlBuilder::new("Deterministic")
        .bone(BoneDef::new("root", -1))
        .texture("skin")
        .hitbox_set(HitboxSetDef {
            name: "default".to_owned(),
            boxes: vec![bbox(0, Some("root"))],
        })
        .build();

    let first = decode(bytes.clone()).unwrap();
    let second = decode(bytes).unwrap();

    assert_eq!(first, second);
}

#[test]
fn root_and_spine_end_to_end() {
    let model = decode(
        MdlBuilder::new("skeleton")
            .bone(BoneDef::new("root", -1))
            .bone(BoneDef::new("spine", 0))
            .hitbox_set(HitboxSetDef {
                name: "default".to_owned(),
                boxes: vec![bbox(0, None)],
            })
            .build(),
    )
    .unwrap();

    assert_eq!(model.bone(1).unwrap().parent, 0);
    assert_eq!(model.hitbox_sets()[0].boxes[0].bone, 0);
    assert_eq!(model.materials().len(), 0);
}

#[test]
fn model_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Model>();
}

fn body_part_with_eyeball() -> Vec<u8> {
    MdlBuilder::new("x")
        .bone(BoneDef::new("head", -1))
        .texture("eye")
        .body_part(BodyPartDef {
            name: "head".to_owned(),
            base: 1,
            models: vec![ModelDef {
                name: "head_reference".to_owned(),
                kind: 0,
                bounding_radius: 1.0,
                vertex_count: 0,
                eyeballs: vec![eyeball("eye", 0, 0)],
            }],
        })
        .build()
}

fn assert_out_of_bounds(result: Result<Model>, expected: &str) {
    match result {
        Err(Error::OutOfBounds { what, .. }) => assert_eq!(what, expected),
        other => panic!("expected {expected} out of bounds, got {other:?}"),
    }
}

#[test]
fn rejects_hitboxes_past_end() {
    let mut bytes = MdlBuilder::new("x")
        .bone(BoneDef::new("root", -1))
        .hitbox_set(HitboxSetDef {
            name: "default".to_owned(),
            boxes: vec![bbox(0, None)],
        })
        .build();
    let set = read_i32(&bytes, offsets::HITBOX_SET_OFFSET) as usize;
    patch_i32(&mut bytes, set + 4, 100_000);

    assert_out_of_bounds(decode(bytes), "hitboxes");
}

#[test]
fn rejects_models_past_end() {
    let mut bytes = body_part_with_eyeball();
    let part = read_i32(&bytes, offsets::BODY_PART_OFFSET) as usize;
    patch_i32(&mut bytes, part + 4, 100_000);

    assert_out_of_bounds(decode(bytes), "models");
}

#[test]
fn rejects_eyeballs_past_end() {
    let mut bytes = body_part_with_eyeball();
    assert!(decode(bytes.clone()).is_ok());

    let part = read_i32(&bytes, offsets::BODY_PART_OFFSET) as usize;
    let model = part + read_i32(&bytes, part + 12) as usize;
    assert_eq!(read_i32(&bytes, model + 100), 1);
    patch_i32(&mut bytes, model + 100, 100_000);

    assert_out_of_bounds(decode(bytes), "eyeballs");
}

#[test]
fn rejects_key_values_without_offset() {
    let mut bytes = MdlBuilder::new("x").build();
    patch_i32(&mut bytes, offsets::KEY_VALUE_SIZE, 50);

    assert_eq!(
        decode(bytes),
        Err(Error::MissingArray {
            what: "key values",
            count: 50,
        })
    );
}

#[test]
fn rejects_key_values_past_end() {
    let mut bytes = MdlBuilder::new("x").build();
    patch_i32(&mut bytes, offsets::KEY_VALUE_OFFSET, 400);
    patch_i32(&mut bytes, offsets::KEY_VALUE_SIZE, 50);

    assert_out_of_bounds(decode(bytes), "key values");
}
