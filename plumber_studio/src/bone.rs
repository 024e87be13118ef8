use bitflags::bitflags;
use glam::{Quat, Vec3};

use crate::{decode::Decode, layout::BoneRecord, resolver::RecordRef, Result};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BoneFlags: i32 {
        const PHYSICALLY_SIMULATED = 0x0000_0001;
        const PHYSICS_PROCEDURAL = 0x0000_0002;
        const ALWAYS_PROCEDURAL = 0x0000_0004;
        const SCREEN_ALIGN_SPHERE = 0x0000_0008;
        const SCREEN_ALIGN_CYLINDER = 0x0000_0010;
        const USED_BY_HITBOX = 0x0000_0100;
        const USED_BY_ATTACHMENT = 0x0000_0200;
        const USED_BY_VERTEX_LOD0 = 0x0000_0400;
        const USED_BY_VERTEX_LOD1 = 0x0000_0800;
        const USED_BY_VERTEX_LOD2 = 0x0000_1000;
        const USED_BY_VERTEX_LOD3 = 0x0000_2000;
        const USED_BY_VERTEX_LOD4 = 0x0000_4000;
        const USED_BY_VERTEX_LOD5 = 0x0000_8000;
        const USED_BY_VERTEX_LOD6 = 0x0001_0000;
        const USED_BY_VERTEX_LOD7 = 0x0002_0000;
        const USED_BY_BONE_MERGE = 0x0004_0000;
        const FIXED_ALIGNMENT = 0x0010_0000;
        const HAS_SAVEFRAME_POS = 0x0020_0000;
        const HAS_SAVEFRAME_ROT = 0x0040_0000;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone, `-1` for a root bone.
    pub parent: i32,
    /// Bone controller driving each of the six degrees of freedom, `-1` if none.
    pub bone_controllers: [i32; 6],

    pub position: Vec3,
    pub quat: Quat,
    pub rotation: Vec3,
    pub position_scale: Vec3,
    pub rotation_scale: Vec3,
    /// Row-major 3x4 matrix.
    pub pose_to_bone: [f32; 12],
    pub alignment: Quat,

    pub flags: i32,
    pub procedural_type: i32,
    pub physics_bone: i32,
    pub surface_prop: Option<String>,
    pub contents: i32,
}

impl Bone {
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent.try_into().ok()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent == -1
    }

    #[must_use]
    pub fn flags(&self) -> BoneFlags {
        BoneFlags::from_bits_retain(self.flags)
    }
}

impl Decode for Bone {
    type Record = BoneRecord;

    const KIND: &'static str = "bones";

    fn decode(record: RecordRef<'_, BoneRecord>) -> Result<Self> {
        Ok(Self {
            name: record.name(record.name_offset.get(), "bone name")?,
            parent: record.parent.get(),
            bone_controllers: record.bone_controllers.map(|index| index.get()),

            position: record.position.get(),
            quat: record.quat.get(),
            rotation: record.rotation.get(),
            position_scale: record.position_scale.get(),
            rotation_scale: record.rotation_scale.get(),
            pose_to_bone: record.pose_to_bone.map(|value| value.get()),
            alignment: record.alignment.get(),

            flags: record.flags.get(),
            procedural_type: record.procedural_type.get(),
            physics_bone: record.physics_bone.get(),
            surface_prop: record.string(record.surface_prop_offset.get(), "bone surface prop")?,
            contents: record.contents.get(),
        })
    }
}
