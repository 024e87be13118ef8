use glam::Vec3;

use crate::{
    binary_utils::lossy_string,
    decode::{decode_nested, Decode},
    layout::{BodyPartRecord, EyeBallRecord, ModelRecord},
    resolver::RecordRef,
    Result,
};

/// A group of interchangeable models, of which one is shown at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPart {
    pub name: String,
    pub base: i32,
    pub models: Vec<StudioModel>,
}

impl Decode for BodyPart {
    type Record = BodyPartRecord;

    const KIND: &'static str = "body parts";

    fn decode(record: RecordRef<'_, BodyPartRecord>) -> Result<Self> {
        Ok(Self {
            name: record.name(record.name_offset.get(), "body part name")?,
            base: record.base.get(),
            models: decode_nested(
                &record,
                record.model_count.get(),
                record.model_offset.get(),
            )?,
        })
    }
}

/// Render geometry metadata of one body part choice. Meshes and vertices live
/// in the companion files and are only referenced here.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioModel {
    pub name: String,
    pub kind: i32,
    pub bounding_radius: f32,

    pub mesh_count: i32,
    pub mesh_index: i32,

    pub vertex_count: i32,
    pub vertex_index: i32,
    pub tangents_index: i32,

    pub attachment_count: i32,
    pub attachment_index: i32,

    pub eyeballs: Vec<EyeBall>,
}

impl Decode for StudioModel {
    type Record = ModelRecord;

    const KIND: &'static str = "models";

    fn decode(record: RecordRef<'_, ModelRecord>) -> Result<Self> {
        Ok(Self {
            name: lossy_string(&record.name),
            kind: record.kind.get(),
            bounding_radius: record.bounding_radius.get(),

            mesh_count: record.meshes.count.get(),
            mesh_index: record.meshes.offset.get(),

            vertex_count: record.vertex_count.get(),
            vertex_index: record.vertex_offset.get(),
            tangents_index: record.tangents_offset.get(),

            attachment_count: record.attachments.count.get(),
            attachment_index: record.attachments.offset.get(),

            eyeballs: decode_nested(
                &record,
                record.eyeballs.count.get(),
                record.eyeballs.offset.get(),
            )?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EyeBall {
    pub name: String,
    pub bone: i32,
    pub texture: i32,
    pub origin: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    pub z_offset: f32,
    pub radius: f32,
    pub iris_scale: f32,
}

impl Decode for EyeBall {
    type Record = EyeBallRecord;

    const KIND: &'static str = "eyeballs";

    fn decode(record: RecordRef<'_, EyeBallRecord>) -> Result<Self> {
        Ok(Self {
            name: record.name(record.name_offset.get(), "eyeball name")?,
            bone: record.bone.get(),
            texture: record.texture.get(),
            origin: record.origin.get(),
            up: record.up.get(),
            forward: record.forward.get(),
            z_offset: record.z_offset.get(),
            radius: record.radius.get(),
            iris_scale: record.iris_scale.get(),
        })
    }
}
