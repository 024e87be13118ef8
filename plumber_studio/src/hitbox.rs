use glam::Vec3;

use crate::{
    decode::{decode_nested, Decode},
    layout::{BBoxRecord, HitboxSetRecord},
    resolver::RecordRef,
    Result,
};

/// A named group of hitboxes.
#[derive(Debug, Clone, PartialEq)]
pub struct HitboxSet {
    pub name: String,
    pub boxes: Vec<BBox>,
}

impl Decode for HitboxSet {
    type Record = HitboxSetRecord;

    const KIND: &'static str = "hitbox sets";

    fn decode(record: RecordRef<'_, HitboxSetRecord>) -> Result<Self> {
        Ok(Self {
            name: record.name(record.name_offset.get(), "hitbox set name")?,
            boxes: decode_nested(
                &record,
                record.hitboxes.count.get(),
                record.hitboxes.offset.get(),
            )?,
        })
    }
}

/// An axis-aligned hitbox in the space of its bone.
#[derive(Debug, Clone, PartialEq)]
pub struct BBox {
    pub name: String,
    pub bone: i32,
    /// Intersection group.
    pub group: i32,
    pub min: Vec3,
    pub max: Vec3,
}

impl Decode for BBox {
    type Record = BBoxRecord;

    const KIND: &'static str = "hitboxes";

    fn decode(record: RecordRef<'_, BBoxRecord>) -> Result<Self> {
        Ok(Self {
            name: record.name(record.name_offset.get(), "hitbox name")?,
            bone: record.bone.get(),
            group: record.group.get(),
            min: record.min.get(),
            max: record.max.get(),
        })
    }
}
