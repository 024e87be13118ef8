use crate::{decode::Decode, layout::BoneControllerRecord, resolver::RecordRef, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneController {
    /// Controlled bone, `-1` if the controller is not attached to one.
    pub bone: i32,
    /// Motion type bits (X, Y, Z, XR, YR, ZR, M).
    pub kind: i32,
    pub start: f32,
    pub end: f32,
    pub rest: i32,
    pub input_field: i32,
}

impl BoneController {
    #[must_use]
    pub fn bone(&self) -> Option<usize> {
        self.bone.try_into().ok()
    }
}

impl Decode for BoneController {
    type Record = BoneControllerRecord;

    const KIND: &'static str = "bone controllers";

    fn decode(record: RecordRef<'_, BoneControllerRecord>) -> Result<Self> {
        Ok(Self {
            bone: record.bone.get(),
            kind: record.kind.get(),
            start: record.start.get(),
            end: record.end.get(),
            rest: record.rest.get(),
            input_field: record.input_field.get(),
        })
    }
}
