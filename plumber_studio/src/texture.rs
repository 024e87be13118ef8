use itertools::Itertools;

use crate::{
    decode::Decode,
    header::Section,
    layout::{Int, TextureRecord},
    resolver::{OffsetResolver, RecordRef},
    Result,
};

/// An entry of the texture table. Names are material paths relative to one of
/// the model's texture search paths, in their original case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Texture {
    pub name: String,
    pub flags: i32,
}

impl Decode for Texture {
    type Record = TextureRecord;

    const KIND: &'static str = "textures";

    fn decode(record: RecordRef<'_, TextureRecord>) -> Result<Self> {
        Ok(Self {
            name: record.name(record.name_offset.get(), "texture name")?,
            flags: record.flags.get(),
        })
    }
}

/// Decodes the texture search path table, an array of file-relative string
/// offsets.
pub(crate) fn decode_texture_paths(
    resolver: OffsetResolver<'_>,
    section: Section,
) -> Result<Vec<String>> {
    resolver
        .records::<Int>(0, section.count, section.offset, "texture paths")?
        .iter()
        .map(|offset| resolver.name(0, offset.get(), "texture path"))
        .try_collect()
}
