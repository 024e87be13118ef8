use std::{collections::BTreeMap, path::Path};

use glam::Vec3;
use itertools::Itertools;
use tracing::{debug, debug_span, warn};

use crate::{
    binary_utils::lossy_string,
    body_part::BodyPart,
    bone::Bone,
    bone_controller::BoneController,
    buffer::RawBuffer,
    decode::{decode_section, Decode},
    header::{Header, HeaderFlags},
    hitbox::HitboxSet,
    layout::BoneRecord,
    references::{find_dangling, DanglingReference},
    resolver::OffsetResolver,
    texture::{decode_texture_paths, Texture},
    Error, LoadOptions, Result,
};

/// A fully decoded studio model.
///
/// Constructed in a single pass from a complete file buffer and immutable
/// afterwards. The buffer itself is retained and available through
/// [`raw_data`](Self::raw_data).
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    header: Header,
    bones: BTreeMap<usize, Bone>,
    bone_controllers: Vec<BoneController>,
    body_parts: Vec<BodyPart>,
    hitbox_sets: Vec<HitboxSet>,
    textures: Vec<Texture>,
    texture_paths: Vec<String>,
    surface_prop: Option<String>,
    key_values: Option<String>,
    raw: RawBuffer,
}

impl Model {
    /// Reads and decodes the mdl file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if reading the file fails or if the file is malformed.
    pub fn load(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let _span = debug_span!("load", path = %path.display()).entered();

        let raw = RawBuffer::read(path)?;
        Self::decode(raw, options)
    }

    /// Decodes an already buffered mdl file.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer is malformed.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, options: LoadOptions) -> Result<Self> {
        Self::decode(RawBuffer::from(bytes.into()), options)
    }

    /// Decodes `raw`, taking ownership of it.
    ///
    /// # Errors
    ///
    /// Returns `Err` on the first structural violation found. No partially
    /// decoded model is returned.
    pub fn decode(raw: RawBuffer, options: LoadOptions) -> Result<Self> {
        let _span = debug_span!("decode", len = raw.len()).entered();

        let resolver = raw.resolver();
        let header = Header::decode(resolver, options)?;

        let textures = decode_section(resolver, header.textures)?;
        let texture_paths = decode_texture_paths(resolver, header.texture_dirs)?;
        let bones = decode_bones(resolver, &header)?;
        let bone_controllers = decode_section(resolver, header.bone_controllers)?;
        let body_parts = decode_section(resolver, header.body_parts)?;
        let hitbox_sets = decode_section(resolver, header.hitbox_sets)?;

        let surface_prop = resolver.string(0, header.surface_prop_offset, "surface prop")?;
        let key_values = decode_key_values(resolver, &header)?;

        debug!(
            textures = textures.len(),
            bones = bones.len(),
            bone_controllers = bone_controllers.len(),
            body_parts = body_parts.len(),
            hitbox_sets = hitbox_sets.len(),
            "decoded model"
        );

        let model = Self {
            header,
            bones,
            bone_controllers,
            body_parts,
            hitbox_sets,
            textures,
            texture_paths,
            surface_prop,
            key_values,
            raw,
        };

        if options.validate_references {
            for reference in model.dangling_references() {
                warn!(model = %model.name(), "{}", reference);
            }
        }

        Ok(model)
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Lower-cased model name from the header.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.header.name
    }

    #[must_use]
    pub fn version(&self) -> i32 {
        self.header.version
    }

    #[must_use]
    pub fn checksum(&self) -> i32 {
        self.header.checksum
    }

    #[must_use]
    pub fn flags(&self) -> HeaderFlags {
        self.header.flags
    }

    #[must_use]
    pub fn is_static_prop(&self) -> bool {
        self.header.flags.contains(HeaderFlags::STATIC_PROP)
    }

    #[must_use]
    pub fn hull_min(&self) -> Vec3 {
        self.header.hull_min
    }

    #[must_use]
    pub fn hull_max(&self) -> Vec3 {
        self.header.hull_max
    }

    #[must_use]
    pub fn mass(&self) -> f32 {
        self.header.mass
    }

    /// Returns the bone at `index`, `None` if it wasn't decoded.
    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(&index)
    }

    #[must_use]
    pub fn bones(&self) -> &BTreeMap<usize, Bone> {
        &self.bones
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Returns the texture at `index`, `None` if out of range.
    #[must_use]
    pub fn texture(&self, index: usize) -> Option<&Texture> {
        self.textures.get(index)
    }

    #[must_use]
    pub fn materials(&self) -> &[Texture] {
        &self.textures
    }

    #[must_use]
    pub fn material_count(&self) -> usize {
        self.textures.len()
    }

    /// Directories searched, in order, for the materials named by the
    /// texture table.
    #[must_use]
    pub fn texture_paths(&self) -> &[String] {
        &self.texture_paths
    }

    #[must_use]
    pub fn bone_controllers(&self) -> &[BoneController] {
        &self.bone_controllers
    }

    #[must_use]
    pub fn body_parts(&self) -> &[BodyPart] {
        &self.body_parts
    }

    #[must_use]
    pub fn hitbox_sets(&self) -> &[HitboxSet] {
        &self.hitbox_sets
    }

    #[must_use]
    pub fn surface_prop(&self) -> Option<&str> {
        self.surface_prop.as_deref()
    }

    #[must_use]
    pub fn key_values(&self) -> Option<&str> {
        self.key_values.as_deref()
    }

    /// Number of local sequences. Their payload is not decoded.
    #[must_use]
    pub fn sequence_count(&self) -> i32 {
        self.header.local_sequences.count
    }

    /// Number of local animations. Their payload is not decoded.
    #[must_use]
    pub fn animation_count(&self) -> i32 {
        self.header.local_animations.count
    }

    /// The complete file contents the model was decoded from.
    #[must_use]
    pub fn raw_data(&self) -> &[u8] {
        self.raw.as_bytes()
    }

    /// Lists every stored index that doesn't point at an existing bone or
    /// texture.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        find_dangling(self)
    }
}

fn decode_bones(resolver: OffsetResolver<'_>, header: &Header) -> Result<BTreeMap<usize, Bone>> {
    resolver
        .records::<BoneRecord>(0, header.bones.count, header.bones.offset, Bone::KIND)?
        .iter()
        .enumerate()
        .map(|(i, record)| Bone::decode(record).map(|bone| (i, bone)))
        .try_collect()
}

fn decode_key_values(resolver: OffsetResolver<'_>, header: &Header) -> Result<Option<String>> {
    let size: usize = header
        .key_value_size
        .try_into()
        .map_err(|_| Error::NegativeCount {
            what: "key values",
            count: header.key_value_size,
        })?;
    if size == 0 {
        return Ok(None);
    }

    resolver
        .bytes(0, header.key_value_offset, size, "key values")?
        .map(|bytes| Some(lossy_string(bytes)))
        .ok_or(Error::MissingArray {
            what: "key values",
            count: size,
        })
}

#[cfg(test)]
mod tests;
