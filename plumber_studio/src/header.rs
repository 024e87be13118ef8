use bitflags::bitflags;
use glam::Vec3;
use tracing::{debug, warn};

use crate::{
    binary_utils::lossy_string,
    layout::{ArrayDescriptor, HeaderRecord, HEADER_SIZE, MAGIC, SUPPORTED_VERSIONS},
    resolver::{OffsetResolver, RecordRef},
    Error, LoadOptions, Result,
};

/// A top-level `(count, offset)` pair. The offset is relative to the start of
/// the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Section {
    pub count: i32,
    pub offset: i32,
}

impl Section {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl From<ArrayDescriptor> for Section {
    fn from(descriptor: ArrayDescriptor) -> Self {
        Self {
            count: descriptor.count.get(),
            offset: descriptor.offset.get(),
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HeaderFlags: i32 {
        const AUTO_GENERATED_HITBOX = 1 << 0;
        const USES_ENV_CUBEMAP = 1 << 1;
        const FORCE_OPAQUE = 1 << 2;
        const TRANSLUCENT_TWO_PASS = 1 << 3;
        const STATIC_PROP = 1 << 4;
        const USES_FB_TEXTURE = 1 << 5;
        const HAS_SHADOW_LOD = 1 << 6;
        const USES_BUMP_MAPPING = 1 << 7;
        const USE_SHADOW_LOD_MATERIALS = 1 << 8;
        const OBSOLETE = 1 << 9;
        const UNUSED = 1 << 10;
        const NO_FORCED_FADE = 1 << 11;
        const FORCE_PHONEME_CROSS_FADE = 1 << 12;
        const CONSTANT_DIRECTIONAL_LIGHT_DOT = 1 << 13;
        const FLEXES_CONVERTED = 1 << 14;
        const BUILT_IN_PREVIEW_MODE = 1 << 15;
        const AMBIENT_BOOST = 1 << 16;
        const DO_NOT_CAST_SHADOWS = 1 << 17;
        const CAST_TEXTURE_SHADOWS = 1 << 18;
    }
}

/// Scalar fields and section descriptors of the leading mdl record.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub id: [u8; 4],
    pub version: i32,
    pub checksum: i32,
    /// Model name, ASCII lower-cased.
    pub name: String,
    pub data_length: i32,

    pub eye_position: Vec3,
    pub illum_position: Vec3,
    pub hull_min: Vec3,
    pub hull_max: Vec3,
    pub view_bb_min: Vec3,
    pub view_bb_max: Vec3,

    pub flags: HeaderFlags,
    pub mass: f32,
    pub contents: i32,

    pub textures: Section,
    pub texture_dirs: Section,
    pub bones: Section,
    pub bone_controllers: Section,
    pub hitbox_sets: Section,
    pub body_parts: Section,
    pub local_animations: Section,
    pub local_sequences: Section,
    pub attachments: Section,
    pub include_models: Section,

    pub surface_prop_offset: i32,
    pub key_value_offset: i32,
    pub key_value_size: i32,
}

impl Header {
    pub(crate) fn decode(resolver: OffsetResolver, options: LoadOptions) -> Result<Self> {
        let record = Self::record(resolver)?;
        let version = record.version.get();

        if !SUPPORTED_VERSIONS.contains(&version) {
            if options.strict_version {
                return Err(Error::UnsupportedVersion(version));
            }
            warn!(version, "unknown mdl version, decoding anyway");
        }

        let header = Self {
            id: record.id,
            version,
            checksum: record.checksum.get(),
            name: lossy_string(&record.name).to_ascii_lowercase(),
            data_length: record.data_length.get(),

            eye_position: record.eye_position.get(),
            illum_position: record.illum_position.get(),
            hull_min: record.hull_min.get(),
            hull_max: record.hull_max.get(),
            view_bb_min: record.view_bb_min.get(),
            view_bb_max: record.view_bb_max.get(),

            flags: HeaderFlags::from_bits_retain(record.flags.get()),
            mass: record.mass.get(),
            contents: record.contents.get(),

            textures: record.textures.into(),
            texture_dirs: record.texture_dirs.into(),
            bones: record.bones.into(),
            bone_controllers: record.bone_controllers.into(),
            hitbox_sets: record.hitbox_sets.into(),
            body_parts: record.body_parts.into(),
            local_animations: record.local_animations.into(),
            local_sequences: record.local_sequences.into(),
            attachments: record.attachments.into(),
            include_models: record.include_models.into(),

            surface_prop_offset: record.surface_prop_offset.get(),
            key_value_offset: record.key_value_offset.get(),
            key_value_size: record.key_value_size.get(),
        };

        debug!(
            name = %header.name,
            version,
            checksum = header.checksum,
            bones = header.bones.count,
            textures = header.textures.count,
            body_parts = header.body_parts.count,
            hitbox_sets = header.hitbox_sets.count,
            "decoded header"
        );

        Ok(header)
    }

    /// Checks the signature before the length, so a foreign file is reported
    /// as such even when it is shorter than a header.
    fn record(resolver: OffsetResolver) -> Result<RecordRef<HeaderRecord>> {
        let available = resolver.len();

        let signature = resolver
            .record::<[u8; 4]>(0, "signature")
            .map_err(|_| Error::Truncated {
                what: "signature",
                needed: MAGIC.len(),
                available,
            })?;

        if *signature != MAGIC {
            return Err(Error::BadMagic(
                String::from_utf8_lossy(&*signature).into_owned(),
            ));
        }

        resolver
            .record::<HeaderRecord>(0, "header")
            .map_err(|_| Error::Truncated {
                what: "header",
                needed: HEADER_SIZE,
                available,
            })
    }

    #[must_use]
    pub fn is_supported_version(&self) -> bool {
        SUPPORTED_VERSIONS.contains(&self.version)
    }
}
