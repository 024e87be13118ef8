#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Decoder for Valve's Source Engine studio model (`.mdl`) files.
//!
//! [`load`] reads a file into memory and decodes the skeleton, hitboxes,
//! body part metadata and texture table into an owned, immutable [`Model`].
//! Animation, mesh and vertex payloads are not decoded.

mod binary_utils;
mod body_part;
mod bone;
mod bone_controller;
mod buffer;
mod decode;
mod header;
mod hitbox;
mod layout;
mod model;
mod options;
mod references;
mod resolver;
mod texture;

use std::{path::Path, result};

use thiserror::Error;

pub use body_part::{BodyPart, EyeBall, StudioModel};
pub use bone::{Bone, BoneFlags};
pub use bone_controller::BoneController;
pub use buffer::RawBuffer;
pub use header::{Header, HeaderFlags, Section};
pub use hitbox::{BBox, HitboxSet};
pub use model::Model;
pub use options::LoadOptions;
pub use references::{DanglingReference, ReferenceSource};
pub use texture::Texture;

#[derive(Debug, Clone, Error, Hash, PartialEq, Eq)]
pub enum Error {
    #[error("io error reading `{path}`: {error}")]
    Io { path: String, error: String },
    #[error("mdl truncated: {what} needs {needed} bytes, only {available} available")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("{what} out of bounds: offset {offset} from {base} with size {size} exceeds buffer of {len} bytes")]
    OutOfBounds {
        what: &'static str,
        base: usize,
        offset: i32,
        size: usize,
        len: usize,
    },
    #[error("not an mdl file: invalid signature `{0}`")]
    BadMagic(String),
    #[error("unsupported mdl version {0}")]
    UnsupportedVersion(i32),
    #[error("{what} count is negative: {count}")]
    NegativeCount { what: &'static str, count: i32 },
    #[error("{what} has {count} entries but no offset")]
    MissingArray { what: &'static str, count: usize },
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    fn from_io(err: &std::io::Error, path: &impl ToString) -> Self {
        Self::Io {
            path: path.to_string(),
            error: err.to_string(),
        }
    }
}

/// Loads and decodes the mdl file at `path` with default options.
///
/// # Errors
///
/// Returns `Err` if the file can't be read or if any part of it is malformed.
/// No partially decoded model is ever returned.
pub fn load(path: impl AsRef<Path>) -> Result<Model> {
    Model::load(path, LoadOptions::default())
}

/// Loads and decodes the mdl file at `path`.
///
/// # Errors
///
/// See [`load`]. Additionally fails on unknown versions if
/// [`LoadOptions::strict_version`] is set.
pub fn load_with_options(path: impl AsRef<Path>, options: LoadOptions) -> Result<Model> {
    Model::load(path, options)
}
