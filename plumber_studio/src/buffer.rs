use std::{fmt, fs, path::Path};

use tracing::debug;

use crate::{resolver::OffsetResolver, Error, Result};

/// The complete, uninterpreted bytes of an mdl file.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawBuffer {
    bytes: Vec<u8>,
}

impl RawBuffer {
    /// Reads the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the file can't be opened or read.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| Error::from_io(&err, &path.display()))?;

        debug!(len = bytes.len(), "read mdl file");

        Ok(Self { bytes })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }

    pub(crate) fn resolver(&self) -> OffsetResolver<'_> {
        OffsetResolver::new(&self.bytes)
    }
}

impl From<Vec<u8>> for RawBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl AsRef<[u8]> for RawBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for RawBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}
