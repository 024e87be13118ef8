/// Decoding policy for [`Model::load`](crate::Model::load) and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Reject versions outside the supported range instead of only logging them.
    pub strict_version: bool,
    /// Log a warning for every cross-reference that points outside its
    /// target collection. The references are kept as-is either way.
    pub validate_references: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strict_version: false,
            validate_references: true,
        }
    }

    #[must_use]
    pub const fn strict() -> Self {
        Self {
            strict_version: true,
            ..Self::new()
        }
    }
}
