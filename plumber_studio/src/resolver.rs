//! Bounds-checked resolution of self-relative offsets.
//!
//! Every read from the file buffer goes through [`OffsetResolver`]. Offsets in
//! the mdl format are signed distances from the start of the record that holds
//! them, so each call takes the base address explicitly. Header level offsets
//! use base `0`.

use std::{fmt, mem::size_of, ops::Deref};

use zerocopy::{FromBytes, LayoutVerified, Unaligned};

use crate::{binary_utils::lossy_string, Error, Result};

#[derive(Clone, Copy)]
pub struct OffsetResolver<'a> {
    bytes: &'a [u8],
}

impl<'a> OffsetResolver<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Resolves `offset` relative to `base` and checks that `size` bytes fit
    /// at the target.
    ///
    /// Returns `Ok(None)` if the offset is `0`, which always means absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the target or its end falls outside
    /// the buffer.
    pub fn resolve(
        &self,
        base: usize,
        offset: i32,
        size: usize,
        what: &'static str,
    ) -> Result<Option<usize>> {
        if offset == 0 {
            return Ok(None);
        }

        let out_of_bounds = || Error::OutOfBounds {
            what,
            base,
            offset,
            size,
            len: self.bytes.len(),
        };

        let base = i64::try_from(base).map_err(|_| out_of_bounds())?;
        let target = usize::try_from(base + i64::from(offset)).map_err(|_| out_of_bounds())?;
        let end = target.checked_add(size).ok_or_else(out_of_bounds)?;

        if end > self.bytes.len() {
            return Err(out_of_bounds());
        }

        Ok(Some(target))
    }

    /// Views the record of type `T` starting at the absolute `address`.
    pub fn record<T: FromBytes + Unaligned>(
        &self,
        address: usize,
        what: &'static str,
    ) -> Result<RecordRef<'a, T>> {
        let record = self
            .bytes
            .get(address..)
            .and_then(LayoutVerified::<_, T>::new_unaligned_from_prefix)
            .ok_or(Error::OutOfBounds {
                what,
                base: address,
                offset: 0,
                size: size_of::<T>(),
                len: self.bytes.len(),
            })?
            .0
            .into_ref();

        Ok(RecordRef {
            record,
            address,
            resolver: *self,
        })
    }

    /// Resolves a `(count, offset)` array descriptor relative to `base`.
    ///
    /// A count of `0` yields an empty array without looking at the offset.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the count is negative, if a non-empty array has no
    /// offset, or if any element would lie outside the buffer.
    pub fn records<T: FromBytes + Unaligned>(
        &self,
        base: usize,
        count: i32,
        offset: i32,
        what: &'static str,
    ) -> Result<Records<'a, T>> {
        let len: usize = count
            .try_into()
            .map_err(|_| Error::NegativeCount { what, count })?;

        if len == 0 {
            return Ok(Records {
                records: &[],
                address: base,
                resolver: *self,
            });
        }

        let size = len.checked_mul(size_of::<T>()).ok_or(Error::OutOfBounds {
            what,
            base,
            offset,
            size: usize::MAX,
            len: self.bytes.len(),
        })?;

        let address = self
            .resolve(base, offset, size, what)?
            .ok_or(Error::MissingArray { what, count: len })?;

        let records = self
            .bytes
            .get(address..)
            .and_then(|bytes| LayoutVerified::new_slice_unaligned_from_prefix(bytes, len))
            .ok_or(Error::OutOfBounds {
                what,
                base,
                offset,
                size,
                len: self.bytes.len(),
            })?
            .0
            .into_slice();

        Ok(Records {
            records,
            address,
            resolver: *self,
        })
    }

    /// Resolves `size` raw bytes relative to `base`.
    pub fn bytes(
        &self,
        base: usize,
        offset: i32,
        size: usize,
        what: &'static str,
    ) -> Result<Option<&'a [u8]>> {
        Ok(self
            .resolve(base, offset, size, what)?
            .and_then(|start| self.bytes.get(start..start + size)))
    }

    /// Reads the NUL-terminated string at `offset` from `base`.
    ///
    /// The string ends at the first NUL or at the end of the buffer, whichever
    /// comes first. Offset `0` yields `None`.
    pub fn string(&self, base: usize, offset: i32, what: &'static str) -> Result<Option<String>> {
        Ok(self
            .resolve(base, offset, 0, what)?
            .and_then(|start| self.bytes.get(start..))
            .map(lossy_string))
    }

    /// Like [`string`](Self::string), but an absent name is an empty string.
    pub fn name(&self, base: usize, offset: i32, what: &'static str) -> Result<String> {
        self.string(base, offset, what)
            .map(Option::unwrap_or_default)
    }
}

impl<'a> fmt::Debug for OffsetResolver<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OffsetResolver")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A resolved array of records and the absolute address of its first element.
#[derive(Debug)]
pub struct Records<'a, T> {
    records: &'a [T],
    address: usize,
    resolver: OffsetResolver<'a>,
}

impl<'a, T: 'a> Records<'a, T> {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = RecordRef<'a, T>> + 'a {
        let address = self.address;
        let resolver = self.resolver;

        self.records
            .iter()
            .enumerate()
            .map(move |(i, record)| RecordRef {
                record,
                address: address + i * size_of::<T>(),
                resolver,
            })
    }
}

/// A single record and its absolute address, the base of its own offsets.
#[derive(Debug)]
pub struct RecordRef<'a, T> {
    record: &'a T,
    address: usize,
    resolver: OffsetResolver<'a>,
}

impl<'a, T> Clone for RecordRef<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for RecordRef<'a, T> {}

impl<'a, T> RecordRef<'a, T> {
    pub fn address(&self) -> usize {
        self.address
    }

    /// Name string relative to this record, empty if the offset is `0`.
    pub fn name(&self, offset: i32, what: &'static str) -> Result<String> {
        self.resolver.name(self.address, offset, what)
    }

    /// Optional string relative to this record.
    pub fn string(&self, offset: i32, what: &'static str) -> Result<Option<String>> {
        self.resolver.string(self.address, offset, what)
    }

    /// Nested array relative to this record.
    pub fn records<U: FromBytes + Unaligned>(
        &self,
        count: i32,
        offset: i32,
        what: &'static str,
    ) -> Result<Records<'a, U>> {
        self.resolver.records(self.address, count, offset, what)
    }
}

impl<'a, T> Deref for RecordRef<'a, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.record
    }
}
