use std::fmt::Debug;

use itertools::Itertools;
use tracing::trace;
use zerocopy::{FromBytes, Unaligned};

use crate::{
    header::Section,
    resolver::{OffsetResolver, RecordRef, Records},
    Result,
};

/// An owned entity decoded from one fixed-size record.
pub(crate) trait Decode: Sized + Debug {
    type Record: FromBytes + Unaligned + Debug;

    /// Name of the array holding these records, used in errors and logs.
    const KIND: &'static str;

    fn decode(record: RecordRef<'_, Self::Record>) -> Result<Self>;
}

/// Decodes every record of an already resolved array, in order.
pub(crate) fn decode_all<T: Decode>(records: &Records<'_, T::Record>) -> Result<Vec<T>> {
    records
        .iter()
        .map(|record| -> Result<T> {
            let entity = T::decode(record)?;
            trace!(kind = T::KIND, address = record.address(), ?entity, "decoded");
            Ok(entity)
        })
        .try_collect()
}

/// Resolves a header level section and decodes all of its records.
pub(crate) fn decode_section<T: Decode>(
    resolver: OffsetResolver<'_>,
    section: Section,
) -> Result<Vec<T>> {
    let records = resolver.records(0, section.count, section.offset, T::KIND)?;
    decode_all(&records)
}

/// Resolves an array nested in `parent` and decodes all of its records.
pub(crate) fn decode_nested<T: Decode, P>(
    parent: &RecordRef<'_, P>,
    count: i32,
    offset: i32,
) -> Result<Vec<T>> {
    let records = parent.records(count, offset, T::KIND)?;
    decode_all(&records)
}
