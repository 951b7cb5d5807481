/// # Page Sources.
///
/// One implementation per backing representation. Every source serves the
/// same contract: pages of a fixed size, indexed from zero, where the page at
/// `document_size / page_size` holds the remainder (empty when the size is an
/// exact multiple) and anything past it is out of bounds.
pub mod bytes;
pub mod child_values;
pub mod escaped;
pub mod file;
pub mod numeric;
pub mod numeric_map;

pub use bytes::ByteBufferSource;
pub use child_values::{ChildValuesSource, ValueFetcher, ValueType};
pub use escaped::EscapedStringSource;
pub use file::FileSource;
pub use numeric::{BigEndianValue, NumericArraySource};
pub use numeric_map::NumericMapSource;

/// Default page size for every source.
pub const PAGE_SIZE: usize = 4096;

pub trait PageSource: std::fmt::Debug {
    /// Fixed for the lifetime of the source.
    fn page_size(&self) -> usize;

    fn document_size(&self) -> u64;

    /// Returns exactly `min(page_size, document_size - index * page_size)` bytes.
    ///
    /// # Errors
    ///
    /// - `PageError::PageOutOfBounds` past the last page.
    /// - `PageError::NotAvailable` when a live source cannot serve it yet.
    fn get_page(&self, index: u64) -> crate::errors::PageResult<Vec<u8>>;

    /// Whether `get_page(index)` can be served without blocking on a
    /// foreign producer.
    fn is_available(&self, _index: u64) -> bool {
        true
    }
}

/// # Errors
///
/// `PageError::InvalidPageSize` for zero.
#[inline]
pub fn validate_page_size(page_size: usize) -> crate::errors::PageResult<usize> {
    if page_size == 0 {
        return Err(crate::errors::PageError::InvalidPageSize);
    }

    Ok(page_size)
}

/// Byte range covered by page `index`.
///
/// # Errors
///
/// `PageError::PageOutOfBounds` when `index > document_size / page_size`.
pub fn page_span(
    index: u64,
    document_size: u64,
    page_size: usize,
) -> crate::errors::PageResult<std::ops::Range<u64>> {
    let page_size = <usize as TryInto<u64>>::try_into(validate_page_size(page_size)?)?;
    let last_index = document_size / page_size;

    if index > last_index {
        return Err(crate::errors::PageError::PageOutOfBounds { index, last_index });
    }

    // index <= document_size / page_size, so this cannot overflow
    let start = index * page_size;
    let end = start.saturating_add(page_size).min(document_size);

    Ok(start..end)
}

/// Number of addressable pages, including the trailing remainder page.
#[inline]
#[must_use]
pub fn page_count(document_size: u64, page_size: usize) -> u64 {
    match <usize as TryInto<u64>>::try_into(page_size) {
        Ok(0) | Err(_) => 0,
        Ok(page_size) => document_size / page_size + 1,
    }
}

/// Builds the bytes of `span` for a source made of fixed-width elements.
///
/// Every element overlapping the span is serialized on its own through
/// `write`, then the result is trimmed to the span.
pub(crate) fn collect_elements(
    span: std::ops::Range<u64>,
    width: usize,
    mut write: impl FnMut(u64, &mut Vec<u8>) -> crate::errors::PageResult<()>,
) -> crate::errors::PageResult<Vec<u8>> {
    if span.is_empty() {
        return Ok(Vec::new());
    }

    let width_u64 = <usize as TryInto<u64>>::try_into(width)?;
    let first = span.start / width_u64;
    let last = span.end.div_ceil(width_u64);
    let count = <u64 as TryInto<usize>>::try_into(last - first)?;
    let mut scratch = Vec::with_capacity(count.saturating_mul(width));

    for element in first..last {
        let before = scratch.len();

        write(element, &mut scratch)?;

        debug_assert_eq!(scratch.len() - before, width);
    }

    let skip = <u64 as TryInto<usize>>::try_into(span.start - first * width_u64)?;
    let take = <u64 as TryInto<usize>>::try_into(span.end - span.start)?;

    scratch.drain(..skip);
    scratch.truncate(take);

    Ok(scratch)
}

#[cfg(test)]
mod source_tests {
    #[test]
    fn span_of_ten_bytes_in_pages_of_four() {
        assert_eq!(super::page_span(0, 10, 4).unwrap(), 0..4);
        assert_eq!(super::page_span(1, 10, 4).unwrap(), 4..8);
        assert_eq!(super::page_span(2, 10, 4).unwrap(), 8..10);
        assert_eq!(
            super::page_span(3, 10, 4),
            Err(crate::errors::PageError::PageOutOfBounds {
                index: 3,
                last_index: 2
            })
        );
    }

    #[test]
    fn exact_multiple_has_empty_trailing_page() {
        assert_eq!(super::page_span(1, 8, 4).unwrap(), 4..8);
        assert_eq!(super::page_span(2, 8, 4).unwrap(), 8..8);
        assert!(super::page_span(3, 8, 4).is_err());
        assert_eq!(super::page_count(8, 4), 3);
    }

    #[test]
    fn empty_document_has_one_empty_page() {
        assert_eq!(super::page_span(0, 0, 4096).unwrap(), 0..0);
        assert!(super::page_span(1, 0, 4096).is_err());
    }

    #[test]
    fn zero_page_size_rejected() {
        assert_eq!(
            super::page_span(0, 10, 0),
            Err(crate::errors::PageError::InvalidPageSize)
        );
        assert_eq!(super::page_count(10, 0), 0);
    }

    #[test]
    fn collect_elements_trims_unaligned_span() {
        // Elements of width 4 holding [e, e, e, e] for element index e
        let bytes = super::collect_elements(3..9, 4, |element, out| {
            out.extend_from_slice(&[element as u8; 4]);
            Ok(())
        })
        .unwrap();

        assert_eq!(bytes, vec![0, 1, 1, 1, 1, 2]);
    }
}
