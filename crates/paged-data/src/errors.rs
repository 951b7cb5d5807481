pub type PageResult<T> = Result<T, PageError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page {index} out of bounds (last page index {last_index})")]
    PageOutOfBounds { index: u64, last_index: u64 },

    #[error("range {offset}+{length} out of bounds (document size {size})")]
    RangeOutOfBounds { offset: u64, length: u64, size: u64 },

    /// A live source cannot serve the page yet; callers may retry later.
    #[error("page {index} is not available yet")]
    NotAvailable { index: u64 },

    #[error("page size must be non-zero")]
    InvalidPageSize,

    #[error("page {index} returned {actual} bytes, expected {expected}")]
    ShortPage {
        index: u64,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Math(#[from] MathError),
}

impl From<std::num::TryFromIntError> for PageError {
    fn from(value: std::num::TryFromIntError) -> Self {
        PageError::Math(MathError::ConversionFailed(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    /// Wraps the specific error TryInto generates
    #[error("integer conversion failed: {0}")]
    ConversionFailed(#[from] std::num::TryFromIntError),
    /// Represents the `None` case from checked math
    #[error("arithmetic overflow")]
    Overflow,
    #[error("index out of bounds (len={0})")]
    OutOfBounds(u64),
}
