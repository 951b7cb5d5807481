/// Pages over a map whose keys are `"0"`, `"1"`, ... and whose values are
/// integers in text form, the way some debuggers expose a byte string.
///
/// The length is the number of leading keys that exist and parse as an
/// integer; probing stops at the first gap.
#[derive(Debug, Clone)]
pub struct NumericMapSource {
    values: std::collections::HashMap<String, String>,
    size: u64,
    page_size: usize,
}

impl NumericMapSource {
    #[must_use]
    pub fn new(values: std::collections::HashMap<String, String>) -> Self {
        let mut size = 0u64;

        while values
            .get(&size.to_string())
            .is_some_and(|value| value.trim().parse::<i32>().is_ok())
        {
            size += 1;
        }

        Self {
            values,
            size,
            page_size: crate::source::PAGE_SIZE,
        }
    }

    /// # Errors
    ///
    /// `PageError::InvalidPageSize` for zero.
    pub fn with_page_size(mut self, page_size: usize) -> crate::errors::PageResult<Self> {
        self.page_size = crate::source::validate_page_size(page_size)?;

        Ok(self)
    }

    fn byte_at(&self, position: u64) -> u8 {
        self.values
            .get(&position.to_string())
            .and_then(|value| value.trim().parse::<i32>().ok())
            .map_or(0, coerce_byte)
    }
}

/// Signed or unsigned byte values keep their bit pattern, anything else is 0.
#[inline]
fn coerce_byte(value: i32) -> u8 {
    if (-128..=255).contains(&value) {
        // truncation keeps the two's complement pattern of negative bytes
        value as u8
    } else {
        0
    }
}

impl crate::source::PageSource for NumericMapSource {
    #[inline]
    fn page_size(&self) -> usize {
        self.page_size
    }

    #[inline]
    fn document_size(&self) -> u64 {
        self.size
    }

    fn get_page(&self, index: u64) -> crate::errors::PageResult<Vec<u8>> {
        let span = crate::source::page_span(index, self.size, self.page_size)?;

        Ok(span.map(|position| self.byte_at(position)).collect())
    }
}
