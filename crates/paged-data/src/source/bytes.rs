/// Pages over an in-memory byte buffer.
#[derive(Debug, Clone)]
pub struct ByteBufferSource {
    data: std::rc::Rc<[u8]>,
    page_size: usize,
}

impl ByteBufferSource {
    #[must_use]
    pub fn new(data: impl Into<std::rc::Rc<[u8]>>) -> Self {
        Self {
            data: data.into(),
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

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl crate::source::PageSource for ByteBufferSource {
    #[inline]
    fn page_size(&self) -> usize {
        self.page_size
    }

    #[inline]
    fn document_size(&self) -> u64 {
        // usize is at most 64 bits on every supported target
        self.data.len() as u64
    }

    fn get_page(&self, index: u64) -> crate::errors::PageResult<Vec<u8>> {
        let span = crate::source::page_span(index, self.document_size(), self.page_size)?;
        let start = <u64 as TryInto<usize>>::try_into(span.start)?;
        let end = <u64 as TryInto<usize>>::try_into(span.end)?;

        Ok(self.data[start..end].to_vec())
    }
}

#[cfg(test)]
mod bytes_tests {
    use crate::source::PageSource;

    #[test]
    fn ten_bytes_in_pages_of_four() {
        let source = super::ByteBufferSource::new(b"0123456789".to_vec())
            .with_page_size(4)
            .unwrap();

        assert_eq!(source.get_page(0).unwrap().len(), 4);
        assert_eq!(source.get_page(1).unwrap().len(), 4);
        assert_eq!(source.get_page(2).unwrap(), b"89");
        assert!(matches!(
            source.get_page(3),
            Err(crate::errors::PageError::PageOutOfBounds { index: 3, .. })
        ));
    }

    #[test]
    fn page_lengths_sum_to_document_size() {
        for len in [0usize, 1, 4095, 4096, 4097, 10_000] {
            let source = super::ByteBufferSource::new(vec![7u8; len]);
            let total: usize = (0..crate::source::page_count(source.document_size(), 4096))
                .map(|index| source.get_page(index).unwrap().len())
                .sum();

            assert_eq!(total, len, "page lengths must sum to {len}");
        }
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(super::ByteBufferSource::new(vec![1, 2]).with_page_size(0).is_err());
    }
}
