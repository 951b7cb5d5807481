/// Read-only binary data virtualized over one [`PageSource`].
///
/// Reads are decomposed into the pages that cover them; recently used pages
/// are cached so that small repeated reads do not re-derive expensive pages.
///
/// [`PageSource`]: crate::source::PageSource
#[derive(Debug)]
pub struct PagedBinaryData {
    source: std::rc::Rc<dyn crate::source::PageSource>,
    cache: std::cell::RefCell<crate::cache::PageCache>,
}

/*

====================================
========= CREATION METHODS =========
====================================

*/

impl PagedBinaryData {
    #[must_use]
    pub fn new(source: impl crate::source::PageSource + 'static) -> Self {
        Self::shared(std::rc::Rc::new(source))
    }

    /// Builds a facade over a source that other facades may also read.
    #[must_use]
    pub fn shared(source: std::rc::Rc<dyn crate::source::PageSource>) -> Self {
        Self {
            source,
            cache: std::cell::RefCell::new(crate::cache::PageCache::default()),
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<std::rc::Rc<[u8]>>) -> Self {
        Self::new(crate::source::ByteBufferSource::new(bytes))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    #[must_use]
    pub fn with_cache_capacity(self, capacity: usize) -> Self {
        Self {
            source: self.source,
            cache: std::cell::RefCell::new(crate::cache::PageCache::new(capacity)),
        }
    }
}

/*

====================================
========= INLINE METHODS  ==========
====================================

*/

impl PagedBinaryData {
    /// Total size in bytes. Re-query after the source changes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.source.document_size()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    #[inline]
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.source.page_size()
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &std::rc::Rc<dyn crate::source::PageSource> {
        &self.source
    }

    /// Drops every cached page. Needed when the source content changed.
    pub fn invalidate(&self) {
        self.cache.borrow_mut().clear();
    }
}

/*

====================================
============== READS ===============
====================================

*/

impl PagedBinaryData {
    /// # Errors
    ///
    /// - `PageError::RangeOutOfBounds` if `offset + length` exceeds the size.
    /// - Anything the source reports while producing a covering page.
    pub fn read(&self, offset: u64, length: u64) -> crate::errors::PageResult<Vec<u8>> {
        self.check_range(offset, length)?;

        let mut out = vec![0; <u64 as TryInto<usize>>::try_into(length)?];

        self.read_into(offset, &mut out)?;

        Ok(out)
    }

    /// Fills `buf` with the bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Same as [`PagedBinaryData::read`].
    pub fn read_into(&self, offset: u64, buf: &mut [u8]) -> crate::errors::PageResult<()> {
        let length = <usize as TryInto<u64>>::try_into(buf.len())?;
        let end = self.check_range(offset, length)?;

        let page_size = <usize as TryInto<u64>>::try_into(self.page_size())?;
        let mut position = offset;
        let mut written = 0usize;

        while position < end {
            let index = position / page_size;
            let page = self.page(index)?;
            let in_page = <u64 as TryInto<usize>>::try_into(position - index * page_size)?;
            let take = (page.len() - in_page.min(page.len())).min(buf.len() - written);

            if take == 0 {
                return Err(crate::errors::PageError::ShortPage {
                    index,
                    expected: in_page + 1,
                    actual: page.len(),
                });
            }

            buf[written..written + take].copy_from_slice(&page[in_page..in_page + take]);
            written += take;
            position += <usize as TryInto<u64>>::try_into(take)?;
        }

        Ok(())
    }

    /// End of `offset..offset + length` when it lies inside the data.
    fn check_range(&self, offset: u64, length: u64) -> crate::errors::PageResult<u64> {
        let size = self.size();

        match offset.checked_add(length) {
            Some(end) if end <= size => Ok(end),
            _ => Err(crate::errors::PageError::RangeOutOfBounds {
                offset,
                length,
                size,
            }),
        }
    }

    /// # Errors
    ///
    /// `PageError::RangeOutOfBounds` at or past the end.
    pub fn byte_at(&self, position: u64) -> crate::errors::PageResult<u8> {
        let mut byte = [0u8];

        self.read_into(position, &mut byte)?;

        Ok(byte[0])
    }

    fn page(&self, index: u64) -> crate::errors::PageResult<std::rc::Rc<[u8]>> {
        if let Some(page) = self.cache.borrow_mut().get(index) {
            tracing::trace!(index, "page cache hit");

            return Ok(page);
        }

        tracing::trace!(index, "page cache miss");

        let page: std::rc::Rc<[u8]> = self.source.get_page(index)?.into();

        if let Some(evicted) = self.cache.borrow_mut().insert(index, page.clone()) {
            tracing::debug!(index, evicted, "page cache eviction");
        }

        Ok(page)
    }
}

#[cfg(test)]
mod paged_tests {
    #[derive(Debug)]
    struct CountingSource {
        inner: crate::source::ByteBufferSource,
        requests: std::cell::Cell<usize>,
    }

    impl crate::source::PageSource for CountingSource {
        fn page_size(&self) -> usize {
            self.inner.page_size()
        }

        fn document_size(&self) -> u64 {
            self.inner.document_size()
        }

        fn get_page(&self, index: u64) -> crate::errors::PageResult<Vec<u8>> {
            self.requests.set(self.requests.get() + 1);
            self.inner.get_page(index)
        }
    }

    fn counting(bytes: &[u8], page_size: usize) -> std::rc::Rc<CountingSource> {
        std::rc::Rc::new(CountingSource {
            inner: crate::source::ByteBufferSource::new(bytes.to_vec())
                .with_page_size(page_size)
                .unwrap(),
            requests: std::cell::Cell::new(0),
        })
    }

    #[test]
    fn read_spans_pages() {
        let data = super::PagedBinaryData::new(
            crate::source::ByteBufferSource::new(b"0123456789".to_vec())
                .with_page_size(4)
                .unwrap(),
        );

        assert_eq!(data.size(), 10);
        assert_eq!(data.read(2, 7).unwrap(), b"2345678");
        assert_eq!(data.read(0, 10).unwrap(), b"0123456789");
        assert_eq!(data.read(10, 0).unwrap(), b"");
        assert_eq!(data.byte_at(9).unwrap(), b'9');
    }

    #[test]
    fn read_past_end_fails() {
        let data = super::PagedBinaryData::from_bytes(b"abc".to_vec());

        assert_eq!(
            data.read(1, 3),
            Err(crate::errors::PageError::RangeOutOfBounds {
                offset: 1,
                length: 3,
                size: 3
            })
        );
        assert!(data.byte_at(3).is_err());
        assert!(data.read(u64::MAX, 2).is_err());
    }

    #[test]
    fn huge_read_is_rejected_before_allocating() {
        let data = super::PagedBinaryData::from_bytes(b"abc".to_vec());

        assert_eq!(
            data.read(0, u64::MAX),
            Err(crate::errors::PageError::RangeOutOfBounds {
                offset: 0,
                length: u64::MAX,
                size: 3
            })
        );
        assert!(matches!(
            data.read(2, u64::MAX),
            Err(crate::errors::PageError::RangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn repeated_reads_hit_the_cache() {
        let source = counting(b"0123456789", 4);
        let data = super::PagedBinaryData::shared(source.clone());

        data.read(0, 2).unwrap();
        data.read(1, 2).unwrap();
        data.read(2, 1).unwrap();
        assert_eq!(source.requests.get(), 1);

        data.invalidate();
        data.read(0, 1).unwrap();
        assert_eq!(source.requests.get(), 2);
    }

    #[test]
    fn pass_through_cache_always_asks_the_source() {
        let source = counting(b"0123456789", 4);
        let data = super::PagedBinaryData::shared(source.clone()).with_cache_capacity(0);

        data.read(0, 1).unwrap();
        data.read(0, 1).unwrap();
        assert_eq!(source.requests.get(), 2);
    }

    #[test]
    fn facades_share_one_source() {
        let source = counting(b"shared", 4);
        let first = super::PagedBinaryData::shared(source.clone());
        let second = super::PagedBinaryData::shared(source);

        assert_eq!(first.read(0, 6).unwrap(), second.read(0, 6).unwrap());
    }

    #[test]
    fn textual_source_reads_through_the_facade() {
        let data = super::PagedBinaryData::new(
            crate::source::EscapedStringSource::new(r"b'AB\x00C'")
                .with_page_size(3)
                .unwrap(),
        );

        assert_eq!(data.read(1, 3).unwrap(), vec![0x42, 0x00, 0x43]);
    }

    #[test]
    fn empty_data() {
        let data = super::PagedBinaryData::empty();

        assert!(data.is_empty());
        assert_eq!(data.read(0, 0).unwrap(), Vec::<u8>::new());
    }
}
