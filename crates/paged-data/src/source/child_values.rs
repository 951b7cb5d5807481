/// Children are requested from the fetcher in batches of this many.
pub const SEGMENT_SIZE: u64 = 100;

/// Element type of a list of boxed values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    /// Eight children per byte, first child in the most significant bit.
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
}

impl ValueType {
    /// Bytes per page element. A boolean element packs eight children.
    #[inline]
    #[must_use]
    pub fn width(self) -> usize {
        match self {
            ValueType::Boolean | ValueType::Byte => 1,
            ValueType::Short => 2,
            ValueType::Integer => 4,
            ValueType::Long => 8,
        }
    }

    /// Logical size of `children` values of this type.
    #[inline]
    #[must_use]
    pub fn document_size(self, children: u64) -> u64 {
        match self {
            ValueType::Boolean => children.div_ceil(8),
            value_type => children.saturating_mul(value_type.width() as u64),
        }
    }
}

/// Unparsable presentations yield zero.
#[inline]
fn parse_number<T: std::str::FromStr + Default>(text: Option<&str>) -> T {
    text.and_then(|text| text.trim().parse().ok()).unwrap_or_default()
}

/// A foreign producer of child values, such as a debugger's variable tree.
///
/// Values arrive as their textual presentation (`"-12"`, `"4096"`).
pub trait ValueFetcher: std::fmt::Debug {
    fn child_count(&self) -> u64;

    /// Presentations of children `start..start + count`. May return fewer
    /// when the producer truncates.
    ///
    /// # Errors
    ///
    /// Whatever the producer reports; `PageError::NotAvailable` while it is busy.
    fn fetch(&self, start: u64, count: u64) -> crate::errors::PageResult<Vec<String>>;

    /// Whether a fetch can be served right now.
    fn is_ready(&self) -> bool {
        true
    }
}

#[derive(Debug)]
struct Segment {
    start: u64,
    values: Vec<String>,
}

/// Pages over a lazily fetched list of boxed numeric values.
///
/// Keeps the last served page and the last fetched segment, since viewers
/// tend to request the same page repeatedly while scrolling within it.
#[derive(Debug)]
pub struct ChildValuesSource<F: ValueFetcher> {
    fetcher: F,
    value_type: ValueType,
    children_count: u64,
    page_size: usize,
    page_cache: std::cell::RefCell<Option<(u64, Vec<u8>)>>,
    segment: std::cell::RefCell<Option<Segment>>,
}

impl<F: ValueFetcher> ChildValuesSource<F> {
    #[must_use]
    pub fn new(fetcher: F, value_type: ValueType) -> Self {
        let children_count = fetcher.child_count();

        Self {
            fetcher,
            value_type,
            children_count,
            page_size: crate::source::PAGE_SIZE,
            page_cache: std::cell::RefCell::new(None),
            segment: std::cell::RefCell::new(None),
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
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[inline]
    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs `read` on the presentation of child `position`; `None` past the
    /// last child.
    fn with_child<R>(
        &self,
        position: u64,
        read: impl FnOnce(Option<&str>) -> R,
    ) -> crate::errors::PageResult<R> {
        if position >= self.children_count {
            return Ok(read(None));
        }

        let segment_start = position - position % SEGMENT_SIZE;
        let mut segment = self.segment.borrow_mut();

        if segment.as_ref().is_none_or(|cached| cached.start != segment_start) {
            let count = SEGMENT_SIZE.min(self.children_count - segment_start);

            tracing::trace!(segment_start, count, "fetching child segment");

            *segment = Some(Segment {
                start: segment_start,
                values: self.fetcher.fetch(segment_start, count)?,
            });
        }

        let offset = <u64 as TryInto<usize>>::try_into(position - segment_start)?;
        let text = segment
            .as_ref()
            .and_then(|cached| cached.values.get(offset))
            .map(String::as_str);

        Ok(read(text))
    }

    /// Appends the big-endian bytes of page element `element`.
    fn write_element(&self, element: u64, out: &mut Vec<u8>) -> crate::errors::PageResult<()> {
        match self.value_type {
            ValueType::Boolean => {
                let mut packed = 0u8;

                for bit in 0..8 {
                    let set = self.with_child(element * 8 + bit, |text| {
                        text.is_some_and(|text| text.trim().eq_ignore_ascii_case("true"))
                    })?;

                    packed = (packed << 1) | u8::from(set);
                }

                out.push(packed);
            }
            // Parsed wider than a byte so 128..=255 keep their low byte
            ValueType::Byte => out.push(self.with_child(element, parse_number::<i16>)? as u8),
            ValueType::Short => {
                out.extend_from_slice(&self.with_child(element, parse_number::<i16>)?.to_be_bytes());
            }
            ValueType::Integer => {
                out.extend_from_slice(&self.with_child(element, parse_number::<i32>)?.to_be_bytes());
            }
            ValueType::Long => {
                out.extend_from_slice(&self.with_child(element, parse_number::<i64>)?.to_be_bytes());
            }
        }

        Ok(())
    }
}

impl<F: ValueFetcher> crate::source::PageSource for ChildValuesSource<F> {
    #[inline]
    fn page_size(&self) -> usize {
        self.page_size
    }

    #[inline]
    fn document_size(&self) -> u64 {
        self.value_type.document_size(self.children_count)
    }

    fn get_page(&self, index: u64) -> crate::errors::PageResult<Vec<u8>> {
        if let Some((cached_index, page)) = self.page_cache.borrow().as_ref()
            && *cached_index == index
        {
            return Ok(page.clone());
        }

        let span = crate::source::page_span(index, self.document_size(), self.page_size)?;

        if !span.is_empty() && !self.fetcher.is_ready() {
            return Err(crate::errors::PageError::NotAvailable { index });
        }

        let page = crate::source::collect_elements(span, self.value_type.width(), |element, out| {
            self.write_element(element, out)
        })?;

        *self.page_cache.borrow_mut() = Some((index, page.clone()));

        Ok(page)
    }

    fn is_available(&self, _index: u64) -> bool {
        self.fetcher.is_ready()
    }
}

#[cfg(test)]
mod child_values_tests {
    use crate::source::PageSource;

    #[derive(Debug)]
    struct ListFetcher {
        values: Vec<String>,
        fetches: std::cell::Cell<usize>,
        ready: std::cell::Cell<bool>,
    }

    impl ListFetcher {
        fn new(values: &[&str]) -> Self {
            Self {
                values: values.iter().map(|value| (*value).to_string()).collect(),
                fetches: std::cell::Cell::new(0),
                ready: std::cell::Cell::new(true),
            }
        }
    }

    impl super::ValueFetcher for ListFetcher {
        fn child_count(&self) -> u64 {
            self.values.len() as u64
        }

        fn fetch(&self, start: u64, count: u64) -> crate::errors::PageResult<Vec<String>> {
            self.fetches.set(self.fetches.get() + 1);

            let start = start as usize;

            Ok(self.values[start..start + count as usize].to_vec())
        }

        fn is_ready(&self) -> bool {
            self.ready.get()
        }
    }

    #[test]
    fn bytes_parse_and_coerce() {
        let source = super::ChildValuesSource::new(
            ListFetcher::new(&["65", "-1", "200", "abc"]),
            super::ValueType::Byte,
        );

        assert_eq!(source.document_size(), 4);
        assert_eq!(source.get_page(0).unwrap(), vec![0x41, 0xff, 0xc8, 0]);
    }

    #[test]
    fn booleans_pack_eight_per_byte() {
        let mut values = vec!["true", "false", "false", "false", "false", "false", "false", "TRUE"];

        values.extend(["false", "true", "maybe"]);

        let source = super::ChildValuesSource::new(ListFetcher::new(&values), super::ValueType::Boolean);

        assert_eq!(source.document_size(), 2, "eleven children round up to two bytes");
        assert_eq!(source.get_page(0).unwrap(), vec![0b1000_0001, 0b0100_0000]);
    }

    #[test]
    fn shorts_and_ints_are_big_endian() {
        let shorts = super::ChildValuesSource::new(
            ListFetcher::new(&["258", "-2"]),
            super::ValueType::Short,
        );
        let ints = super::ChildValuesSource::new(
            ListFetcher::new(&["16909060"]),
            super::ValueType::Integer,
        );

        assert_eq!(shorts.get_page(0).unwrap(), vec![0x01, 0x02, 0xff, 0xfe]);
        assert_eq!(ints.get_page(0).unwrap(), vec![0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn longs_use_the_requested_page_offset() {
        let values: Vec<String> = (0..4).map(|value| value.to_string()).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let source = super::ChildValuesSource::new(ListFetcher::new(&refs), super::ValueType::Long)
            .with_page_size(8)
            .unwrap();

        assert_eq!(source.get_page(3).unwrap(), vec![0, 0, 0, 0, 0, 0, 0, 3]);
        assert_eq!(source.get_page(1).unwrap(), vec![0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn segments_and_pages_are_cached() {
        let values: Vec<String> = (0..250).map(|value| (value % 100).to_string()).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let source = super::ChildValuesSource::new(ListFetcher::new(&refs), super::ValueType::Byte)
            .with_page_size(10)
            .unwrap();

        source.get_page(0).unwrap();
        source.get_page(1).unwrap();
        assert_eq!(source.fetcher().fetches.get(), 1, "same segment must not refetch");

        source.get_page(1).unwrap();
        assert_eq!(source.fetcher().fetches.get(), 1);

        let last = source.get_page(24).unwrap();

        assert_eq!(last, (40..50).collect::<Vec<u8>>());
        assert_eq!(source.fetcher().fetches.get(), 2);
    }

    #[test]
    fn busy_fetcher_reports_not_available() {
        let source =
            super::ChildValuesSource::new(ListFetcher::new(&["1", "2"]), super::ValueType::Byte);

        source.fetcher().ready.set(false);

        assert!(!source.is_available(0));
        assert_eq!(
            source.get_page(0),
            Err(crate::errors::PageError::NotAvailable { index: 0 })
        );

        source.fetcher().ready.set(true);
        assert_eq!(source.get_page(0).unwrap(), vec![1, 2]);
    }
}
