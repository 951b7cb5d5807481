/// Recognized type-tag prefixes and the suffix each one closes with after
/// the quote. Longest first, since `b` is a prefix of the others.
const LITERAL_FORMS: [(&str, &str); 3] = [("bytearray(b", ")"), ("bytes(b", ")"), ("b", "")];

/// Pages over a quoted, escape-coded byte literal such as `b'AB\x00C'`.
///
/// Each literal character is one byte, `\xHH` is one byte in four
/// characters and `\\ \' \" \n \r \t` are one byte in two. Since the
/// character-to-byte ratio varies, page starts are found by scanning the
/// literal; the scan positions are remembered so later pages resume from
/// the nearest known page start.
///
/// Text that does not match the grammar (unknown prefix, unterminated
/// quote, bad escape) yields an empty document rather than an error.
/// A non-ASCII literal character still counts as one byte and keeps only
/// the low eight bits of its code point, which is not what the producing
/// runtime meant for values above `0xff`.
#[derive(Debug)]
pub struct EscapedStringSource {
    text: String,
    body: std::ops::Range<usize>,
    recognized: bool,
    size: u64,
    page_size: usize,
    page_starts: std::cell::RefCell<Vec<usize>>,
}

impl EscapedStringSource {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_size(text.into(), crate::source::PAGE_SIZE)
    }

    /// # Errors
    ///
    /// `PageError::InvalidPageSize` for zero.
    pub fn with_page_size(self, page_size: usize) -> crate::errors::PageResult<Self> {
        Ok(Self::with_size(
            self.text,
            crate::source::validate_page_size(page_size)?,
        ))
    }

    fn with_size(text: String, page_size: usize) -> Self {
        let (body, size, recognized) = match parse_literal(&text) {
            Some((body, size)) => (body, size, true),
            None => {
                tracing::debug!(len = text.len(), "text is not an escaped byte literal");

                (0..0, 0, false)
            }
        };

        Self {
            text,
            body,
            recognized,
            size,
            page_size,
            page_starts: std::cell::RefCell::new(vec![0]),
        }
    }

    /// Whether the text matched the literal grammar.
    #[inline]
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.recognized
    }

    #[inline]
    fn body(&self) -> &str {
        &self.text[self.body.clone()]
    }

    /// Body offset of the first character of page `index`.
    fn page_start(&self, index: u64) -> crate::errors::PageResult<usize> {
        let index = <u64 as TryInto<usize>>::try_into(index)?;
        let page_size = <usize as TryInto<u64>>::try_into(self.page_size)?;
        let body = self.body();
        let mut starts = self.page_starts.borrow_mut();

        while starts.len() <= index {
            let from = starts.last().copied().unwrap_or(0);
            let next = skip(body, from, page_size)
                .ok_or(crate::errors::MathError::OutOfBounds(from as u64))?;

            starts.push(next);
        }

        Ok(starts[index])
    }
}

impl crate::source::PageSource for EscapedStringSource {
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
        let length = <u64 as TryInto<usize>>::try_into(span.end - span.start)?;
        let body = self.body();
        let mut at = self.page_start(index)?;
        let mut page = Vec::with_capacity(length);

        while page.len() < length {
            let (value, width) = decode_at(body, at)
                .ok_or(crate::errors::MathError::OutOfBounds(at as u64))?;

            page.push(value);
            at += width;
        }

        Ok(page)
    }
}

/// Splits `text` into its literal body and counts the logical bytes in it.
fn parse_literal(text: &str) -> Option<(std::ops::Range<usize>, u64)> {
    let bytes = text.as_bytes();
    let (prefix, suffix) = LITERAL_FORMS
        .iter()
        .find(|(prefix, _)| text.starts_with(prefix))?;
    let quote = *bytes.get(prefix.len())?;

    if quote != b'\'' && quote != b'"' {
        return None;
    }

    let body_start = prefix.len() + 1;
    let body_end = text.len().checked_sub(suffix.len() + 1)?;

    if body_end < body_start || bytes[body_end] != quote || !text.ends_with(suffix) {
        return None;
    }

    let body = text.get(body_start..body_end)?;
    let mut at = 0;
    let mut size = 0u64;

    while at < body.len() {
        // Literal run up to the next escape
        let run_end = memchr::memchr(b'\\', &body.as_bytes()[at..]).map_or(body.len(), |rel| at + rel);

        if memchr::memchr(quote, &body.as_bytes()[at..run_end]).is_some() {
            return None;
        }

        size = size.checked_add(body[at..run_end].chars().count() as u64)?;
        at = run_end;

        if at < body.len() {
            let (_, width) = decode_escape(body.as_bytes(), at)?;

            size = size.checked_add(1)?;
            at += width;
        }
    }

    Some((body_start..body_end, size))
}

/// Body offset reached after consuming `count` logical bytes from `from`.
fn skip(body: &str, mut from: usize, mut count: u64) -> Option<usize> {
    while count > 0 {
        let run_len = memchr::memchr(b'\\', &body.as_bytes()[from..]).unwrap_or(body.len() - from);
        let run = &body[from..from + run_len];
        let chars = run.chars().count() as u64;

        if chars >= count {
            let nth = <u64 as TryInto<usize>>::try_into(count).ok()?;

            return Some(from + run.char_indices().nth(nth).map_or(run.len(), |(offset, _)| offset));
        }

        count -= chars;
        from += run_len;

        let (_, width) = decode_escape(body.as_bytes(), from)?;

        from += width;
        count -= 1;
    }

    Some(from)
}

#[inline]
fn decode_at(body: &str, at: usize) -> Option<(u8, usize)> {
    if *body.as_bytes().get(at)? == b'\\' {
        return decode_escape(body.as_bytes(), at);
    }

    let ch = body.get(at..)?.chars().next()?;

    Some((ch as u32 as u8, ch.len_utf8()))
}

/// Decodes the escape starting with the backslash at `at`.
fn decode_escape(body: &[u8], at: usize) -> Option<(u8, usize)> {
    match *body.get(at + 1)? {
        b'x' => {
            let high = hex_value(*body.get(at + 2)?)?;
            let low = hex_value(*body.get(at + 3)?)?;

            Some(((high << 4) | low, 4))
        }
        b'\\' => Some((b'\\', 2)),
        b'\'' => Some((b'\'', 2)),
        b'"' => Some((b'"', 2)),
        b'n' => Some((b'\n', 2)),
        b'r' => Some((b'\r', 2)),
        b't' => Some((b'\t', 2)),
        _ => None,
    }
}

#[inline]
fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod escaped_tests {
    use crate::source::PageSource;

    fn all_bytes(source: &super::EscapedStringSource) -> Vec<u8> {
        (0..crate::source::page_count(source.document_size(), source.page_size()))
            .flat_map(|index| source.get_page(index).unwrap())
            .collect()
    }

    #[test]
    fn decodes_hex_escapes() {
        let source = super::EscapedStringSource::new(r"b'AB\x00C'");

        assert!(source.is_recognized());
        assert_eq!(source.document_size(), 4);
        assert_eq!(source.get_page(0).unwrap(), vec![0x41, 0x42, 0x00, 0x43]);
    }

    #[test]
    fn wrapped_forms_and_double_quotes() {
        let bytearray = super::EscapedStringSource::new(r#"bytearray(b"\xff\n")"#);
        let bytes = super::EscapedStringSource::new(r"bytes(b'\\\'')");

        assert_eq!(all_bytes(&bytearray), vec![0xff, b'\n']);
        assert_eq!(all_bytes(&bytes), vec![b'\\', b'\'']);
    }

    #[test]
    fn grammar_mismatch_yields_empty_document() {
        for text in [
            r"b'AB",
            r"u'AB'",
            r"b'A\xZZ'",
            r"b'A'B'",
            r"b'A\q'",
            r"b'AB\'",
            r"bytearray(b'AB'",
            "",
        ] {
            let source = super::EscapedStringSource::new(text);

            assert!(!source.is_recognized(), "{text:?} must not be recognized");
            assert_eq!(source.document_size(), 0, "{text:?} must have length 0");
            assert_eq!(source.get_page(0).unwrap(), Vec::<u8>::new());
            assert!(source.get_page(1).is_err());
        }
    }

    #[test]
    fn empty_literal_is_recognized() {
        let source = super::EscapedStringSource::new("b''");

        assert!(source.is_recognized());
        assert_eq!(source.document_size(), 0);
    }

    #[test]
    fn pages_split_between_escapes() {
        let text = r"b'a\x01bc\x02\x03d\ne'";
        let expected = vec![b'a', 1, b'b', b'c', 2, 3, b'd', b'\n', b'e'];

        for page_size in 1..=10 {
            let source = super::EscapedStringSource::new(text)
                .with_page_size(page_size)
                .unwrap();

            assert_eq!(source.document_size(), 9);
            assert_eq!(all_bytes(&source), expected, "page size {page_size}");
        }
    }

    #[test]
    fn pages_can_be_requested_out_of_order() {
        let source = super::EscapedStringSource::new(r"b'\x00\x01\x02\x03\x04\x05\x06'")
            .with_page_size(2)
            .unwrap();

        assert_eq!(source.get_page(3).unwrap(), vec![6]);
        assert_eq!(source.get_page(1).unwrap(), vec![2, 3]);
        assert_eq!(source.get_page(0).unwrap(), vec![0, 1]);
        assert!(source.get_page(4).is_err());
    }

    #[test]
    fn non_ascii_literal_counts_as_one_byte() {
        let source = super::EscapedStringSource::new("b'\u{e9}A'");

        assert_eq!(source.document_size(), 2);
        assert_eq!(all_bytes(&source), vec![0xe9, 0x41]);
    }

    #[test]
    fn non_ascii_literal_keeps_low_byte_across_pages() {
        let source = super::EscapedStringSource::new("b'\u{e9}\u{20ac}\\x41\u{e9}'")
            .with_page_size(1)
            .unwrap();

        assert_eq!(source.document_size(), 4);
        assert_eq!(all_bytes(&source), vec![0xe9, 0xac, 0x41, 0xe9]);
        assert_eq!(source.get_page(3).unwrap(), vec![0xe9]);
    }
}
