/// A file mapped read-only into the address space.
///
/// The operating system pages the content in on demand, so opening a
/// multi-gigabyte file costs nothing until bytes are actually requested.
#[derive(Debug)]
pub struct MmapFile {
    _file: std::fs::File,
    mmap: memmap2::Mmap,
    path: std::path::PathBuf,
}

impl MmapFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path_buf)?;

        // SAFETY:
        // - File is opened read-only
        // - We keep the file handle alive in struct
        // - Caller only gets immutable &[u8]
        let mmap = unsafe { memmap2::Mmap::map(&file)? };

        Ok(Self {
            _file: file,
            mmap,
            path: path_buf,
        })
    }

    /// Exact byte range `start..start + length`.
    /// Returns `None` if the range goes out of bounds or overflows.
    #[inline]
    #[must_use]
    pub fn range(&self, start: u64, length: u64) -> Option<&[u8]> {
        let start = <u64 as TryInto<usize>>::try_into(start).ok()?;
        let length = <u64 as TryInto<usize>>::try_into(length).ok()?;
        let end = start.checked_add(length)?;

        self.mmap.get(start..end)
    }

    /// The `index`-th chunk of `page_size` bytes.
    ///
    /// The chunk that contains the end of the file is short (possibly empty
    /// when the length is an exact multiple of `page_size`). Indices past that
    /// chunk return `None`.
    #[must_use]
    pub fn page(&self, index: u64, page_size: usize) -> Option<&[u8]> {
        if page_size == 0 {
            return None;
        }

        let page_size = <usize as TryInto<u64>>::try_into(page_size).ok()?;
        let start = index.checked_mul(page_size)?;
        let len = self.len_u64();

        if start > len {
            return None;
        }

        self.range(start, page_size.min(len - start))
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    /// File length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    #[must_use]
    pub fn len_u64(&self) -> u64 {
        // usize is at most 64 bits on every supported target
        self.mmap.len() as u64
    }

    /// Whether file is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of mapped file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(test)]
mod mmap_tests {
    use std::io::Write;

    fn mapped(content: &[u8]) -> (tempfile::NamedTempFile, super::MmapFile) {
        let mut temp = tempfile::NamedTempFile::new().unwrap();

        temp.write_all(content).unwrap();
        temp.as_file().sync_all().unwrap();

        let mmap = super::MmapFile::open(temp.path()).unwrap();

        (temp, mmap)
    }

    #[test]
    fn range_inside_and_outside() {
        let (_temp, file) = mapped(b"0123456789");

        assert_eq!(file.range(2, 3), Some(&b"234"[..]));
        assert_eq!(file.range(8, 2), Some(&b"89"[..]));
        assert_eq!(file.range(8, 3), None, "range past the end must fail");
        assert_eq!(file.range(u64::MAX, 2), None, "overflowing range must fail");
    }

    #[test]
    fn pages_cover_the_whole_file() {
        let (_temp, file) = mapped(b"0123456789");

        assert_eq!(file.page(0, 4), Some(&b"0123"[..]));
        assert_eq!(file.page(1, 4), Some(&b"4567"[..]));
        assert_eq!(file.page(2, 4), Some(&b"89"[..]));
        assert_eq!(file.page(3, 4), None);
    }

    #[test]
    fn exact_multiple_yields_trailing_empty_page() {
        let (_temp, file) = mapped(b"01234567");

        assert_eq!(file.page(1, 4), Some(&b"4567"[..]));
        assert_eq!(file.page(2, 4), Some(&b""[..]));
        assert_eq!(file.page(3, 4), None);
    }

    #[test]
    fn empty_file() {
        let (_temp, file) = mapped(b"");

        assert!(file.is_empty());
        assert_eq!(file.len_u64(), 0);
        assert_eq!(file.page(0, 4096), Some(&b""[..]));
        assert_eq!(file.page(0, 0), None, "zero page size is rejected");
    }
}
