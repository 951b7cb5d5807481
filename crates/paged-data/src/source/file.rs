/// Pages straight out of a memory-mapped file.
///
/// Nothing is read up front; each page request touches only the mapped
/// region it covers.
#[derive(Debug)]
pub struct FileSource {
    file: io::mmap::MmapFile,
    page_size: usize,
}

impl FileSource {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        Ok(Self::new(io::mmap::MmapFile::open(path)?))
    }

    #[must_use]
    pub fn new(file: io::mmap::MmapFile) -> Self {
        Self {
            file,
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
    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

impl crate::source::PageSource for FileSource {
    #[inline]
    fn page_size(&self) -> usize {
        self.page_size
    }

    #[inline]
    fn document_size(&self) -> u64 {
        self.file.len_u64()
    }

    fn get_page(&self, index: u64) -> crate::errors::PageResult<Vec<u8>> {
        self.file
            .page(index, self.page_size)
            .map(<[u8]>::to_vec)
            .ok_or(crate::errors::PageError::PageOutOfBounds {
                index,
                last_index: self.document_size() / self.page_size as u64,
            })
    }
}
