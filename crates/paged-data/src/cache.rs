/// Pages kept around by default.
pub const DEFAULT_CAPACITY: usize = 4;

/// A small most-recently-used page cache.
///
/// Front is most recent. A capacity of zero turns it into a pass-through.
#[derive(Debug)]
pub struct PageCache {
    capacity: usize,
    entries: std::collections::VecDeque<(u64, std::rc::Rc<[u8]>)>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PageCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: std::collections::VecDeque::with_capacity(capacity),
        }
    }

    /// Looks up a page and marks it most recently used.
    pub fn get(&mut self, index: u64) -> Option<std::rc::Rc<[u8]>> {
        let position = self.entries.iter().position(|(cached, _)| *cached == index)?;
        let entry = self.entries.remove(position)?;
        let page = entry.1.clone();

        self.entries.push_front(entry);

        Some(page)
    }

    /// Stores a page, returning the index of the page evicted to make room.
    pub fn insert(&mut self, index: u64, page: std::rc::Rc<[u8]>) -> Option<u64> {
        if self.capacity == 0 {
            return None;
        }

        self.entries.retain(|(cached, _)| *cached != index);
        self.entries.push_front((index, page));

        if self.entries.len() > self.capacity {
            return self.entries.pop_back().map(|(evicted, _)| evicted);
        }

        None
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
