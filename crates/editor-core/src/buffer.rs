/// The buffer commands act on: the edited bytes plus the caret that
/// commands move as a side effect of redo and undo.
#[derive(Debug)]
pub struct EditBuffer {
    pub data: crate::piece_table::table::PieceTable,
    pub cursor: crate::cursor::Cursor,
}

impl EditBuffer {
    #[must_use]
    pub fn new(original: paged_data::PagedBinaryData) -> Self {
        Self {
            data: crate::piece_table::table::PieceTable::new(original),
            cursor: crate::cursor::Cursor::default(),
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<std::rc::Rc<[u8]>>) -> Self {
        Self::new(paged_data::PagedBinaryData::from_bytes(bytes))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> u64 {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// # Errors
    ///
    /// See [`crate::operation::Operation::apply`].
    pub fn apply(
        &mut self,
        operation: &crate::operation::Operation,
    ) -> crate::errors::EditResult<crate::operation::Operation> {
        operation.apply(&mut self.data)
    }

    /// # Errors
    ///
    /// `EditError::OutOfBounds` unless `position + length <= self.len()`.
    pub fn read(&self, position: u64, length: u64) -> crate::errors::EditResult<Vec<u8>> {
        self.data.read(position, length)
    }

    /// Puts the caret at `position`, dropping any selection.
    pub fn move_caret(&mut self, position: u64) {
        self.cursor.move_to(position.min(self.len()));
    }

    /// Swaps the original data and forgets every edit and the caret.
    pub fn reset_to(&mut self, original: paged_data::PagedBinaryData) {
        self.data.reset_to(original);
        self.cursor = crate::cursor::Cursor::default();
    }
}
