/// A caret location in binary data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    /// Byte offset in the document. Equal to the size when the caret sits
    /// past the last byte.
    pub data_position: u64,
    /// Digit inside the byte's code (e.g. the low nibble of a hex pair).
    pub code_offset: u32,
}

impl Position {
    #[must_use]
    pub fn new(data_position: u64, code_offset: u32) -> Self {
        Self {
            data_position,
            code_offset,
        }
    }
}

/// Represents a caret and its associated selection range.
/// Uses the "Anchor and Head" directional selection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// The fixed starting point of a selection.
    pub anchor: Position,
    /// The active, moving end of a selection (where the blinking caret is).
    pub head: Position,
}

impl Cursor {
    #[must_use]
    pub fn new(data_position: u64) -> Self {
        let pos = Position::new(data_position, 0);

        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Creates a selection from an anchor to a head.
    #[must_use]
    pub fn new_selection(anchor: u64, head: u64) -> Self {
        Self {
            anchor: Position::new(anchor, 0),
            head: Position::new(head, 0),
        }
    }

    /// Returns true if this is just a caret (no bytes selected).
    #[inline]
    #[must_use]
    pub fn no_selection(&self) -> bool {
        self.anchor.data_position == self.head.data_position
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> u64 {
        self.anchor.data_position.min(self.head.data_position)
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> u64 {
        self.anchor.data_position.max(self.head.data_position)
    }

    /// Selected byte range regardless of selection direction.
    #[inline]
    #[must_use]
    pub fn range(&self) -> std::ops::Range<u64> {
        self.start()..self.end()
    }

    #[inline]
    #[must_use]
    pub fn selection_len(&self) -> u64 {
        self.end() - self.start()
    }

    /// Moves the head to a new position, updating the selection.
    pub fn set_head(&mut self, data_position: u64) {
        self.head = Position::new(data_position, 0);
    }

    /// Places the caret at the start of `data_position` and drops the selection.
    pub fn move_to(&mut self, data_position: u64) {
        self.head = Position::new(data_position, 0);
        self.anchor = self.head;
    }

    /// Moves both anchor and head to the same position (clears selection).
    pub fn clear_selection(&mut self) {
        self.anchor = self.head;
    }

    /// Inverts the direction of the selection.
    pub fn invert(&mut self) {
        std::mem::swap(&mut self.anchor, &mut self.head);
    }

    /// Pulls both ends back inside a document of `size` bytes.
    pub fn clamp_to(&mut self, size: u64) {
        if self.anchor.data_position > size {
            self.anchor = Position::new(size, 0);
        }

        if self.head.data_position > size {
            self.head = Position::new(size, 0);
        }
    }
}
