/// What a mutation did to the document, as seen by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentChange {
    Resized { old_size: u64, new_size: u64 },
    /// Bytes changed but the size did not.
    Modified,
}

/// One open binary document: the edited bytes, the caret and the history.
#[derive(Debug)]
pub struct Document {
    history: editor_core::history::UndoHandler,
    config: crate::config::SessionConfig,
    subscribers: Vec<crossbeam_channel::Sender<ContentChange>>,
}

/*

====================================
============= CREATION =============
====================================

*/

impl Document {
    /// Opens a file through a memory map.
    ///
    /// # Errors
    ///
    /// - `DocumentError::Io` if the file cannot be mapped.
    /// - `DocumentError::Page` for an invalid page size.
    pub fn open(
        path: impl AsRef<std::path::Path>,
        config: &crate::config::SessionConfig,
    ) -> crate::errors::DocumentResult<Self> {
        let source = paged_data::source::file::FileSource::open(path.as_ref())?
            .with_page_size(config.page_size)?;

        tracing::debug!(path = %path.as_ref().display(), "opened document");

        Ok(Self::from_source(source, config))
    }

    /// # Errors
    ///
    /// `DocumentError::Page` for an invalid page size.
    pub fn from_bytes(
        bytes: impl Into<std::rc::Rc<[u8]>>,
        config: &crate::config::SessionConfig,
    ) -> crate::errors::DocumentResult<Self> {
        let source =
            paged_data::source::bytes::ByteBufferSource::new(bytes).with_page_size(config.page_size)?;

        Ok(Self::from_source(source, config))
    }

    #[must_use]
    pub fn from_source(
        source: impl paged_data::PageSource + 'static,
        config: &crate::config::SessionConfig,
    ) -> Self {
        let data = paged_data::PagedBinaryData::new(source).with_cache_capacity(config.page_cache_capacity);

        Self {
            history: editor_core::history::UndoHandler::with_limits(
                editor_core::buffer::EditBuffer::new(data),
                config.undo_maximum_count,
                config.undo_maximum_size,
            ),
            config: config.clone(),
            subscribers: Vec::new(),
        }
    }

    /// Swaps the backing source. History is cleared and the caret goes back
    /// to the start.
    pub fn replace_source(&mut self, source: impl paged_data::PageSource + 'static) {
        let old_size = self.len();
        let data =
            paged_data::PagedBinaryData::new(source).with_cache_capacity(self.config.page_cache_capacity);

        self.history.buffer_mut().reset_to(data);
        self.history.clear();
        self.publish(old_size);
    }
}

/*

====================================
============= QUERIES ==============
====================================

*/

impl Document {
    #[inline]
    #[must_use]
    pub fn len(&self) -> u64 {
        self.history.buffer().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.buffer().is_empty()
    }

    #[inline]
    #[must_use]
    pub fn cursor(&self) -> editor_core::cursor::Cursor {
        self.history.buffer().cursor
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &editor_core::history::UndoHandler {
        &self.history
    }

    /// For listener registration and limit changes. Buffer edits made through
    /// it are not published to subscribers.
    #[inline]
    pub fn history_mut(&mut self) -> &mut editor_core::history::UndoHandler {
        &mut self.history
    }

    /// # Errors
    ///
    /// `EditError::OutOfBounds` unless `position + length <= self.len()`.
    pub fn read(&self, position: u64, length: u64) -> crate::errors::DocumentResult<Vec<u8>> {
        Ok(self.history.buffer().read(position, length)?)
    }

    /// True when the content differs from the last saved state.
    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        !self.history.is_synced()
    }

    /// Receives one [`ContentChange`] per mutation. Dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&mut self) -> crossbeam_channel::Receiver<ContentChange> {
        let (sender, receiver) = crossbeam_channel::unbounded();

        self.subscribers.push(sender);

        receiver
    }

    fn publish(&mut self, old_size: u64) {
        let new_size = self.len();
        let change = if old_size == new_size {
            ContentChange::Modified
        } else {
            ContentChange::Resized { old_size, new_size }
        };

        self.subscribers.retain(|sender| sender.send(change).is_ok());
    }
}

/*

====================================
============= INTENTS ==============
====================================

*/

impl Document {
    fn submit(
        &mut self,
        command: Option<Box<dyn editor_core::command::BinaryDataCommand>>,
    ) -> crate::errors::DocumentResult<()> {
        let Some(command) = command else {
            return Ok(());
        };

        let old_size = self.len();
        let position = self.history.command_position();

        self.history.execute(command)?;

        if self.history.command_position() != position || self.len() != old_size {
            self.publish(old_size);
        }

        Ok(())
    }

    fn boxed(
        command: editor_core::command::data::DataCommand,
    ) -> Option<Box<dyn editor_core::command::BinaryDataCommand>> {
        Some(Box::new(command))
    }

    /// Removes the selection, if any.
    fn remove_selection(&self) -> Option<Box<dyn editor_core::command::BinaryDataCommand>> {
        let cursor = self.cursor();

        if cursor.no_selection() {
            return None;
        }

        Self::boxed(editor_core::command::data::DataCommand::remove(
            cursor.start(),
            cursor.selection_len(),
        ))
    }

    /// Inserts at the caret. A selection is replaced, as one history entry.
    ///
    /// # Errors
    ///
    /// Propagates the history's failure; the document is left unchanged.
    pub fn insert(&mut self, bytes: &[u8]) -> crate::errors::DocumentResult<()> {
        let position = self.cursor().start();
        let insert = (!bytes.is_empty())
            .then(|| Self::boxed(editor_core::command::data::DataCommand::insert(position, bytes)))
            .flatten();

        self.submit(editor_core::command::compound::CompoundCommand::build([
            self.remove_selection(),
            insert,
        ]))
    }

    /// Forward delete: the selection, or the byte after the caret.
    ///
    /// # Errors
    ///
    /// See [`Document::insert`].
    pub fn delete(&mut self) -> crate::errors::DocumentResult<()> {
        let cursor = self.cursor();
        let command = if !cursor.no_selection() {
            self.remove_selection()
        } else if cursor.head.data_position < self.len() {
            Self::boxed(editor_core::command::data::DataCommand::remove(cursor.head.data_position, 1))
        } else {
            None
        };

        self.submit(command)
    }

    /// Deletes the selection, or the byte before the caret.
    ///
    /// # Errors
    ///
    /// See [`Document::insert`].
    pub fn backspace(&mut self) -> crate::errors::DocumentResult<()> {
        let cursor = self.cursor();
        let command = if !cursor.no_selection() {
            self.remove_selection()
        } else if let Some(position) = cursor.head.data_position.checked_sub(1) {
            Self::boxed(editor_core::command::data::DataCommand::remove(position, 1))
        } else {
            None
        };

        self.submit(command)
    }

    /// Overwrites from the caret. Bytes running past the end are appended.
    ///
    /// # Errors
    ///
    /// See [`Document::insert`].
    pub fn overwrite(&mut self, bytes: &[u8]) -> crate::errors::DocumentResult<()> {
        let position = self.cursor().start();
        let room = <u64 as TryInto<usize>>::try_into(self.len().saturating_sub(position)).unwrap_or(usize::MAX);
        let (inside, past_end) = bytes.split_at(room.min(bytes.len()));
        let overwrite = (!inside.is_empty())
            .then(|| Self::boxed(editor_core::command::data::DataCommand::overwrite(position, inside)))
            .flatten();
        let append = (!past_end.is_empty())
            .then(|| Self::boxed(editor_core::command::data::DataCommand::insert(self.len(), past_end)))
            .flatten();

        self.submit(editor_core::command::compound::CompoundCommand::build([
            overwrite, append,
        ]))
    }

    /// Moves the selected bytes so they start at `destination`, given in
    /// current coordinates.
    ///
    /// # Errors
    ///
    /// `EditError::OperationFailure` if `destination` lies inside the
    /// selection or past the end.
    pub fn move_selection(&mut self, destination: u64) -> crate::errors::DocumentResult<()> {
        let cursor = self.cursor();

        if cursor.no_selection() {
            return Ok(());
        }

        self.submit(Self::boxed(editor_core::command::data::DataCommand::move_data(
            cursor.range(),
            destination,
        )))
    }

    /// Selects `range`, clamped to the document. The caret ends at `range.end`.
    pub fn select(&mut self, range: std::ops::Range<u64>) {
        let size = self.len();
        let cursor = &mut self.history.buffer_mut().cursor;

        *cursor = editor_core::cursor::Cursor::new_selection(range.start, range.end);
        cursor.clamp_to(size);
    }

    /// Moves the caret and keeps the anchor, growing or shrinking the
    /// selection.
    pub fn extend_selection(&mut self, position: u64) {
        let size = self.len();

        self.history.buffer_mut().cursor.set_head(position.min(size));
    }

    pub fn clear_selection(&mut self) {
        self.history.buffer_mut().cursor.clear_selection();
    }

    /// Swaps anchor and caret.
    pub fn invert_selection(&mut self) {
        self.history.buffer_mut().cursor.invert();
    }

    pub fn set_caret(&mut self, position: u64) {
        self.history.buffer_mut().move_caret(position);
    }

    /// Moves the caret to digit `code_offset` of the byte it sits on, e.g.
    /// the low nibble while typing hex.
    pub fn set_code_offset(&mut self, code_offset: u32) {
        self.history.buffer_mut().cursor.head.code_offset = code_offset;
    }
}

/*

====================================
============= HISTORY ==============
====================================

*/

impl Document {
    /// # Errors
    ///
    /// `EditError::IllegalState` when there is nothing to undo.
    pub fn undo(&mut self) -> crate::errors::DocumentResult<()> {
        self.navigate(|history| history.undo())
    }

    /// # Errors
    ///
    /// `EditError::IllegalState` when there is nothing to redo.
    pub fn redo(&mut self) -> crate::errors::DocumentResult<()> {
        self.navigate(|history| history.redo())
    }

    /// # Errors
    ///
    /// See [`editor_core::history::UndoHandler::set_command_position`].
    pub fn set_command_position(&mut self, target: usize) -> crate::errors::DocumentResult<()> {
        self.navigate(|history| history.set_command_position(target))
    }

    /// Marks the current content as saved.
    pub fn mark_saved(&mut self) {
        self.history.set_sync_point();
    }

    /// Walks the history back (or forward) to the saved content.
    ///
    /// # Errors
    ///
    /// `EditError::IllegalState` when the saved state is no longer in the
    /// history.
    pub fn revert_to_saved(&mut self) -> crate::errors::DocumentResult<()> {
        self.navigate(|history| history.do_sync())
    }

    /// Publishes whenever the walk moved, including a walk that failed
    /// halfway.
    fn navigate(
        &mut self,
        walk: impl FnOnce(&mut editor_core::history::UndoHandler) -> editor_core::errors::EditResult<()>,
    ) -> crate::errors::DocumentResult<()> {
        let old_size = self.len();
        let position = self.history.command_position();
        let result = walk(&mut self.history);

        if self.history.command_position() != position {
            self.publish(old_size);
        }

        Ok(result?)
    }
}

/*

====================================
============== EXPORT ==============
====================================

*/

impl Document {
    /// Streams the current content page by page and returns the number of
    /// bytes written.
    ///
    /// # Errors
    ///
    /// - `DocumentError::Io` from the writer.
    /// - Read errors from the backing source.
    pub fn write_to(&self, mut writer: impl std::io::Write) -> crate::errors::DocumentResult<u64> {
        let size = self.len();
        let chunk = <usize as TryInto<u64>>::try_into(self.config.page_size)
            .map_err(editor_core::errors::EditError::from)?
            .max(1);
        let mut offset = 0;

        while offset < size {
            let length = chunk.min(size - offset);

            writer.write_all(&self.read(offset, length)?)?;
            offset += length;
        }

        writer.flush()?;

        Ok(size)
    }
}
