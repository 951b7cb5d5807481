use std::ops::{AddAssign, SubAssign};

pub const DEFAULT_MAXIMUM_COUNT: usize = 1024;
pub const DEFAULT_MAXIMUM_SIZE: u64 = 65_535;

/// Observer of history changes. Called synchronously right after the
/// mutation that triggered it.
pub trait UndoUpdateListener {
    fn undo_command_position_changed(&self);

    fn undo_command_added(&self, command: &dyn crate::command::BinaryDataCommand);
}

/// Linear undo history over one edit buffer.
///
/// The history is a single command list plus a position: commands before
/// the position are applied, commands from it on can be redone. Executing a
/// new command drops everything that could have been redone.
pub struct UndoHandler {
    buffer: crate::buffer::EditBuffer,
    commands: Vec<Box<dyn crate::command::BinaryDataCommand>>,
    position: usize,
    sync_point: Option<usize>,
    maximum_count: usize,
    maximum_size: u64,
    used_size: u64,
    listeners: Vec<std::rc::Rc<dyn UndoUpdateListener>>,
}

impl std::fmt::Debug for UndoHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoHandler")
            .field("buffer", &self.buffer)
            .field("commands", &self.commands)
            .field("position", &self.position)
            .field("sync_point", &self.sync_point)
            .field("maximum_count", &self.maximum_count)
            .field("maximum_size", &self.maximum_size)
            .field("used_size", &self.used_size)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/*

====================================
============= CREATION =============
====================================

*/

impl UndoHandler {
    #[must_use]
    pub fn new(buffer: crate::buffer::EditBuffer) -> Self {
        Self::with_limits(buffer, DEFAULT_MAXIMUM_COUNT, DEFAULT_MAXIMUM_SIZE)
    }

    /// A fresh history starts synced at position 0.
    #[must_use]
    pub fn with_limits(buffer: crate::buffer::EditBuffer, maximum_count: usize, maximum_size: u64) -> Self {
        Self {
            buffer,
            commands: Vec::new(),
            position: 0,
            sync_point: Some(0),
            maximum_count,
            maximum_size,
            used_size: 0,
            listeners: Vec::new(),
        }
    }
}

/*

====================================
============= QUERIES ==============
====================================

*/

impl UndoHandler {
    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &crate::buffer::EditBuffer {
        &self.buffer
    }

    /// Direct access bypasses the history; edits made through it are not
    /// recorded unless followed by [`UndoHandler::add_command`].
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut crate::buffer::EditBuffer {
        &mut self.buffer
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.position < self.commands.len()
    }

    #[inline]
    #[must_use]
    pub fn command_position(&self) -> usize {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn command_list(&self) -> &[Box<dyn crate::command::BinaryDataCommand>] {
        &self.commands
    }

    #[inline]
    #[must_use]
    pub fn maximum_undo(&self) -> usize {
        self.maximum_count
    }

    #[inline]
    #[must_use]
    pub fn undo_maximum_size(&self) -> u64 {
        self.maximum_size
    }

    #[inline]
    #[must_use]
    pub fn used_size(&self) -> u64 {
        self.used_size
    }

    #[inline]
    #[must_use]
    pub fn sync_point(&self) -> Option<usize> {
        self.sync_point
    }

    /// True while the position sits on the sync point.
    #[inline]
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.sync_point == Some(self.position)
    }
}

/*

====================================
============ LISTENERS =============
====================================

*/

impl UndoHandler {
    pub fn add_undo_update_listener(&mut self, listener: std::rc::Rc<dyn UndoUpdateListener>) {
        self.listeners.push(listener);
    }

    pub fn remove_undo_update_listener(&mut self, listener: &std::rc::Rc<dyn UndoUpdateListener>) {
        self.listeners
            .retain(|registered| !std::rc::Rc::ptr_eq(registered, listener));
    }

    fn notify_position_changed(&self) {
        for listener in &self.listeners {
            listener.undo_command_position_changed();
        }
    }

    fn notify_command_added(&self) {
        if let Some(command) = self.commands.last() {
            for listener in &self.listeners {
                listener.undo_command_added(command.as_ref());
            }
        }
    }
}

/*

====================================
============= RECORDING ============
====================================

*/

impl UndoHandler {
    /// Runs `command` and records it at the current position.
    ///
    /// Empty commands are dropped without touching the history.
    ///
    /// # Errors
    ///
    /// Whatever the command's first execution reports. The history is not
    /// touched in that case.
    pub fn execute(
        &mut self,
        mut command: Box<dyn crate::command::BinaryDataCommand>,
    ) -> crate::errors::EditResult<()> {
        if command.is_empty() {
            tracing::trace!(caption = command.caption(), "skipping empty command");

            return Ok(());
        }

        command.execute(&mut self.buffer)?;
        self.record(command);

        Ok(())
    }

    /// Records a command whose effect the caller already applied.
    ///
    /// # Errors
    ///
    /// Never fails today; kept fallible to match [`UndoHandler::execute`].
    pub fn add_command(
        &mut self,
        mut command: Box<dyn crate::command::BinaryDataCommand>,
    ) -> crate::errors::EditResult<()> {
        command.use_command();
        self.record(command);

        Ok(())
    }

    fn record(&mut self, command: Box<dyn crate::command::BinaryDataCommand>) {
        self.truncate_redo();
        self.commands.push(command);
        self.position.add_assign(1);
        self.recompute_used_size();
        self.notify_command_added();
        self.evict();
        self.notify_position_changed();
    }

    /// Drops every command past the position.
    fn truncate_redo(&mut self) {
        if self.position == self.commands.len() {
            return;
        }

        tracing::debug!(
            dropped = self.commands.len() - self.position,
            position = self.position,
            "truncating redo history"
        );

        if let Some(point) = self.sync_point
            && point > self.position
        {
            tracing::debug!(point, "sync point is no longer reachable");
            self.sync_point = None;
        }

        for mut command in self.commands.drain(self.position..) {
            if let Err(error) = command.dispose() {
                tracing::warn!(%error, caption = command.caption(), "failed to dispose command");
            }
        }
    }

    fn recompute_used_size(&mut self) {
        self.used_size = self.commands.iter().map(|command| command.footprint()).sum();
    }

    /// Removes the oldest commands until both limits hold again. Commands
    /// that can still be redone are never evicted.
    fn evict(&mut self) {
        while self.position > 0
            && (self.used_size > self.maximum_size || self.commands.len() > self.maximum_count)
        {
            let mut command = self.commands.remove(0);

            self.position.sub_assign(1);
            self.used_size = self.used_size.saturating_sub(command.footprint());
            self.sync_point = match self.sync_point {
                Some(0) | None => None,
                Some(point) => Some(point - 1),
            };

            tracing::debug!(
                caption = command.caption(),
                used_size = self.used_size,
                "evicted oldest command"
            );

            if let Err(error) = command.dispose() {
                tracing::warn!(%error, caption = command.caption(), "failed to dispose command");
            }
        }
    }

    /// Disposes the whole history. The current content becomes the synced
    /// state.
    pub fn clear(&mut self) {
        for mut command in self.commands.drain(..) {
            if let Err(error) = command.dispose() {
                tracing::warn!(%error, caption = command.caption(), "failed to dispose command");
            }
        }

        self.position = 0;
        self.used_size = 0;
        self.sync_point = Some(0);
        self.notify_position_changed();
    }

    pub fn set_undo_maximum_count(&mut self, maximum_count: usize) {
        self.maximum_count = maximum_count;
        self.recompute_used_size();
        self.evict();
    }

    pub fn set_undo_maximum_size(&mut self, maximum_size: u64) {
        self.maximum_size = maximum_size;
        self.recompute_used_size();
        self.evict();
    }
}

/*

====================================
=========== NAVIGATION =============
====================================

*/

impl UndoHandler {
    /// # Errors
    ///
    /// See [`UndoHandler::perform_undo`].
    pub fn undo(&mut self) -> crate::errors::EditResult<()> {
        self.perform_undo(1)
    }

    /// # Errors
    ///
    /// See [`UndoHandler::perform_redo`].
    pub fn redo(&mut self) -> crate::errors::EditResult<()> {
        self.perform_redo(1)
    }

    /// Undoes `count` commands, newest first.
    ///
    /// # Errors
    ///
    /// - `EditError::IllegalState` if fewer than `count` commands can be
    ///   undone. Nothing is touched.
    /// - The error of the first failing step. Steps completed before it
    ///   stay undone.
    pub fn perform_undo(&mut self, count: usize) -> crate::errors::EditResult<()> {
        if count > self.position {
            return Err(crate::errors::EditError::illegal_state(format!(
                "cannot undo {count} commands at position {}",
                self.position
            )));
        }

        if let Some(blocked) = self.commands[self.position - count..self.position]
            .iter()
            .find(|command| !command.can_undo())
        {
            return Err(crate::errors::EditError::illegal_state(format!(
                "{} cannot be undone",
                blocked.caption()
            )));
        }

        let result = self.step(count, |handler| {
            let index = handler.position - 1;

            handler.commands[index].undo(&mut handler.buffer)?;
            handler.position.sub_assign(1);

            Ok(())
        });

        self.notify_position_changed();

        result
    }

    /// Redoes `count` commands, oldest first.
    ///
    /// # Errors
    ///
    /// As for [`UndoHandler::perform_undo`].
    pub fn perform_redo(&mut self, count: usize) -> crate::errors::EditResult<()> {
        let available = self.commands.len() - self.position;

        if count > available {
            return Err(crate::errors::EditError::illegal_state(format!(
                "cannot redo {count} commands, {available} available"
            )));
        }

        let result = self.step(count, |handler| {
            let index = handler.position;

            handler.commands[index].redo(&mut handler.buffer)?;
            handler.position.add_assign(1);

            Ok(())
        });

        self.notify_position_changed();

        result
    }

    fn step(
        &mut self,
        count: usize,
        mut one: impl FnMut(&mut Self) -> crate::errors::EditResult<()>,
    ) -> crate::errors::EditResult<()> {
        for _ in 0..count {
            if let Err(error) = one(self) {
                tracing::warn!(%error, position = self.position, "history step failed");
                self.recompute_used_size();

                return Err(error);
            }
        }

        // Undo and redo change what each command holds
        self.recompute_used_size();

        Ok(())
    }

    /// Undoes or redoes until the position equals `target`.
    ///
    /// # Errors
    ///
    /// `EditError::IllegalState` if `target` is past the command list,
    /// otherwise as for [`UndoHandler::perform_undo`].
    pub fn set_command_position(&mut self, target: usize) -> crate::errors::EditResult<()> {
        if target > self.commands.len() {
            return Err(crate::errors::EditError::illegal_state(format!(
                "position {target} is past {} commands",
                self.commands.len()
            )));
        }

        match target.cmp(&self.position) {
            std::cmp::Ordering::Less => self.perform_undo(self.position - target),
            std::cmp::Ordering::Greater => self.perform_redo(target - self.position),
            std::cmp::Ordering::Equal => Ok(()),
        }
    }

    /// Marks the current position as saved.
    pub fn set_sync_point(&mut self) {
        self.sync_point = Some(self.position);
    }

    /// # Errors
    ///
    /// `EditError::IllegalState` if `point` is past the command list.
    pub fn set_sync_point_at(&mut self, point: usize) -> crate::errors::EditResult<()> {
        if point > self.commands.len() {
            return Err(crate::errors::EditError::illegal_state(format!(
                "sync point {point} is past {} commands",
                self.commands.len()
            )));
        }

        self.sync_point = Some(point);

        Ok(())
    }

    pub fn clear_sync_point(&mut self) {
        self.sync_point = None;
    }

    /// Walks back or forward to the sync point.
    ///
    /// # Errors
    ///
    /// `EditError::IllegalState` if there is no sync point, otherwise as for
    /// [`UndoHandler::set_command_position`].
    pub fn do_sync(&mut self) -> crate::errors::EditResult<()> {
        let Some(point) = self.sync_point else {
            return Err(crate::errors::EditError::illegal_state("no sync point"));
        };

        self.set_command_position(point)
    }
}
