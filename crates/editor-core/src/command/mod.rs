pub mod compound;
pub mod data;

/// A named, timestamped history entry that can be replayed in both
/// directions against an [`crate::buffer::EditBuffer`].
pub trait BinaryDataCommand: std::fmt::Debug {
    fn kind(&self) -> crate::enums::CommandKind;

    fn caption(&self) -> &str;

    /// Set by the first [`BinaryDataCommand::use_command`], never changed
    /// afterwards.
    fn execution_time(&self) -> Option<std::time::SystemTime>;

    /// Stamps the execution time if it is not set yet.
    fn use_command(&mut self);

    /// First execution: stamps the command and then runs it forward.
    ///
    /// # Errors
    ///
    /// Whatever [`BinaryDataCommand::redo`] reports.
    fn execute(&mut self, buffer: &mut crate::buffer::EditBuffer) -> crate::errors::EditResult<()> {
        self.use_command();
        self.redo(buffer)
    }

    /// # Errors
    ///
    /// `EditError::OperationFailure` if the buffer does not satisfy the
    /// command's preconditions, `EditError::IllegalState` if the command is
    /// already applied. The buffer is left as it was.
    fn redo(&mut self, buffer: &mut crate::buffer::EditBuffer) -> crate::errors::EditResult<()>;

    /// # Errors
    ///
    /// `EditError::IllegalState` if the command is not applied, otherwise as
    /// for [`BinaryDataCommand::redo`].
    fn undo(&mut self, buffer: &mut crate::buffer::EditBuffer) -> crate::errors::EditResult<()>;

    fn can_undo(&self) -> bool {
        true
    }

    /// Releases whatever the command holds once it leaves the history.
    ///
    /// # Errors
    ///
    /// Implementation specific. Callers log and continue.
    fn dispose(&mut self) -> crate::errors::EditResult<()> {
        Ok(())
    }

    /// Bytes of payload retained for redo and undo.
    fn footprint(&self) -> u64;

    /// True for a command that would not change anything.
    fn is_empty(&self) -> bool {
        false
    }

    fn as_compound_mut(&mut self) -> Option<&mut crate::command::compound::CompoundCommand> {
        None
    }
}
