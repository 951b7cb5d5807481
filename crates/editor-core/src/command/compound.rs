use crate::command::BinaryDataCommand;

/// An ordered group of commands recorded as one history entry.
///
/// Redo runs the children in order and undo in reverse. A child failing
/// midway rolls the group back so the buffer never holds half of it.
#[derive(Debug)]
pub struct CompoundCommand {
    caption: String,
    execution_time: Option<std::time::SystemTime>,
    commands: Vec<Box<dyn BinaryDataCommand>>,
}

impl Default for CompoundCommand {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CompoundCommand {
    #[must_use]
    pub fn new(commands: Vec<Box<dyn BinaryDataCommand>>) -> Self {
        Self {
            caption: crate::enums::CommandKind::Compound.caption().to_owned(),
            execution_time: None,
            commands,
        }
    }

    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn append_command(&mut self, command: Box<dyn BinaryDataCommand>) {
        self.commands.push(command);
    }

    pub fn append_commands(&mut self, commands: impl IntoIterator<Item = Box<dyn BinaryDataCommand>>) {
        self.commands.extend(commands);
    }

    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[Box<dyn BinaryDataCommand>] {
        &self.commands
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Joins two optional commands.
    ///
    /// Absent commands are skipped and a single command is returned as is.
    /// A group is only created once there are two real commands; when the
    /// first one already is a group, the second is appended to it.
    #[must_use]
    pub fn compose(
        first: Option<Box<dyn BinaryDataCommand>>,
        second: Option<Box<dyn BinaryDataCommand>>,
    ) -> Option<Box<dyn BinaryDataCommand>> {
        let (mut first, second) = match (first, second) {
            (None, second) => return second,
            (first, None) => return first,
            (Some(first), Some(second)) => (first, second),
        };

        match first.as_compound_mut() {
            Some(compound) => compound.append_command(second),
            None => return Some(Box::new(CompoundCommand::new(vec![first, second]))),
        }

        Some(first)
    }

    /// Folds a sequence of optional commands with [`CompoundCommand::compose`].
    #[must_use]
    pub fn build(
        commands: impl IntoIterator<Item = Option<Box<dyn BinaryDataCommand>>>,
    ) -> Option<Box<dyn BinaryDataCommand>> {
        commands.into_iter().fold(None, Self::compose)
    }
}

impl BinaryDataCommand for CompoundCommand {
    #[inline]
    fn kind(&self) -> crate::enums::CommandKind {
        crate::enums::CommandKind::Compound
    }

    #[inline]
    fn caption(&self) -> &str {
        &self.caption
    }

    #[inline]
    fn execution_time(&self) -> Option<std::time::SystemTime> {
        self.execution_time
    }

    fn use_command(&mut self) {
        if self.execution_time.is_none() {
            self.execution_time = Some(std::time::SystemTime::now());
        }

        for command in &mut self.commands {
            command.use_command();
        }
    }

    fn redo(&mut self, buffer: &mut crate::buffer::EditBuffer) -> crate::errors::EditResult<()> {
        for index in 0..self.commands.len() {
            if let Err(error) = self.commands[index].redo(buffer) {
                for done in self.commands[..index].iter_mut().rev() {
                    if let Err(rollback) = done.undo(buffer) {
                        tracing::warn!(%rollback, caption = done.caption(), "compound rollback step failed");
                    }
                }

                return Err(error);
            }
        }

        Ok(())
    }

    fn undo(&mut self, buffer: &mut crate::buffer::EditBuffer) -> crate::errors::EditResult<()> {
        let count = self.commands.len();

        for index in (0..count).rev() {
            if let Err(error) = self.commands[index].undo(buffer) {
                for undone in &mut self.commands[index + 1..] {
                    if let Err(rollback) = undone.redo(buffer) {
                        tracing::warn!(%rollback, caption = undone.caption(), "compound rollback step failed");
                    }
                }

                return Err(error);
            }
        }

        Ok(())
    }

    fn can_undo(&self) -> bool {
        self.commands.iter().all(|command| command.can_undo())
    }

    fn dispose(&mut self) -> crate::errors::EditResult<()> {
        let mut first_error = None;

        for command in &mut self.commands {
            if let Err(error) = command.dispose() {
                first_error.get_or_insert(error);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    fn footprint(&self) -> u64 {
        self.commands.iter().map(|command| command.footprint()).sum()
    }

    fn is_empty(&self) -> bool {
        self.commands.iter().all(|command| command.is_empty())
    }

    fn as_compound_mut(&mut self) -> Option<&mut CompoundCommand> {
        Some(self)
    }
}

#[cfg(test)]
mod compound_command_tests {
    use crate::command::BinaryDataCommand;

    fn boxed(command: crate::command::data::DataCommand) -> Option<Box<dyn BinaryDataCommand>> {
        Some(Box::new(command))
    }

    fn contents(buffer: &crate::buffer::EditBuffer) -> Vec<u8> {
        buffer.read(0, buffer.len()).unwrap()
    }

    #[test]
    fn compose_skips_absent_and_keeps_singletons() {
        assert!(super::CompoundCommand::compose(None, None).is_none());

        let single = super::CompoundCommand::build([
            None,
            boxed(crate::command::data::DataCommand::insert(0, b"a".to_vec())),
            None,
        ])
        .unwrap();

        assert_eq!(single.kind(), crate::enums::CommandKind::DataInserted);
    }

    #[test]
    fn compose_creates_group_lazily() {
        let mut built = super::CompoundCommand::build([
            boxed(crate::command::data::DataCommand::insert(0, b"a".to_vec())),
            None,
            boxed(crate::command::data::DataCommand::insert(1, b"b".to_vec())),
            boxed(crate::command::data::DataCommand::insert(2, b"c".to_vec())),
        ])
        .unwrap();

        assert_eq!(built.kind(), crate::enums::CommandKind::Compound);
        assert_eq!(
            built.as_compound_mut().map(|compound| compound.len()),
            Some(3),
            "later commands join the existing group"
        );
    }

    #[test]
    fn replace_selection_round_trip() {
        let mut buffer = crate::buffer::EditBuffer::from_bytes(b"apple pie".to_vec());
        let mut command = super::CompoundCommand::new(vec![
            Box::new(crate::command::data::DataCommand::remove(0, 5)),
            Box::new(crate::command::data::DataCommand::insert(0, b"cherry".to_vec())),
        ])
        .with_caption("Replace selection");

        command.execute(&mut buffer).unwrap();
        assert_eq!(contents(&buffer), b"cherry pie");
        assert_eq!(buffer.cursor, crate::cursor::Cursor::new(6));
        assert!(command.execution_time().is_some());
        assert!(command.commands().iter().all(|child| child.execution_time().is_some()));
        assert_eq!(command.caption(), "Replace selection");
        assert_eq!(command.footprint(), 11);

        command.undo(&mut buffer).unwrap();
        assert_eq!(contents(&buffer), b"apple pie");
        assert_eq!(buffer.cursor, crate::cursor::Cursor::new(5));
    }

    #[test]
    fn failing_child_rolls_back_the_group() {
        let mut buffer = crate::buffer::EditBuffer::from_bytes(b"ABC".to_vec());
        let mut command = super::CompoundCommand::new(vec![
            Box::new(crate::command::data::DataCommand::insert(3, b"DEF".to_vec())),
            Box::new(crate::command::data::DataCommand::remove(5, 10)),
        ]);

        assert!(matches!(
            command.execute(&mut buffer),
            Err(crate::errors::EditError::OperationFailure { .. })
        ));
        assert_eq!(contents(&buffer), b"ABC");
    }

    #[test]
    fn empty_group() {
        let command = super::CompoundCommand::default();

        assert!(command.is_empty());
        assert!(command.can_undo());
        assert_eq!(command.footprint(), 0);
    }
}
