/// A command wrapping exactly one [`crate::operation::Operation`].
#[derive(Debug)]
pub struct DataCommand {
    kind: crate::enums::CommandKind,
    execution_time: Option<std::time::SystemTime>,
    forward: crate::operation::Operation,
    /// Inverse captured by the last forward application. `None` while the
    /// command is not applied.
    backward: Option<crate::operation::Operation>,
}

/*

====================================
============ FACTORIES =============
====================================

*/

impl DataCommand {
    #[must_use]
    pub fn new(forward: crate::operation::Operation) -> Self {
        Self {
            kind: forward.kind().into(),
            execution_time: None,
            forward,
            backward: None,
        }
    }

    #[must_use]
    pub fn insert(position: u64, data: impl Into<Vec<u8>>) -> Self {
        Self::new(crate::operation::Operation::Insert {
            position,
            data: data.into(),
        })
    }

    #[must_use]
    pub fn remove(position: u64, length: u64) -> Self {
        Self::new(crate::operation::Operation::Remove { position, length })
    }

    #[must_use]
    pub fn overwrite(position: u64, data: impl Into<Vec<u8>>) -> Self {
        Self::new(crate::operation::Operation::Overwrite {
            position,
            data: data.into(),
        })
    }

    #[must_use]
    pub fn move_data(source: std::ops::Range<u64>, destination: u64) -> Self {
        Self::new(crate::operation::Operation::Move {
            source,
            destination,
        })
    }

    /// Wraps an operation the caller already applied, together with the
    /// inverse it returned.
    #[must_use]
    pub fn from_applied(
        forward: crate::operation::Operation,
        inverse: crate::operation::Operation,
    ) -> Self {
        Self {
            kind: forward.kind().into(),
            execution_time: Some(std::time::SystemTime::now()),
            forward,
            backward: Some(inverse),
        }
    }

    #[inline]
    #[must_use]
    pub fn operation(&self) -> &crate::operation::Operation {
        &self.forward
    }

    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.backward.is_some()
    }

    /// Caret position once the command has been undone.
    fn caret_after_undo(&self) -> u64 {
        match &self.forward {
            crate::operation::Operation::Insert { position, .. }
            | crate::operation::Operation::Overwrite { position, .. } => *position,
            crate::operation::Operation::Remove { position, length } => position + length,
            crate::operation::Operation::Move { source, .. } => source.start,
        }
    }
}

impl crate::command::BinaryDataCommand for DataCommand {
    #[inline]
    fn kind(&self) -> crate::enums::CommandKind {
        self.kind
    }

    #[inline]
    fn caption(&self) -> &str {
        self.kind.caption()
    }

    #[inline]
    fn execution_time(&self) -> Option<std::time::SystemTime> {
        self.execution_time
    }

    fn use_command(&mut self) {
        if self.execution_time.is_none() {
            self.execution_time = Some(std::time::SystemTime::now());
        }
    }

    fn redo(&mut self, buffer: &mut crate::buffer::EditBuffer) -> crate::errors::EditResult<()> {
        if self.backward.is_some() {
            return Err(crate::errors::EditError::illegal_state(format!(
                "{} is already applied",
                self.kind.caption()
            )));
        }

        let inverse = buffer.apply(&self.forward)?;

        buffer.move_caret(self.forward.caret_after());
        self.backward = Some(inverse);

        Ok(())
    }

    fn undo(&mut self, buffer: &mut crate::buffer::EditBuffer) -> crate::errors::EditResult<()> {
        let Some(backward) = self.backward.as_ref() else {
            return Err(crate::errors::EditError::illegal_state(format!(
                "{} is not applied",
                self.kind.caption()
            )));
        };

        buffer.apply(backward)?;
        buffer.move_caret(self.caret_after_undo());
        self.backward = None;

        Ok(())
    }

    fn dispose(&mut self) -> crate::errors::EditResult<()> {
        self.backward = None;

        Ok(())
    }

    fn footprint(&self) -> u64 {
        self.forward.footprint() + self.backward.as_ref().map_or(0, |op| op.footprint())
    }

    fn is_empty(&self) -> bool {
        self.forward.length() == 0
    }
}
