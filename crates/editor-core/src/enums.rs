pub use paged_data::MathError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// The read-only paged data the document was opened on.
    Original,
    /// Append-only buffer of every byte inserted since.
    Add,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Insert,
    Remove,
    Overwrite,
    Move,
}

impl OperationKind {
    #[must_use]
    pub fn caption(self) -> &'static str {
        match self {
            OperationKind::Insert => "insert data",
            OperationKind::Remove => "remove data",
            OperationKind::Overwrite => "overwrite data",
            OperationKind::Move => "move data",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.caption())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    DataInserted,
    DataRemoved,
    DataModified,
    DataMoved,
    Compound,
}

impl CommandKind {
    #[must_use]
    pub fn caption(self) -> &'static str {
        match self {
            CommandKind::DataInserted => "Data inserted",
            CommandKind::DataRemoved => "Data removed",
            CommandKind::DataModified => "Data modified",
            CommandKind::DataMoved => "Data moved",
            CommandKind::Compound => "Compound command",
        }
    }
}

impl From<OperationKind> for CommandKind {
    fn from(value: OperationKind) -> Self {
        match value {
            OperationKind::Insert => CommandKind::DataInserted,
            OperationKind::Remove => CommandKind::DataRemoved,
            OperationKind::Overwrite => CommandKind::DataModified,
            OperationKind::Move => CommandKind::DataMoved,
        }
    }
}
