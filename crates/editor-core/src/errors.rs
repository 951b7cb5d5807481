pub type EditResult<T> = Result<T, EditError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// A read outside `[0, size]`.
    #[error("range {position}+{length} out of bounds (size {size})")]
    OutOfBounds { position: u64, length: u64, size: u64 },

    /// An operation's precondition does not hold on the current buffer.
    #[error("{kind} failed: {reason}")]
    OperationFailure {
        kind: crate::enums::OperationKind,
        reason: String,
    },

    /// The call is not allowed in the current history state. Nothing was
    /// mutated.
    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error(transparent)]
    Page(#[from] paged_data::PageError),

    #[error(transparent)]
    Math(#[from] paged_data::MathError),
}

impl From<std::num::TryFromIntError> for EditError {
    fn from(value: std::num::TryFromIntError) -> Self {
        EditError::Math(paged_data::MathError::ConversionFailed(value))
    }
}

impl EditError {
    pub(crate) fn operation(kind: crate::enums::OperationKind, reason: impl Into<String>) -> Self {
        EditError::OperationFailure {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn illegal_state(reason: impl Into<String>) -> Self {
        EditError::IllegalState(reason.into())
    }
}
