pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Edit(#[from] editor_core::errors::EditError),

    #[error(transparent)]
    Page(#[from] paged_data::PageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid session config: {0}")]
    Config(#[from] serde_yaml::Error),
}
