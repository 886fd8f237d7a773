use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book is missing required fields: {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error("unsupported database url '{0}'; expected memory:// or file://<dir>")]
    UnsupportedUrl(String),

    #[error("storage I/O failed")]
    Io(#[from] std::io::Error),

    #[error("malformed book document")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
