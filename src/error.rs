use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BurrowError {
    #[error("application not found: {0}")]
    ApplicationNotFound(Uuid),

    #[error("database not found: {0}")]
    DatabaseNotFound(Uuid),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("token not found: {0}")]
    TokenNotFound(Uuid),

    #[error("database path already exists: {0}")]
    PathConflict(String),

    #[error("database path must begin with '/': {0}")]
    InvalidPath(String),

    #[error("storage integrity violation: {0}")]
    Integrity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(String),
}

impl BurrowError {
    /// True for the lookup failures a boundary layer maps to 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ApplicationNotFound(_)
                | Self::DatabaseNotFound(_)
                | Self::DocumentNotFound(_)
                | Self::TokenNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BurrowError>;
