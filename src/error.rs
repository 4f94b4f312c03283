use thiserror::Error;

/// Every failure a caller can see. All variants are recoverable and the
/// display text is what the surface shows the user.
#[derive(Debug, Error)]
pub enum HelpdeskError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] diesel::result::Error),

    #[error("storage error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("export error: {0}")]
    Export(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, HelpdeskError>;

impl HelpdeskError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        HelpdeskError::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        HelpdeskError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        HelpdeskError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        HelpdeskError::Conflict(msg.into())
    }
}
