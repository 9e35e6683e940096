pub mod identity;
pub mod repository;

/// Error kinds shared by every reservation service. Store-layer failures
/// are collapsed into `Store`; mirror inconsistencies are logged, never
/// surfaced (see the lifecycle engine).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("room {0} is already booked")]
    AlreadyBooked(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("storage error: {0}")]
    Store(String),
}

impl EngineError {
    /// Maps a repository-layer failure into the shared error type.
    pub fn store(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        EngineError::Store(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
