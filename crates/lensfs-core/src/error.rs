//! Error types for lens operations.

use thiserror::Error;

/// Result type for lens operations.
pub type LensResult<T> = Result<T, LensError>;

/// Errors surfaced by the lens engine.
///
/// Real I/O failures pass through unmodified via `Io`; the engine adds no
/// translation or retry. `UnsupportedSource` originates from user action on
/// a non-local target and is reported as a message, not a fault.
#[derive(Debug, Error)]
pub enum LensError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsupported source scheme: {0}")]
    UnsupportedSource(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LensError {
    /// True if this error means the path simply does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            LensError::NotFound(_) => true,
            LensError::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
