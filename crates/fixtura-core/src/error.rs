use thiserror::Error;

/// Core error type shared across fixtura crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema catalog violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// A path or path pattern could not be parsed.
    #[error("invalid path: {0}")]
    InvalidPath(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by fixtura crates.
pub type Result<T> = std::result::Result<T, Error>;
