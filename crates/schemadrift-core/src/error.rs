use thiserror::Error;

/// Core error type shared across schemadrift crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or catalog query failure.
    #[error("database error: {0}")]
    Db(String),
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// Filter or adapter configuration is unusable.
    #[error("invalid config: {0}")]
    Config(String),
    /// A literal or expression failed to parse.
    #[error("parse error: {0}")]
    Parse(String),
    /// A default-value expression cannot be rendered to static SQL text.
    #[error("unrenderable default expression: {0}")]
    UnrenderableDefault(String),
    /// A requested feature is not yet supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by schemadrift crates.
pub type Result<T> = std::result::Result<T, Error>;
