//! Error kinds for the indexing and retrieval engine.
//!
//! Mirrors spec §7: parser/plugin failures are absorbed into shard `quality`
//! and never surface here; everything that does reach a `Handler` response
//! carries one of these kinds.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can escape the core to a `Handler` response.
#[derive(Error, Debug)]
pub enum Error {
    /// Repository, file, or symbol unknown.
    #[error("not found: {resource}")]
    NotFound {
        /// Description of the missing resource.
        resource: String,
    },

    /// Unknown method or unsupported language with no fallback plugin.
    #[error("unsupported: {message}")]
    Unsupported {
        /// Description of what isn't supported.
        message: String,
    },

    /// Malformed query or out-of-range argument.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// A per-plugin or per-request deadline was exceeded.
    #[error("timeout after {budget_ms}ms: {operation}")]
    Timeout {
        /// What timed out.
        operation: String,
        /// The budget that was exceeded.
        budget_ms: u64,
    },

    /// The persistence layer failed (I/O, corruption, constraint violation).
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },

    /// The semantic backend failed; callers should fall back to lexical-only.
    #[error("embedder error: {message}")]
    Embedder {
        /// Description of the embedder failure.
        message: String,
    },

    /// Explicit cancellation of an in-flight operation.
    #[error("cancelled: {operation}")]
    Cancelled {
        /// The operation that was cancelled.
        operation: String,
    },

    /// Configuration could not be loaded or failed validation (spec §6 exit
    /// code 2).
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration failure.
        message: String,
    },

    /// A schema migration failed at startup (spec §6 exit code 3).
    #[error("migration failed: {message}")]
    Migration {
        /// Description of the migration failure.
        message: String,
    },

    /// I/O error with no more specific kind above.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Construct a `NotFound` error.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Construct an `Unsupported` error.
    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Construct an `InvalidArgument` error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Construct a `Timeout` error.
    pub fn timeout<S: Into<String>>(operation: S, budget_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            budget_ms,
        }
    }

    /// Construct a `Storage` error.
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Construct an `Embedder` error.
    pub fn embedder<S: Into<String>>(message: S) -> Self {
        Self::Embedder {
            message: message.into(),
        }
    }

    /// Construct a `Cancelled` error.
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Construct a `Configuration` error.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Construct a `Migration` error.
    pub fn migration<S: Into<String>>(message: S) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    /// The §7 error-kind name, used as the `code` field in response envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::Unsupported { .. } => "Unsupported",
            Self::InvalidArgument { .. } => "InvalidArgument",
            Self::Timeout { .. } => "Timeout",
            Self::Storage { .. } => "StorageError",
            Self::Embedder { .. } => "EmbedderError",
            Self::Cancelled { .. } => "Cancelled",
            Self::Configuration { .. } => "ConfigurationError",
            Self::Migration { .. } => "MigrationError",
            Self::Io(_) => "StorageError",
        }
    }

    /// Process exit code when this error aborts startup (spec §6): 2 for a
    /// configuration failure, 3 for a migration failure, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration { .. } => 2,
            Self::Migration { .. } => 3,
            _ => 1,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

impl From<r2d2::Error> for Error {
    fn from(err: r2d2::Error) -> Self {
        Self::Storage {
            message: format!("connection pool error: {err}"),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArgument {
            message: format!("JSON error: {err}"),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}
