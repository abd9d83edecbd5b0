use crate::reconcile::{FileState, GitArea};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SealError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not in a git repository")]
    RepositoryUnavailable,

    #[error("Failed to read {path} from {area}: {message}")]
    ReadFailure {
        path: String,
        area: GitArea,
        message: String,
    },

    #[error("Refusing to clean {path}: status '{state}' is not handled")]
    UnhandledStatus { path: String, state: FileState },

    #[error("Failed to write filter output: {0}")]
    WriteFailure(std::io::Error),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Repository not initialized. Run 'git-seal init' first")]
    NotInitialized,

    #[error("Repository already initialized")]
    AlreadyInitialized,

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid key format")]
    InvalidKeyFormat,

    #[error("Unknown format '{0}' (expected binary, dotenv, ini, json or yaml)")]
    UnknownFormat(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    Other(String),
}

/// A stored object could not be turned back into plaintext.
///
/// Kept apart from [`SealError`] so the reconciliation loop can only ever
/// absorb this kind of failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Decode failure: {0}")]
pub struct DecodeError(pub String);

pub type Result<T> = std::result::Result<T, SealError>;
