use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by the wallet stores and the transaction executors.
///
/// Command handlers turn any of these into a one-line message and exit code 1.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Bad address format, non-positive amount, malformed URL, missing flag.
    #[error("{0}")]
    Validation(String),

    /// No wallet, no contact, no install path.
    #[error("{0}")]
    NotFound(String),

    /// Wallet or contact already present without a force flag.
    #[error("{0}")]
    AlreadyExists(String),

    /// A subprocess or network collaborator failed or answered garbage.
    #[error("{context}: {detail}")]
    ExternalProcess { context: String, detail: String },

    /// The selected executor mode cannot perform the requested operation.
    #[error("{0}")]
    Unsupported(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl WalletError {
    pub fn validation(message: impl Into<String>) -> Self {
        WalletError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        WalletError::NotFound(message.into())
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        WalletError::AlreadyExists(message.into())
    }

    pub fn external(context: impl Into<String>, detail: impl Into<String>) -> Self {
        WalletError::ExternalProcess {
            context: context.into(),
            detail: detail.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WalletError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        WalletError::Json {
            path: path.into(),
            source,
        }
    }
}

pub type WalletResult<T> = Result<T, WalletError>;
