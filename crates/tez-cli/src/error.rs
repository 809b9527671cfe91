//! CLI error types

use tez_e2e::E2EError;
use tez_sdk::SdkError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// The suite stopped at a failing scenario
    #[error("Scenario #{index} ({name}) failed: {error}")]
    SuiteFailed {
        /// Index of the failed scenario
        index: usize,
        /// Its name
        name: String,
        /// Rendered error
        error: String,
    },

    /// Harness error
    #[error(transparent)]
    E2E(#[from] E2EError),

    /// SDK error
    #[error("SDK error: {0}")]
    Sdk(#[from] SdkError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
