//! CLI error types.

use md2doc_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// Conversion returned an unsuccessful result.
    #[error("{0}")]
    Conversion(String),
}
