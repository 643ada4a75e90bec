//! Command-line errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the CLI from producing output for an input.
///
/// Template diagnostics are not errors here; they are part of the output.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}
