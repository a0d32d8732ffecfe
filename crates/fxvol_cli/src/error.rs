//! CLI error types

use thiserror::Error;

/// Errors surfaced by `fxvol` commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// A path given on the command line does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Bad flag value or flag combination.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The market file is not valid TOML or misses fields.
    #[error("Invalid market file {path}: {message}")]
    MarketFile {
        /// File being read.
        path: String,
        /// Parser or validation message.
        message: String,
    },

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] fxvol_surface::ConfigError),

    /// Surface construction or query failure.
    #[error(transparent)]
    Surface(#[from] fxvol_surface::SurfaceError),

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
