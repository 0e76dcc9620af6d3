use std::result::Result as StdResult;

use thiserror::Error;

/// Error type for the fallible edges of the crate: taxonomy files,
/// configuration persistence and statistics input.
///
/// The category codec and selector never produce errors; unrecognised
/// values degrade to free text instead.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, TrackerError>;

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}

/// User-facing shell error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] TrackerError),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Prompt failed: {0}")]
    Dialog(String),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Dialog(err.to_string())
    }
}
