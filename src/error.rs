use std::io;
use std::path::PathBuf;

use chat_provider::{ProviderError, ProviderInitError};
use thiserror::Error;

/// Startup and console failures that end the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Could not read API key from {}: {source}", path.display())]
    Credential { path: PathBuf, source: io::Error },
    #[error("API key file {} is empty", .0.display())]
    EmptyCredential(PathBuf),
    #[error("{0}")]
    ProviderInit(#[from] ProviderInitError),
    #[error("Could not load model list: {0}")]
    Catalog(ProviderError),
    #[error("No zero-cost models available right now.")]
    NoFreeModels,
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
}
