use crate::session::health::HealthError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid session server url: {0}")]
    InvalidServerUrl(String),
    #[error("terminal server is unreachable: {0}")]
    Unreachable(#[from] HealthError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("logging initialization failed: {0}")]
    Logging(String),
}
