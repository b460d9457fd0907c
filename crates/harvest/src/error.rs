use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Could not determine the user's home directory")]
    NoHomeDirectory,
}
