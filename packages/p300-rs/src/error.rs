use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid filter band: {0}")]
    InvalidFilterBand(String),

    #[error("Empty recording: {0}")]
    EmptyRecording(String),

    #[error("Channel count mismatch: expected {expected}, found {found}")]
    ChannelCountMismatch { expected: usize, found: usize },

    #[error("Failed to parse input data: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
