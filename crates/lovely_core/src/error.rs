//! Engine Error Types

use thiserror::Error;

/// Errors that can occur in the transformer engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Stream configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to parse engine configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Engine already running")]
    AlreadyRunning,

    #[error("Engine not running")]
    NotRunning,

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("DSP error: {0}")]
    DspError(#[from] lovely_dsp::DspError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
