//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during DSP operations
///
/// Two families matter to callers: configuration errors (the processor keeps
/// its previous configuration) and shape mismatches (nothing was processed).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("Invalid filter coefficients for frequency {frequency}Hz at sample rate {sample_rate}Hz")]
    InvalidCoefficients { frequency: f32, sample_rate: f32 },

    #[error("Maximum block size must be at least 1 sample, got {0}")]
    InvalidBlockSize(usize),

    #[error("Channel count must be at least 1, got {0}")]
    InvalidChannelCount(usize),

    #[error("Channel count mismatch: expected {expected}, got {got}")]
    ChannelCountMismatch { expected: usize, got: usize },

    #[error("Buffer size mismatch: expected {expected}, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },

    #[error("Processor has not been configured with a sample rate")]
    NotConfigured,
}

impl DspError {
    /// True for errors raised by `configure`
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSampleRate(_)
                | Self::InvalidCoefficients { .. }
                | Self::InvalidBlockSize(_)
                | Self::InvalidChannelCount(_)
        )
    }

    /// True when the caller's buffers don't line up with each other or the configuration
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            Self::ChannelCountMismatch { .. } | Self::BufferSizeMismatch { .. }
        )
    }
}
