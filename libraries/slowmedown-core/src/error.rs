/// Core error types for slowmedown
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for slowmedown
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A parameter was outside its valid domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Channels of a multi-channel signal differ in length
    #[error("Channel length mismatch: left has {left} samples, right has {right}")]
    ChannelMismatch {
        /// Length of the reference (first) channel
        left: usize,
        /// Length of the offending channel
        right: usize,
    },

    /// A signal was built with no channels at all
    #[error("Signal has no channels")]
    EmptySignal,

    /// Sample rate of zero
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),
}

impl CoreError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
