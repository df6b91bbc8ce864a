/// DSP-specific errors
use thiserror::Error;

/// Result type alias using `DspError`
pub type Result<T> = std::result::Result<T, DspError>;

/// DSP error types
///
/// Every transform is deterministic, so none of these are retryable: the same
/// input fails the same way every time.
#[derive(Error, Debug)]
pub enum DspError {
    /// Parameter outside its valid domain (stretch factor, frame layout, ...)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Filter band cannot be realised at the given sample rate
    #[error("Invalid filter spec: {0}")]
    InvalidSpec(String),

    /// Signal construction error
    #[error(transparent)]
    Core(#[from] slowmedown_core::CoreError),

    /// Pipeline configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl DspError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create an invalid filter spec error
    pub fn invalid_spec(msg: impl Into<String>) -> Self {
        Self::InvalidSpec(msg.into())
    }
}
