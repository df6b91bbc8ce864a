/// Stereo frame types
use serde::{Deserialize, Serialize};

use super::audio::{peak_abs, Signal};
use crate::error::{CoreError, Result};

/// Channel tag within a stereo frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Left channel (index 0)
    Left,
    /// Right channel (index 1)
    Right,
}

impl Channel {
    /// Channel index in channel-major order
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// Exactly two equal-length channels sharing one sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct StereoFrame {
    left: Vec<f32>,
    right: Vec<f32>,
    sample_rate: u32,
}

impl StereoFrame {
    /// Create a stereo frame, validating channel lengths
    pub fn new(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate(sample_rate));
        }
        if left.len() != right.len() {
            return Err(CoreError::ChannelMismatch {
                left: left.len(),
                right: right.len(),
            });
        }

        Ok(Self {
            left,
            right,
            sample_rate,
        })
    }

    /// Build a stereo frame from a two-channel signal
    pub fn from_signal(signal: Signal) -> Result<Self> {
        let sample_rate = signal.sample_rate();
        let channels = signal.channel_count();
        let mut data = signal.into_channels();
        if channels != 2 {
            return Err(CoreError::invalid_parameter(format!(
                "stereo frame needs 2 channels, got {}",
                channels
            )));
        }
        let right = data.pop().unwrap_or_default();
        let left = data.pop().unwrap_or_default();
        Self::new(left, right, sample_rate)
    }

    /// Left channel samples
    pub fn left(&self) -> &[f32] {
        &self.left
    }

    /// Right channel samples
    pub fn right(&self) -> &[f32] {
        &self.right
    }

    /// Samples of the tagged channel
    pub fn channel(&self, channel: Channel) -> &[f32] {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Check if the frame holds no samples
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Peak absolute value across both channels
    pub fn peak(&self) -> f32 {
        peak_abs(&self.left).max(peak_abs(&self.right))
    }

    /// Interleaved samples (L, R, L, R, ...)
    pub fn interleaved(&self) -> Vec<f32> {
        self.left
            .iter()
            .zip(&self.right)
            .flat_map(|(&l, &r)| [l, r])
            .collect()
    }

    /// Split into `(left, right)` sample vectors
    pub fn into_channels(self) -> (Vec<f32>, Vec<f32>) {
        (self.left, self.right)
    }

    /// Convert into a 2 x N channel-major signal
    pub fn into_signal(self) -> Signal {
        // Lengths and rate were validated on construction
        Signal::from_validated(vec![self.left, self.right], self.sample_rate)
    }
}

impl TryFrom<Signal> for StereoFrame {
    type Error = CoreError;

    fn try_from(signal: Signal) -> Result<Self> {
        Self::from_signal(signal)
    }
}
