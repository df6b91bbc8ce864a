/// Audio signal types
use crate::error::{CoreError, Result};

/// Peak absolute sample value of a buffer (0.0 for an empty buffer)
pub fn peak_abs(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Digitized audio with one or more channels
///
/// Samples are stored as f32 nominally in the range [-1.0, 1.0].
/// Channel-major layout: `channels[c][n]` is sample `n` of channel `c`.
/// All channels share the same length and sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl Signal {
    /// Create a single-channel signal
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::from_channels(vec![samples], sample_rate)
    }

    /// Create a signal from channel-major sample data
    ///
    /// Fails if there are no channels, the sample rate is zero, or the
    /// channels differ in length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate(sample_rate));
        }
        let first = channels.first().ok_or(CoreError::EmptySignal)?.len();
        if let Some(bad) = channels.iter().find(|c| c.len() != first) {
            return Err(CoreError::ChannelMismatch {
                left: first,
                right: bad.len(),
            });
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    pub(crate) fn from_validated(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        debug_assert!(!channels.is_empty() && sample_rate > 0);
        Self {
            channels,
            sample_rate,
        }
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (1 = mono, 2 = stereo, ...)
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Check if this is a single-channel signal
    pub fn is_mono(&self) -> bool {
        self.channels.len() == 1
    }

    /// Number of frames (samples per channel)
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Check if the signal holds no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / f64::from(self.sample_rate)
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels, channel-major
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Peak absolute value across all channels
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .map(|c| peak_abs(c))
            .fold(0.0f32, f32::max)
    }

    /// Consume the signal, returning its channel-major data
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Frame-interleaved samples (L, R, L, R, ... for stereo)
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * self.channel_count());
        for i in 0..self.len() {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }
}
