//! Pseudo-stereo widening
//!
//! Builds a second channel from a mono source using the Haas effect:
//! - Left: the source, slightly attenuated
//! - Right: the source delayed by ~15 ms, softened by a zero-phase lowpass,
//!   and attenuated a little more than the left
//!
//! The lowpass runs forward and backward so it adds no group delay of its
//! own; the inter-channel delay is the only timing cue.

use serde::{Deserialize, Serialize};
use slowmedown_core::{peak_abs, Signal, StereoFrame};
use tracing::debug;

use crate::error::{DspError, Result};
use crate::filter::butter_lowpass;

/// Stereo widener settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidenSettings {
    /// Right-channel delay in seconds
    pub delay_secs: f64,
    /// Left channel gain
    pub left_gain: f32,
    /// Right channel gain (applied after filtering)
    pub right_gain: f32,
    /// Right-channel lowpass cutoff as a fraction of Nyquist
    pub lowpass_cutoff: f64,
    /// Right-channel lowpass order
    pub lowpass_order: usize,
}

impl Default for WidenSettings {
    fn default() -> Self {
        Self {
            delay_secs: 0.015,
            left_gain: 0.95,
            right_gain: 0.85,
            lowpass_cutoff: 0.5,
            lowpass_order: 2,
        }
    }
}

impl WidenSettings {
    /// Check ranges
    pub fn validate(&self) -> Result<()> {
        if !self.delay_secs.is_finite() || self.delay_secs < 0.0 {
            return Err(DspError::invalid_parameter(format!(
                "delay must be a non-negative number of seconds, got {}",
                self.delay_secs
            )));
        }
        if !self.left_gain.is_finite() || !self.right_gain.is_finite() {
            return Err(DspError::invalid_parameter("channel gains must be finite"));
        }
        let cutoff = self.lowpass_cutoff;
        if cutoff.is_nan() || cutoff <= 0.0 || cutoff >= 1.0 {
            return Err(DspError::invalid_spec(format!(
                "lowpass cutoff must be a fraction of Nyquist in (0, 1), got {}",
                cutoff
            )));
        }
        if self.lowpass_order == 0 {
            return Err(DspError::invalid_spec("lowpass order must be at least 1"));
        }
        Ok(())
    }

    /// Delay in whole samples (truncated) at `sample_rate`
    pub fn delay_samples(&self, sample_rate: u32) -> usize {
        (self.delay_secs * f64::from(sample_rate)).floor() as usize
    }
}

/// Mono-to-stereo widener
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoWidener {
    settings: WidenSettings,
}

impl StereoWidener {
    /// Create a widener with the default 15 ms Haas delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with specific settings
    pub fn with_settings(settings: WidenSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Get current settings
    pub fn settings(&self) -> &WidenSettings {
        &self.settings
    }

    /// Widen a signal
    ///
    /// Two-channel input is returned unchanged. Mono input is widened. Any
    /// other channel count is rejected.
    pub fn process(&self, signal: &Signal) -> Result<StereoFrame> {
        match signal.channel_count() {
            2 => {
                debug!("Input is already stereo, passing through");
                Ok(StereoFrame::from_signal(signal.clone())?)
            }
            1 => self.widen_mono(signal.channels()[0].as_slice(), signal.sample_rate()),
            n => Err(DspError::invalid_parameter(format!(
                "widening needs a mono or stereo signal, got {} channels",
                n
            ))),
        }
    }

    /// Build a stereo frame from mono samples
    pub fn widen_mono(&self, samples: &[f32], sample_rate: u32) -> Result<StereoFrame> {
        let s = &self.settings;
        let delay = s.delay_samples(sample_rate);
        let nyquist = f64::from(sample_rate) / 2.0;
        let cutoff_hz = s.lowpass_cutoff * nyquist;
        let lowpass = butter_lowpass(cutoff_hz, s.lowpass_order, sample_rate)?;

        debug!(
            "Widening {} samples: {} sample delay, lowpass at {} Hz",
            samples.len(),
            delay,
            cutoff_hz
        );

        let mut left: Vec<f32> = samples.iter().map(|x| x * s.left_gain).collect();

        let mut delayed = vec![0.0f32; samples.len()];
        if delay < samples.len() {
            delayed[delay..].copy_from_slice(&samples[..samples.len() - delay]);
        }
        let mut right: Vec<f32> = lowpass
            .filtfilt(&delayed)
            .into_iter()
            .map(|x| x * s.right_gain)
            .collect();

        // Filter ringing can push the right channel past full scale on
        // near-full-scale transients; scale both channels together to keep
        // the balance
        let peak = peak_abs(&left).max(peak_abs(&right));
        if peak > 1.0 {
            debug!("Widened peak {:.4} exceeds full scale, normalizing", peak);
            for sample in left.iter_mut().chain(right.iter_mut()) {
                *sample /= peak;
            }
        }

        Ok(StereoFrame::new(left, right, sample_rate)?)
    }
}

/// Widen a mono signal to pseudo-stereo; stereo input passes through
pub fn widen(signal: &Signal) -> Result<StereoFrame> {
    StereoWidener::new().process(signal)
}
