//! Phase-vocoder time stretching
//!
//! Changes the duration of a mono signal while keeping its pitch:
//!
//! 1. The signal is centred (half a frame of zeros in front) and cut into
//!    Hann-windowed frames, one every `hop_size` samples.
//! 2. Synthesis frames are taken at fractional analysis positions
//!    `0, f, 2f, ...` with magnitudes interpolated between the two
//!    neighbouring analysis frames.
//! 3. A per-bin phase accumulator is advanced by each bin's instantaneous
//!    frequency, estimated from consecutive analysis frames.
//! 4. Frames are inverse-transformed, windowed and overlap-added at the
//!    analysis hop, then normalized by the squared-window overlap sum.
//!
//! Output length is exactly `round(len / factor)` samples: the overlap-add
//! result is truncated or zero-extended to that length.
//!
//! # Example
//!
//! ```rust
//! use slowmedown_dsp::stretch;
//!
//! let input: Vec<f32> = (0..22_050)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 22_050.0).sin())
//!     .collect();
//! let slowed = stretch(&input, 22_050, 0.75).unwrap();
//! assert_eq!(slowed.len(), 29_400);
//! ```

use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use tracing::{debug, trace};

use crate::effects::MonoTransform;
use crate::error::{DspError, Result};
use crate::fft::{hann_window, RealFft};

/// Longest buffer a `Vec<f32>` can hold
const MAX_BUFFER_LEN: usize = isize::MAX as usize / std::mem::size_of::<f32>();

/// Frame layout for the phase vocoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StretchSettings {
    /// Analysis/synthesis frame size in samples
    pub frame_size: usize,
    /// Hop between frames in samples (analysis and synthesis)
    pub hop_size: usize,
}

impl Default for StretchSettings {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
        }
    }
}

impl StretchSettings {
    /// Check frame and hop sizes
    pub fn validate(&self) -> Result<()> {
        if self.frame_size < 2 {
            return Err(DspError::invalid_parameter(format!(
                "frame size must be at least 2, got {}",
                self.frame_size
            )));
        }
        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(DspError::invalid_parameter(format!(
                "hop size must be in 1..={}, got {}",
                self.frame_size, self.hop_size
            )));
        }
        Ok(())
    }
}

/// Pitch-preserving time stretcher
///
/// `factor` > 1.0 speeds up (shorter output), < 1.0 slows down (longer
/// output). The stretcher holds configuration only; every call allocates and
/// owns its own buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseVocoder {
    factor: f32,
    settings: StretchSettings,
}

impl PhaseVocoder {
    /// Create a stretcher with the default 2048/512 frame layout
    pub fn new(factor: f32) -> Result<Self> {
        Self::with_settings(factor, StretchSettings::default())
    }

    /// Create a stretcher with a custom frame layout
    pub fn with_settings(factor: f32, settings: StretchSettings) -> Result<Self> {
        check_factor(factor)?;
        settings.validate()?;
        Ok(Self { factor, settings })
    }

    /// Stretch factor
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Frame layout
    pub fn settings(&self) -> &StretchSettings {
        &self.settings
    }

    /// Output length for an input of `input_len` samples
    ///
    /// Fails with `InvalidParameter` when the factor is so small that the
    /// result would not fit in a buffer.
    pub fn output_len(&self, input_len: usize) -> Result<usize> {
        let len = (input_len as f64 / f64::from(self.factor)).round();
        buffer_len(len).ok_or_else(|| {
            DspError::invalid_parameter(format!(
                "stretching {} samples by {} gives an output too large to hold",
                input_len, self.factor
            ))
        })
    }

    /// Stretch a mono signal
    pub fn process(&self, input: &[f32]) -> Result<Vec<f32>> {
        let target_len = self.output_len(input.len())?;
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let frame_size = self.settings.frame_size;
        let hop = self.settings.hop_size;
        let fft = RealFft::new(frame_size);
        let window = hann_window(frame_size);
        let analysis = Analysis::new(input, &fft, &window, hop);
        let bins = fft.bins();

        // Expected phase advance per hop for each bin centre frequency
        let expected: Vec<f64> = (0..bins)
            .map(|k| TAU * k as f64 * hop as f64 / frame_size as f64)
            .collect();

        let factor = f64::from(self.factor);
        let frame_count = analysis.frame_count();
        let layout = buffer_len((frame_count as f64 / factor).ceil()).and_then(|steps| {
            let len = steps.saturating_sub(1).checked_mul(hop)?.checked_add(frame_size)?;
            Some((steps, len)).filter(|_| len <= MAX_BUFFER_LEN)
        });
        let Some((steps, full_len)) = layout else {
            return Err(DspError::invalid_parameter(format!(
                "stretch factor {} needs more synthesis frames than fit in a buffer",
                self.factor
            )));
        };

        debug!(
            "Phase vocoder: {} samples, factor {}, {} analysis frames -> {} synthesis frames",
            input.len(),
            self.factor,
            frame_count,
            steps
        );

        let mut output = vec![0.0f32; full_len];
        let mut window_sum = vec![0.0f32; full_len];
        let mut frames = FramePair::default();
        let mut spectrum = vec![Complex::new(0.0f32, 0.0); bins];

        // Phase accumulator carried sequentially across synthesis frames
        let mut phase_acc: Vec<f64> = analysis
            .frame(0)
            .iter()
            .map(|c| f64::from(c.arg()))
            .collect();

        for step in 0..steps {
            let position = step as f64 * factor;
            let index = position.floor() as usize;
            let alpha = (position - index as f64) as f32;
            let (current, next) = frames.load(&analysis, index);

            #[allow(clippy::needless_range_loop)]
            for bin in 0..bins {
                let magnitude = (1.0 - alpha) * current[bin].norm() + alpha * next[bin].norm();
                spectrum[bin] = Complex::from_polar(magnitude, phase_acc[bin] as f32);

                let delta =
                    f64::from(next[bin].arg()) - f64::from(current[bin].arg()) - expected[bin];
                let advance = expected[bin] + wrap_phase(delta);
                phase_acc[bin] = (phase_acc[bin] + advance).rem_euclid(TAU);
            }

            let frame = fft.inverse(&spectrum);
            let offset = step * hop;
            for (i, (&sample, &w)) in frame.iter().zip(&window).enumerate() {
                output[offset + i] += sample * w;
                window_sum[offset + i] += w * w;
            }
            trace!("Synthesis frame {} from analysis position {:.3}", step, position);
        }

        for (sample, &sum) in output.iter_mut().zip(&window_sum) {
            if sum > f32::MIN_POSITIVE {
                *sample /= sum;
            }
        }

        // Drop the centring pad and fix the length
        let start = frame_size / 2;
        let mut stretched: Vec<f32> = output.into_iter().skip(start).take(target_len).collect();
        stretched.resize(target_len, 0.0);
        Ok(stretched)
    }
}

impl MonoTransform for PhaseVocoder {
    fn apply(&self, samples: &[f32], _sample_rate: u32) -> Result<Vec<f32>> {
        self.process(samples)
    }

    fn name(&self) -> &str {
        "Time Stretch"
    }
}

/// Stretch `samples` by `factor` with the default frame layout
///
/// Fails with `InvalidParameter` if `factor` is not a positive finite number
/// or the sample rate is zero.
pub fn stretch(samples: &[f32], sample_rate: u32, factor: f32) -> Result<Vec<f32>> {
    if sample_rate == 0 {
        return Err(DspError::invalid_parameter("sample rate must be positive"));
    }
    PhaseVocoder::new(factor)?.process(samples)
}

fn check_factor(factor: f32) -> Result<()> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(DspError::invalid_parameter(format!(
            "stretch factor must be positive, got {}",
            factor
        )));
    }
    Ok(())
}

/// Non-negative whole sample count that a buffer can hold
fn buffer_len(len: f64) -> Option<usize> {
    (0.0..MAX_BUFFER_LEN as f64)
        .contains(&len)
        .then_some(len as usize)
}

/// Wrap a phase difference to [-PI, PI)
#[inline]
fn wrap_phase(phase: f64) -> f64 {
    (phase + PI).rem_euclid(TAU) - PI
}

/// Centred, zero-padded input and the transform needed to analyse it
struct Analysis<'a> {
    padded: Vec<f32>,
    fft: &'a RealFft,
    window: &'a [f32],
    hop: usize,
    frame_count: usize,
}

impl<'a> Analysis<'a> {
    fn new(input: &[f32], fft: &'a RealFft, window: &'a [f32], hop: usize) -> Self {
        let frame_size = fft.size();
        let half = frame_size / 2;
        // Zero tail padding keeps the final partial frame
        let mut padded = vec![0.0f32; input.len() + frame_size];
        padded[half..half + input.len()].copy_from_slice(input);

        Self {
            padded,
            fft,
            window,
            hop,
            frame_count: 1 + input.len() / hop,
        }
    }

    fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Spectrum of analysis frame `index`; frames past the end are silent
    fn frame(&self, index: usize) -> Vec<Complex<f32>> {
        if index >= self.frame_count {
            return vec![Complex::new(0.0, 0.0); self.fft.bins()];
        }
        let start = index * self.hop;
        let end = (start + self.fft.size()).min(self.padded.len());
        let windowed: Vec<f32> = self.padded[start..end]
            .iter()
            .zip(self.window)
            .map(|(s, w)| s * w)
            .collect();
        self.fft.forward(&windowed)
    }
}

/// The two analysis spectra around the current synthesis position
///
/// Synthesis positions only move forward, so consecutive steps usually reuse
/// one or both frames.
#[derive(Default)]
struct FramePair {
    index: Option<usize>,
    current: Vec<Complex<f32>>,
    next: Vec<Complex<f32>>,
}

impl FramePair {
    fn load(
        &mut self,
        analysis: &Analysis<'_>,
        index: usize,
    ) -> (&[Complex<f32>], &[Complex<f32>]) {
        match self.index {
            Some(loaded) if loaded == index => {}
            Some(loaded) if loaded + 1 == index => {
                self.current = std::mem::take(&mut self.next);
                self.next = analysis.frame(index + 1);
            }
            _ => {
                self.current = analysis.frame(index);
                self.next = analysis.frame(index + 1);
            }
        }
        self.index = Some(index);
        (&self.current, &self.next)
    }
}
