//! Real-signal FFT helpers built on `rustfft`
//!
//! The phase vocoder only ever needs the non-negative half of the spectrum of a
//! real frame, and the inverse of such a half spectrum. `RealFft` wraps a pair
//! of planned complex transforms and handles the Hermitian bookkeeping.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Periodic Hann window of `size` samples
///
/// The periodic form (denominator `size`, not `size - 1`) gives a constant
/// overlap sum at hops of `size / 4`, which is what STFT resynthesis relies on.
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|n| (0.5 - 0.5 * (2.0 * PI * n as f64 / size as f64).cos()) as f32)
        .collect()
}

/// Forward/inverse FFT pair for real frames of a fixed size
pub struct RealFft {
    size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl RealFft {
    /// Plan transforms for frames of `size` samples
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            size,
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }

    /// Frame size in samples
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of non-negative frequency bins (`size / 2 + 1`)
    pub fn bins(&self) -> usize {
        self.size / 2 + 1
    }

    /// Transform a real frame, returning bins `0..=size/2`
    ///
    /// Frames shorter than `size` are zero-padded; longer frames are truncated.
    pub fn forward(&self, frame: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .take(self.size)
            .map(|&s| Complex::new(s, 0.0))
            .collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.forward.process(&mut buffer);
        buffer.truncate(self.bins());
        buffer
    }

    /// Inverse-transform a half spectrum back to `size` real samples
    ///
    /// The negative frequencies are rebuilt as complex conjugates of the
    /// positive ones. Output is scaled by `1 / size`, so
    /// `inverse(&forward(x))` reproduces `x`.
    pub fn inverse(&self, spectrum: &[Complex<f32>]) -> Vec<f32> {
        let bins = self.bins().min(spectrum.len());
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.size];
        buffer[..bins].copy_from_slice(&spectrum[..bins]);
        for k in bins..self.size {
            let mirror = self.size - k;
            if mirror < bins {
                buffer[k] = spectrum[mirror].conj();
            }
        }

        self.inverse.process(&mut buffer);
        let norm = 1.0 / self.size as f32;
        buffer.iter().map(|c| c.re * norm).collect()
    }
}

impl std::fmt::Debug for RealFft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealFft").field("size", &self.size).finish()
    }
}
