//! Offline signal transforms
//!
//! Transforms take whole buffers and return new ones, so they are free to
//! change the signal length. Mono-to-mono transforms implement
//! [`MonoTransform`] and can be chained; the widener changes the channel
//! count and runs last.
//!
//! Available transforms:
//! - **BandEnhancer**: Butterworth bandpass mixed back over the dry signal
//! - **StereoWidener**: Haas-delay pseudo-stereo from a mono source
//! - **PhaseVocoder** (in [`crate::stretch`]): pitch-preserving time stretch

mod chain;
mod enhancer;
mod widener;

pub use chain::{MonoTransform, TransformChain};
pub use enhancer::{enhance, BandEnhancer, EnhanceSettings};
pub use widener::{widen, StereoWidener, WidenSettings};

#[cfg(test)]
pub(crate) mod tests {
    /// Generate a mono sine wave for testing
    pub(crate) fn generate_sine(
        freq: f32,
        sample_rate: u32,
        duration_secs: f32,
        amplitude: f32,
    ) -> Vec<f32> {
        let num_samples = (sample_rate as f32 * duration_secs) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }
}
