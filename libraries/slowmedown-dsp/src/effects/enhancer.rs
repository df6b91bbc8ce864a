/// Guitar-band enhancer
///
/// Soft boost of the 60 Hz - 5 kHz range: the signal is bandpassed with a
/// 4th-order Butterworth cascade and mixed back on top of the dry signal.
/// Nothing outside the band is cut beyond the filter's own rolloff.
use serde::{Deserialize, Serialize};
use slowmedown_core::peak_abs;
use tracing::debug;

use super::chain::MonoTransform;
use crate::error::{DspError, Result};
use crate::filter::butter_bandpass;

/// Band enhancer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceSettings {
    /// Lower band edge in Hz
    pub low_hz: f64,
    /// Upper band edge in Hz
    pub high_hz: f64,
    /// Butterworth order
    pub order: usize,
    /// Amount of filtered signal added to the dry signal
    pub mix: f32,
}

impl Default for EnhanceSettings {
    fn default() -> Self {
        Self {
            low_hz: 60.0,
            high_hz: 5000.0,
            order: 4,
            mix: 0.4,
        }
    }
}

/// Bandpass-and-mix enhancer with peak renormalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandEnhancer {
    settings: EnhanceSettings,
}

impl BandEnhancer {
    /// Create an enhancer with the default guitar band
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with specific settings
    pub fn with_settings(settings: EnhanceSettings) -> Result<Self> {
        if !settings.mix.is_finite() || settings.mix < 0.0 {
            return Err(DspError::invalid_parameter(format!(
                "enhance mix must be a non-negative number, got {}",
                settings.mix
            )));
        }
        Ok(Self { settings })
    }

    /// Get current settings
    pub fn settings(&self) -> &EnhanceSettings {
        &self.settings
    }

    /// Enhance a mono buffer
    ///
    /// Output is `input + mix * bandpass(input)`, rescaled by `1 / peak` when
    /// the peak exceeds 1.0. Length is preserved.
    pub fn process(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        let s = &self.settings;
        let filter = butter_bandpass(s.low_hz, s.high_hz, s.order, sample_rate)?;
        let filtered = filter.process(samples);

        let mut enhanced: Vec<f32> = samples
            .iter()
            .zip(&filtered)
            .map(|(&dry, &band)| dry + band * s.mix)
            .collect();

        let peak = peak_abs(&enhanced);
        if peak > 1.0 {
            debug!("Enhanced peak {:.3} exceeds full scale, normalizing", peak);
            // Divide rather than multiply by 1/peak so no sample rounds past 1.0
            for sample in &mut enhanced {
                *sample /= peak;
            }
        }

        Ok(enhanced)
    }
}

impl MonoTransform for BandEnhancer {
    fn apply(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        self.process(samples, sample_rate)
    }

    fn name(&self) -> &str {
        "Guitar Enhance"
    }
}

/// Boost the 60 Hz - 5 kHz band (order 4, mix 0.4)
///
/// Fails with `InvalidSpec` when the sample rate is too low to hold the band.
pub fn enhance(samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
    BandEnhancer::new().process(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::tests::generate_sine;

    const SR: u32 = 22_050;

    #[test]
    fn test_default_settings() {
        let settings = EnhanceSettings::default();
        assert_eq!(settings.low_hz, 60.0);
        assert_eq!(settings.high_hz, 5000.0);
        assert_eq!(settings.order, 4);
        assert_eq!(settings.mix, 0.4);
    }

    #[test]
    fn test_in_band_sine_is_boosted_then_normalized() {
        let input = generate_sine(1000.0, SR, 1.0, 1.0);
        let output = enhance(&input, SR).unwrap();
        assert_eq!(output.len(), input.len());
        // Mixed peak exceeds 1.0, so the result is renormalized to exactly 1.0
        assert_eq!(peak_abs(&output), 1.0);
    }

    #[test]
    fn test_in_band_quiet_sine_gains_level() {
        let input = generate_sine(1000.0, SR, 1.0, 0.25);
        let output = enhance(&input, SR).unwrap();
        let gain = peak_abs(&output) / peak_abs(&input);
        assert!(gain > 1.2, "in-band gain {}", gain);
    }

    #[test]
    fn test_out_of_band_sine_is_not_boosted() {
        let input = generate_sine(8000.0, SR, 1.0, 0.5);
        let output = enhance(&input, SR).unwrap();
        let gain = peak_abs(&output) / peak_abs(&input);
        assert!(gain <= 1.1, "out-of-band gain {}", gain);
        assert!(gain > 0.9, "out-of-band content must not be cut: {}", gain);
    }

    #[test]
    fn test_zero_mix_is_transparent() {
        let enhancer = BandEnhancer::with_settings(EnhanceSettings {
            mix: 0.0,
            ..Default::default()
        })
        .unwrap();
        let input = generate_sine(440.0, SR, 0.1, 0.8);
        assert_eq!(enhancer.process(&input, SR).unwrap(), input);
    }

    #[test]
    fn test_rejects_bad_mix() {
        for mix in [-0.1, f32::NAN] {
            let result = BandEnhancer::with_settings(EnhanceSettings {
                mix,
                ..Default::default()
            });
            assert!(matches!(result, Err(DspError::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_low_sample_rate_cannot_hold_band() {
        let input = vec![0.0; 100];
        assert!(matches!(
            enhance(&input, 8_000),
            Err(DspError::InvalidSpec(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(enhance(&[], SR).unwrap().is_empty());
    }
}
