//! Fixed-order processing pipeline
//!
//! time-stretch -> guitar-band enhancement -> stereo widening
//!
//! Each stage is optional. The mono stages are collected into a
//! [`TransformChain`]; widening changes the channel count so it runs after
//! the chain.

use serde::{Deserialize, Serialize};
use slowmedown_core::{Signal, StereoFrame};
use tracing::{debug, info};

use crate::effects::{BandEnhancer, EnhanceSettings, StereoWidener, TransformChain, WidenSettings};
use crate::error::{DspError, Result};
use crate::stretch::{PhaseVocoder, StretchSettings};

/// Which stages run, and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Playback speed; 1.0 skips the stretch stage
    pub speed: f32,
    /// Run the guitar-band enhancer
    pub enhance: bool,
    /// Widen the mono result to stereo
    pub stereo: bool,
    /// Phase vocoder frame layout
    pub stretch: StretchSettings,
    /// Enhancer band and mix
    pub enhancer: EnhanceSettings,
    /// Widener delay, gains and lowpass
    pub widener: WidenSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            enhance: false,
            stereo: false,
            stretch: StretchSettings::default(),
            enhancer: EnhanceSettings::default(),
            widener: WidenSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every stage's parameters
    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(DspError::invalid_parameter(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }
        self.stretch.validate()?;
        self.widener.validate()?;
        Ok(())
    }

    /// Whether the stretch stage runs
    pub fn stretches(&self) -> bool {
        self.speed != 1.0
    }
}

/// Result of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutput {
    /// Stereo widening was not requested
    Mono(Signal),
    /// Widened output
    Stereo(StereoFrame),
}

impl PipelineOutput {
    /// Number of output channels (1 or 2)
    pub fn channel_count(&self) -> usize {
        match self {
            Self::Mono(signal) => signal.channel_count(),
            Self::Stereo(_) => 2,
        }
    }

    /// Frames per channel
    pub fn len(&self) -> usize {
        match self {
            Self::Mono(signal) => signal.len(),
            Self::Stereo(frame) => frame.len(),
        }
    }

    /// Check for zero frames
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::Mono(signal) => signal.sample_rate(),
            Self::Stereo(frame) => frame.sample_rate(),
        }
    }

    /// Largest absolute sample across all channels
    pub fn peak(&self) -> f32 {
        match self {
            Self::Mono(signal) => signal.peak(),
            Self::Stereo(frame) => frame.peak(),
        }
    }

    /// Samples in frame order, ready for an encoder
    pub fn interleaved(&self) -> Vec<f32> {
        match self {
            Self::Mono(signal) => signal.interleaved(),
            Self::Stereo(frame) => frame.interleaved(),
        }
    }

    /// Convert into a channel-major signal
    pub fn into_signal(self) -> Signal {
        match self {
            Self::Mono(signal) => signal,
            Self::Stereo(frame) => frame.into_signal(),
        }
    }
}

/// Configured pipeline
///
/// Holds configuration only, so one pipeline can process any number of
/// signals, including from several threads.
pub struct Pipeline {
    config: PipelineConfig,
    chain: TransformChain,
    widener: Option<StereoWidener>,
}

impl Pipeline {
    /// Build the stages selected by `config`
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let mut chain = TransformChain::new();
        if config.stretches() {
            chain.add_transform(Box::new(PhaseVocoder::with_settings(
                config.speed,
                config.stretch,
            )?));
        }
        if config.enhance {
            chain.add_transform(Box::new(BandEnhancer::with_settings(config.enhancer)?));
        }
        let widener = if config.stereo {
            Some(StereoWidener::with_settings(config.widener)?)
        } else {
            None
        };

        debug!(
            "Pipeline stages: {:?}{}",
            chain.names(),
            if widener.is_some() { " + Stereo Widen" } else { "" }
        );

        Ok(Self {
            config,
            chain,
            widener,
        })
    }

    /// Configuration this pipeline was built from
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process a mono signal
    ///
    /// Fails with `InvalidParameter` for multi-channel input. No partial
    /// output is returned on failure.
    pub fn run(&self, signal: &Signal) -> Result<PipelineOutput> {
        if !signal.is_mono() {
            return Err(DspError::invalid_parameter(format!(
                "pipeline expects a mono signal, got {} channels",
                signal.channel_count()
            )));
        }
        let sample_rate = signal.sample_rate();

        info!(
            "Processing {:.2}s of audio at {} Hz",
            signal.duration_secs(),
            sample_rate
        );

        let processed = self.chain.apply(signal.channels()[0].as_slice(), sample_rate)?;

        let output = match &self.widener {
            Some(widener) => PipelineOutput::Stereo(widener.widen_mono(&processed, sample_rate)?),
            None => PipelineOutput::Mono(Signal::mono(processed, sample_rate)?),
        };

        debug!(
            "Pipeline produced {} channel(s) x {} frames",
            output.channel_count(),
            output.len()
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::tests::generate_sine;

    const SR: u32 = 22_050;

    fn sine_signal(seconds: f32) -> Signal {
        Signal::mono(generate_sine(440.0, SR, seconds, 0.8), SR).unwrap()
    }

    #[test]
    fn default_config_is_identity() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let input = sine_signal(0.25);

        let output = pipeline.run(&input).unwrap();
        assert_eq!(output, PipelineOutput::Mono(input));
    }

    #[test]
    fn unit_speed_skips_stretch() {
        let config = PipelineConfig {
            enhance: true,
            ..Default::default()
        };
        assert!(!config.stretches());
        let pipeline = Pipeline::new(config).unwrap();
        assert_eq!(pipeline.chain.names(), vec!["Guitar Enhance"]);
    }

    #[test]
    fn stages_in_fixed_order() {
        let config = PipelineConfig {
            speed: 0.75,
            enhance: true,
            stereo: true,
            ..Default::default()
        };
        let pipeline = Pipeline::new(config).unwrap();
        assert_eq!(pipeline.chain.names(), vec!["Time Stretch", "Guitar Enhance"]);
        assert!(pipeline.widener.is_some());

        let output = pipeline.run(&sine_signal(0.5)).unwrap();
        assert_eq!(output.channel_count(), 2);
        assert_eq!(output.len(), 14_700);
        assert_eq!(output.sample_rate(), SR);
        assert!(output.peak() <= 1.0);
        assert_eq!(output.interleaved().len(), 2 * 14_700);
    }

    #[test]
    fn rejects_stereo_input() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let stereo = Signal::from_channels(vec![vec![0.0; 16], vec![0.0; 16]], SR).unwrap();
        assert!(matches!(
            pipeline.run(&stereo),
            Err(DspError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_bad_speed() {
        for speed in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = PipelineConfig {
                speed,
                ..Default::default()
            };
            assert!(config.validate().is_err());
            assert!(Pipeline::new(config).is_err());
        }
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = PipelineConfig::from_json(r#"{ "speed": 0.5, "stereo": true }"#).unwrap();
        assert_eq!(config.speed, 0.5);
        assert!(config.stereo);
        assert!(!config.enhance);
        assert_eq!(config.stretch, StretchSettings::default());
        assert_eq!(config.widener, WidenSettings::default());
    }

    #[test]
    fn json_round_trip() {
        let config = PipelineConfig {
            speed: 1.25,
            enhance: true,
            enhancer: EnhanceSettings {
                mix: 0.6,
                ..Default::default()
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(PipelineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert!(matches!(
            PipelineConfig::from_json("{ speed: fast }"),
            Err(DspError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json(r#"{ "speed": -2.0 }"#),
            Err(DspError::InvalidParameter(_))
        ));
    }
}
