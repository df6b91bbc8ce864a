//! slowmedown DSP
//!
//! Offline processing for a single mono recording:
//! - **stretch**: pitch-preserving time stretch (phase vocoder)
//! - **effects**: guitar-band enhancement and Haas-delay stereo widening
//! - **filter**: Butterworth design and second-order-section filtering
//! - **pipeline**: the three stages in fixed order, driven by `PipelineConfig`
//!
//! # Example
//!
//! ```rust
//! use slowmedown_dsp::{Pipeline, PipelineConfig, Signal};
//!
//! let samples: Vec<f32> = (0..22_050)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 22_050.0).sin())
//!     .collect();
//! let signal = Signal::mono(samples, 22_050).unwrap();
//!
//! let json = r#"{ "speed": 0.75, "enhance": true, "stereo": true }"#;
//! let config = PipelineConfig::from_json(json).unwrap();
//! let output = Pipeline::new(config).unwrap().run(&signal).unwrap();
//!
//! assert_eq!(output.channel_count(), 2);
//! assert_eq!(output.len(), 29_400);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod effects;
pub mod error;
pub mod fft;
pub mod filter;
pub mod pipeline;
pub mod stretch;

pub use effects::{
    enhance, widen, BandEnhancer, EnhanceSettings, MonoTransform, StereoWidener, TransformChain,
    WidenSettings,
};
pub use error::{DspError, Result};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};
pub use stretch::{stretch, PhaseVocoder, StretchSettings};

pub use slowmedown_core::{Channel, CoreError, Signal, StereoFrame};
