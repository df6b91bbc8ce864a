//! slowmedown Core
//!
//! Value types and error handling shared by the slowmedown processing crates.
//!
//! The core crate defines:
//! - **Signal**: channel-major sample buffers with a sample rate
//! - **StereoFrame**: a validated Left/Right channel pair
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use slowmedown_core::{Channel, Signal, StereoFrame};
//!
//! let mono = Signal::mono(vec![0.0, 0.5, -0.5], 22_050).unwrap();
//! assert!(mono.is_mono());
//!
//! let frame = StereoFrame::new(vec![0.1, 0.2], vec![0.3, 0.4], 22_050).unwrap();
//! assert_eq!(frame.channel(Channel::Right), &[0.3, 0.4]);
//! assert_eq!(frame.interleaved(), vec![0.1, 0.3, 0.2, 0.4]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::{peak_abs, Channel, Signal, StereoFrame};
