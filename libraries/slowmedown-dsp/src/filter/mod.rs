//! IIR filtering
//!
//! - **design**: Butterworth lowpass/highpass/bandpass design
//! - **sos**: second-order section cascades (causal and zero-phase filtering)

mod design;
mod sos;

pub use design::{butter_bandpass, butter_highpass, butter_lowpass, normalized_cutoff};
pub use sos::{SecondOrderSection, SosFilter};
