//! Signal value types
//!
//! Everything here is a transient value: produced and consumed inside a single
//! pipeline invocation, never shared or cached.

mod audio;
mod stereo;

pub use audio::{peak_abs, Signal};
pub use stereo::{Channel, StereoFrame};
