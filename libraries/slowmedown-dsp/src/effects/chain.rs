/// Transform chain for offline mono processing
///
/// Transforms run in the order they were added. Unlike a real-time effect,
/// a transform may change the length of its input (time stretching does), so
/// each stage returns a new buffer instead of working in place.
use crate::error::Result;

/// A mono-in, mono-out signal transformation
///
/// Implementations hold configuration only and must not keep state between
/// calls, so one instance can serve any number of signals.
pub trait MonoTransform: Send + Sync {
    /// Transform a mono buffer sampled at `sample_rate`
    fn apply(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>>;

    /// Get transform name (for logging)
    fn name(&self) -> &str;
}

/// Ordered list of mono transforms
#[derive(Default)]
pub struct TransformChain {
    transforms: Vec<Box<dyn MonoTransform>>,
}

impl TransformChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Add a transform to the end of the chain
    pub fn add_transform(&mut self, transform: Box<dyn MonoTransform>) {
        self.transforms.push(transform);
    }

    /// Run `samples` through every transform in order
    ///
    /// Stops at the first failing transform; no partial output is returned.
    pub fn apply(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        let mut buffer = samples.to_vec();
        for transform in &self.transforms {
            tracing::debug!("Applying {} to {} samples", transform.name(), buffer.len());
            buffer = transform.apply(&buffer, sample_rate)?;
        }
        Ok(buffer)
    }

    /// Get number of transforms in chain
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if chain is empty
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Names of the transforms, in order
    pub fn names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }
}
