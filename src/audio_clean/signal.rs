//! Mono signal value type
//!
//! Every processing stage returns a fresh `Signal`; nothing mutates one in place.

use crate::error::{DenoiseError, Result};

/// Buffered mono audio at a fixed sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl Signal {
    /// Wrap samples at the given rate. Fails on a zero sample rate.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DenoiseError::invalid(
                "sample_rate",
                0.0,
                "sample rate must be positive",
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Convert decoded `f32` samples (the decoder's native format).
    pub fn from_f32(samples: &[f32], sample_rate: u32) -> Result<Self> {
        Self::new(samples.iter().map(|&s| s as f64).collect(), sample_rate)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn nyquist(&self) -> f64 {
        0.5 * self.sample_rate as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value (0 for an empty signal)
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0f64, |acc, s| acc.max(s.abs()))
    }

    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        (self.samples.iter().map(|s| s * s).sum::<f64>() / self.samples.len() as f64).sqrt()
    }

    /// New signal at the same rate holding `samples`
    pub(crate) fn with_samples(&self, samples: Vec<f64>) -> Self {
        Self {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}
