//! Attenuation and noise-reduction metrics
//!
//! Attenuation is measured in the sample domain: the mean over all samples of
//! `20*log10|reference| - 20*log10|candidate|`, with zero magnitudes clamped to
//! the smallest positive normal `f64` so the logarithm stays defined.

use super::signal::Signal;
use crate::error::{DenoiseError, Result};

/// Magnitudes below this are clamped before taking the logarithm
pub const MAGNITUDE_FLOOR: f64 = f64::MIN_POSITIVE;

#[inline]
fn magnitude_db(sample: f64) -> f64 {
    20.0 * sample.abs().max(MAGNITUDE_FLOOR).log10()
}

/// Mean decibel difference between `reference` and `candidate`, sample by sample.
///
/// Positive values mean the candidate is quieter than the reference.
pub fn attenuation(reference: &Signal, candidate: &Signal) -> Result<f64> {
    if reference.len() != candidate.len() {
        return Err(DenoiseError::LengthMismatch {
            reference: reference.len(),
            candidate: candidate.len(),
        });
    }
    if reference.is_empty() {
        return Err(DenoiseError::SignalTooShort {
            required: 0,
            actual: 0,
        });
    }

    let total: f64 = reference
        .samples()
        .iter()
        .zip(candidate.samples())
        .map(|(&r, &c)| magnitude_db(r) - magnitude_db(c))
        .sum();

    Ok(total / reference.len() as f64)
}

/// Relative reduction between two attenuations, in percent.
///
/// `(1 - 10^((reference - candidate) / 10)) * 100`. Zero for equal inputs,
/// negative when the candidate attenuates less, and unbounded below; values
/// are diagnostic and never clamped.
pub fn noise_reduction_percent(reference_attenuation: f64, candidate_attenuation: f64) -> f64 {
    (1.0 - 10f64.powf((reference_attenuation - candidate_attenuation) / 10.0)) * 100.0
}

/// Attenuation of `candidate` against `reference`, and its noise reduction
/// relative to the reference measured against itself.
pub fn compute_metrics(reference: &Signal, candidate: &Signal) -> Result<(f64, f64)> {
    let baseline = attenuation(reference, reference)?;
    let attenuation_db = attenuation(reference, candidate)?;
    if reference.peak() == 0.0 {
        log::warn!(
            "Reference signal is silent; attenuation is measured against the magnitude floor"
        );
    }
    Ok((attenuation_db, noise_reduction_percent(baseline, attenuation_db)))
}
