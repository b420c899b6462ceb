//! Forward-backward (zero-phase) filtering through a section cascade
//!
//! The signal is extended at both ends by odd reflection, run through the
//! cascade, reversed, run again and reversed back. Each pass starts from the
//! cascade's steady state for the first input sample so the edges do not ring.

use biquad::{Biquad, DirectForm2Transposed};

use super::filters::FilterCoefficients;
use super::signal::Signal;
use crate::error::{DenoiseError, Result};

/// Number of samples reflected onto each end of the signal.
///
/// Three times the cascade's tap count, less the taps that are identically zero
/// in every first-order section.
pub fn padding_length(coeffs: &FilterCoefficients) -> usize {
    let sections = coeffs.sections();
    let b_zeros = sections.iter().filter(|s| s.b[2] == 0.0).count();
    let a_zeros = sections.iter().filter(|s| s.a[2] == 0.0).count();
    3 * (2 * sections.len() + 1 - b_zeros.min(a_zeros))
}

/// Apply `coeffs` forward and backward, returning a phase-aligned signal of
/// the same length and sample rate.
pub fn apply(coeffs: &FilterCoefficients, signal: &Signal) -> Result<Signal> {
    coeffs.validate()?;

    let dc_gain = coeffs.dc_gain();
    if !dc_gain.is_finite() {
        return Err(DenoiseError::InvalidCoefficients {
            section: 0,
            reason: "cascade has a pole at z = 1 and no steady state".to_string(),
        });
    }

    let edge = padding_length(coeffs);
    let samples = signal.samples();
    if samples.len() <= edge {
        return Err(DenoiseError::SignalTooShort {
            required: edge,
            actual: samples.len(),
        });
    }

    let extended = odd_extend(samples, edge);

    let forward = run_cascade(coeffs, dc_gain, &extended);
    let reversed: Vec<f64> = forward.into_iter().rev().collect();
    let backward = run_cascade(coeffs, dc_gain, &reversed);

    let output: Vec<f64> = backward
        .into_iter()
        .rev()
        .skip(edge)
        .take(samples.len())
        .collect();

    log::debug!(
        "Zero-phase filtered {} samples through {} sections (edge padding {})",
        samples.len(),
        coeffs.len(),
        edge
    );

    Ok(signal.with_samples(output))
}

/// Point-symmetric extension: `2*x[0] - x[edge..=1]`, `x`, `2*x[n-1] - x[n-2..=n-1-edge]`
fn odd_extend(samples: &[f64], edge: usize) -> Vec<f64> {
    let n = samples.len();
    let first = samples[0];
    let last = samples[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * edge);
    extended.extend((1..=edge).rev().map(|i| 2.0 * first - samples[i]));
    extended.extend_from_slice(samples);
    extended.extend((1..=edge).map(|i| 2.0 * last - samples[n - 1 - i]));
    extended
}

/// Run the cascade as if `input[0]` had been held forever before the first
/// sample. By linearity that equals filtering `x - x0` from rest and adding
/// the settled output `dc_gain * x0`.
fn run_cascade(coeffs: &FilterCoefficients, dc_gain: f64, input: &[f64]) -> Vec<f64> {
    let Some(&x0) = input.first() else {
        return Vec::new();
    };

    let mut stages: Vec<DirectForm2Transposed<f64>> = coeffs
        .sections()
        .iter()
        .map(|s| DirectForm2Transposed::<f64>::new(s.to_biquad()))
        .collect();

    let settled = dc_gain * x0;
    input
        .iter()
        .map(|&x| {
            let y = stages
                .iter_mut()
                .fold(x - x0, |acc, stage| stage.run(acc));
            y + settled
        })
        .collect()
}
