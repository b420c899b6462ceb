//! Frequency-domain low-pass masks for spectrograms
//!
//! The default is a hard brick wall: bins at or below the cutoff pass, all
//! others are zeroed in every frame. That rings around transients; a
//! raised-cosine taper above the cutoff is available when exact reference
//! behaviour is not needed.

use std::f64::consts::PI;

use super::spectral::Spectrogram;
use crate::error::{DenoiseError, Result};

/// `true` for every bin whose frequency is at or below `cutoff_hz`
pub fn build_mask(bin_frequencies: &[f64], cutoff_hz: f64) -> Vec<bool> {
    bin_frequencies.iter().map(|&f| f <= cutoff_hz).collect()
}

/// Zero every bin the mask rejects.
pub fn apply(spectrogram: &Spectrogram, mask: &[bool]) -> Result<Spectrogram> {
    let gains: Vec<f64> = mask.iter().map(|&pass| if pass { 1.0 } else { 0.0 }).collect();
    apply_gains(spectrogram, &gains)
}

/// Per-bin gains: 1 up to the cutoff, a half-cosine fall to 0 over `width_hz`.
pub fn build_tapered_mask(
    bin_frequencies: &[f64],
    cutoff_hz: f64,
    width_hz: f64,
) -> Result<Vec<f64>> {
    if !(width_hz.is_finite() && width_hz > 0.0) {
        return Err(DenoiseError::invalid(
            "mask_taper_hz",
            width_hz,
            "taper width must be positive",
        ));
    }

    Ok(bin_frequencies
        .iter()
        .map(|&f| {
            if f <= cutoff_hz {
                1.0
            } else if f < cutoff_hz + width_hz {
                0.5 * (1.0 + (PI * (f - cutoff_hz) / width_hz).cos())
            } else {
                0.0
            }
        })
        .collect())
}

/// Scale every frame's bin `i` by `gains[i]`.
pub fn apply_gains(spectrogram: &Spectrogram, gains: &[f64]) -> Result<Spectrogram> {
    if gains.len() != spectrogram.bin_count() {
        return Err(DenoiseError::DimensionMismatch {
            expected: spectrogram.bin_count(),
            actual: gains.len(),
        });
    }
    Ok(spectrogram.scaled_by_bin(gains))
}
