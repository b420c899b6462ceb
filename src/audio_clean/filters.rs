//! Butterworth low-pass design as cascaded second-order sections
//!
//! The analog prototype's poles sit evenly on the left half of the unit circle.
//! Each conjugate pair becomes one biquad through the bilinear transform with a
//! prewarped cutoff; an odd order adds one first-order section for the real pole.

use std::f64::consts::PI;

use realfft::num_complex::Complex64;
use serde::Serialize;

use crate::error::{DenoiseError, Result};

/// Highest order accepted by [`design_lowpass`]
pub const MAX_FILTER_ORDER: usize = 32;

/// One biquad stage: H(z) = (b0 + b1 z^-1 + b2 z^-2) / (a0 + a1 z^-1 + a2 z^-2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SecondOrderSection {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl SecondOrderSection {
    pub fn new(b: [f64; 3], a: [f64; 3]) -> Self {
        Self { b, a }
    }

    /// Scale every coefficient so that `a0 == 1`.
    fn normalized(b: [f64; 3], a: [f64; 3]) -> Self {
        let a0 = a[0];
        Self {
            b: b.map(|c| c / a0),
            a: a.map(|c| c / a0),
        }
    }

    /// First-order sections carry zeros in both `z^-2` taps.
    pub fn is_first_order(&self) -> bool {
        self.b[2] == 0.0 && self.a[2] == 0.0
    }

    /// Gain at 0 Hz (z = 1)
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    /// Check the section can run as a causal recursion.
    pub fn validate(&self, index: usize) -> Result<()> {
        if self.b.iter().chain(self.a.iter()).any(|c| !c.is_finite()) {
            return Err(DenoiseError::InvalidCoefficients {
                section: index,
                reason: "non-finite coefficient".to_string(),
            });
        }
        if self.a[0] == 0.0 {
            return Err(DenoiseError::InvalidCoefficients {
                section: index,
                reason: "leading denominator coefficient is zero".to_string(),
            });
        }
        Ok(())
    }

    /// Normalized coefficients in the form the `biquad` runners take
    pub fn to_biquad(&self) -> biquad::Coefficients<f64> {
        let a0 = self.a[0];
        biquad::Coefficients {
            a1: self.a[1] / a0,
            a2: self.a[2] / a0,
            b0: self.b[0] / a0,
            b1: self.b[1] / a0,
            b2: self.b[2] / a0,
        }
    }

    fn response(&self, z_inv: Complex64) -> Complex64 {
        let z_inv2 = z_inv * z_inv;
        let num = self.b[0] + z_inv * self.b[1] + z_inv2 * self.b[2];
        let den = self.a[0] + z_inv * self.a[1] + z_inv2 * self.a[2];
        num / den
    }
}

/// Ordered cascade of sections produced by [`design_lowpass`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCoefficients {
    sections: Vec<SecondOrderSection>,
}

impl FilterCoefficients {
    /// Build a cascade from arbitrary sections. Nothing is validated here;
    /// the filter checks sections before running them.
    pub fn from_sections(sections: Vec<SecondOrderSection>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[SecondOrderSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Filter order realised by the cascade
    pub fn order(&self) -> usize {
        self.sections
            .iter()
            .map(|s| if s.is_first_order() { 1 } else { 2 })
            .sum()
    }

    /// Rows laid out as `[b0, b1, b2, a0, a1, a2]`
    pub fn rows(&self) -> Vec<[f64; 6]> {
        self.sections
            .iter()
            .map(|s| [s.b[0], s.b[1], s.b[2], s.a[0], s.a[1], s.a[2]])
            .collect()
    }

    pub fn dc_gain(&self) -> f64 {
        self.sections.iter().map(SecondOrderSection::dc_gain).product()
    }

    /// |H(f)| of the whole cascade
    pub fn magnitude_response(&self, freq_hz: f64, sample_rate_hz: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / sample_rate_hz;
        let z_inv = Complex64::from_polar(1.0, -omega);
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(z_inv))
            .norm()
    }

    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(DenoiseError::InvalidCoefficients {
                section: 0,
                reason: "cascade has no sections".to_string(),
            });
        }
        for (i, section) in self.sections.iter().enumerate() {
            section.validate(i)?;
        }
        Ok(())
    }
}

/// Design a Butterworth low-pass of the given order.
///
/// # Arguments
/// * `order` - Filter order (1..=`MAX_FILTER_ORDER`)
/// * `cutoff_hz` - -3 dB frequency, strictly between 0 and Nyquist
/// * `sample_rate_hz` - Sample rate of the signal to be filtered
pub fn design_lowpass(
    order: usize,
    cutoff_hz: f64,
    sample_rate_hz: f64,
) -> Result<FilterCoefficients> {
    if order == 0 || order > MAX_FILTER_ORDER {
        return Err(DenoiseError::invalid(
            "order",
            order as f64,
            format!("filter order must be between 1 and {}", MAX_FILTER_ORDER),
        ));
    }
    if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
        return Err(DenoiseError::invalid(
            "sample_rate_hz",
            sample_rate_hz,
            "sample rate must be positive",
        ));
    }

    let nyquist = 0.5 * sample_rate_hz;
    let wn = cutoff_hz / nyquist;
    if !(wn > 0.0 && wn < 1.0) {
        return Err(DenoiseError::invalid(
            "cutoff_hz",
            cutoff_hz,
            format!("cutoff must be above 0 Hz and below Nyquist ({} Hz)", nyquist),
        ));
    }

    // Prewarped analog cutoff for the bilinear transform
    let k = (PI * wn / 2.0).tan();
    let k2 = k * k;

    let mut sections = Vec::with_capacity(order.div_ceil(2));

    if order % 2 == 1 {
        // Real pole at s = -1: H(s) = 1 / (s + 1)
        sections.push(SecondOrderSection::normalized(
            [k, k, 0.0],
            [1.0 + k, k - 1.0, 0.0],
        ));
    }

    // Most damped pair first, highest-Q pair runs last
    for pair in (0..order / 2).rev() {
        let theta = PI * (2 * pair + 1) as f64 / (2 * order) as f64;
        let damping = 2.0 * theta.sin();
        sections.push(SecondOrderSection::normalized(
            [k2, 2.0 * k2, k2],
            [1.0 + damping * k + k2, 2.0 * (k2 - 1.0), 1.0 - damping * k + k2],
        ));
    }

    log::debug!(
        "Designed order-{} Butterworth low-pass at {} Hz (Wn = {:.5}) as {} sections",
        order,
        cutoff_hz,
        wn,
        sections.len()
    );

    Ok(FilterCoefficients { sections })
}
