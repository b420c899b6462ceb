//! Property-based tests for the analysis core
//!
//! These tests use proptest to check invariants across random signals and parameters.

use denoise_analyzer::audio_clean::filters::MAX_FILTER_ORDER;
use denoise_analyzer::audio_clean::{mask, metrics, zero_phase, SpectralTransform};
use denoise_analyzer::{design_lowpass, Signal};
use proptest::prelude::*;

const SAMPLE_RATE: u32 = 16000;

fn signal(samples: Vec<f64>) -> Signal {
    Signal::new(samples, SAMPLE_RATE).unwrap()
}

proptest! {
    /// Every designed section has its poles inside the unit circle
    #[test]
    fn designed_filters_are_stable(
        order in 1usize..=MAX_FILTER_ORDER,
        fraction in 0.01f64..0.49,
    ) {
        let cutoff = fraction * SAMPLE_RATE as f64;
        let coeffs = design_lowpass(order, cutoff, SAMPLE_RATE as f64).unwrap();

        prop_assert_eq!(coeffs.order(), order);
        for section in coeffs.sections() {
            let [a0, a1, a2] = section.a;
            prop_assert_eq!(a0, 1.0);
            if section.is_first_order() {
                prop_assert!(a1.abs() < 1.0);
            } else {
                prop_assert!(a2.abs() < 1.0, "a2 = {}", a2);
                prop_assert!(a1.abs() < 1.0 + a2, "a1 = {}, a2 = {}", a1, a2);
            }
        }
        prop_assert!((coeffs.dc_gain() - 1.0).abs() < 1e-9);
    }

    /// Zero-phase filtering keeps the length and never produces NaN or Inf
    #[test]
    fn zero_phase_output_is_finite(
        order in 1usize..=8,
        fraction in 0.02f64..0.45,
        samples in prop::collection::vec(-1.0f64..1.0, 200..1000),
    ) {
        let cutoff = fraction * SAMPLE_RATE as f64;
        let coeffs = design_lowpass(order, cutoff, SAMPLE_RATE as f64).unwrap();
        let input = signal(samples);
        let output = zero_phase::apply(&coeffs, &input).unwrap();

        prop_assert_eq!(output.len(), input.len());
        prop_assert!(output.samples().iter().all(|s| s.is_finite()));
    }

    /// A constant signal passes a low-pass unchanged
    #[test]
    fn zero_phase_passes_dc(
        order in 1usize..=8,
        fraction in 0.02f64..0.45,
        level in -1.0f64..1.0,
    ) {
        let cutoff = fraction * SAMPLE_RATE as f64;
        let coeffs = design_lowpass(order, cutoff, SAMPLE_RATE as f64).unwrap();
        let output = zero_phase::apply(&coeffs, &signal(vec![level; 256])).unwrap();
        for &s in output.samples() {
            prop_assert!((s - level).abs() < 1e-9, "{} vs {}", s, level);
        }
    }

    /// Centered STFT followed by its inverse reproduces the input
    #[test]
    fn stft_round_trip(samples in prop::collection::vec(-1.0f64..1.0, 600..3000)) {
        let stft = SpectralTransform::new(256, 64).unwrap().centered(true);
        let input = signal(samples);
        let output = stft.reconstruct(&stft.forward(&input).unwrap()).unwrap();

        prop_assert_eq!(output.len(), input.len());
        for (a, b) in output.samples().iter().zip(input.samples()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }

    /// Masking twice changes nothing after the first pass
    #[test]
    fn mask_is_idempotent(
        cutoff in 0.0f64..8000.0,
        samples in prop::collection::vec(-1.0f64..1.0, 512..1024),
    ) {
        let spec = SpectralTransform::new(128, 32).unwrap().forward(&signal(samples)).unwrap();
        let bins = mask::build_mask(&spec.bin_frequencies(), cutoff);
        let once = mask::apply(&spec, &bins).unwrap();
        let twice = mask::apply(&once, &bins).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Raising the cutoff never rejects a bin that a lower cutoff passed
    #[test]
    fn mask_grows_with_cutoff(low in 0.0f64..8000.0, extra in 0.0f64..4000.0) {
        let freqs = denoise_analyzer::audio_clean::spectral::bin_frequencies(512, SAMPLE_RATE);
        let narrow = mask::build_mask(&freqs, low);
        let wide = mask::build_mask(&freqs, low + extra);
        for (&n, &w) in narrow.iter().zip(&wide) {
            prop_assert!(!n || w);
        }
    }

    /// A signal measured against itself has zero attenuation and zero reduction
    #[test]
    fn self_comparison_is_neutral(samples in prop::collection::vec(-1.0f64..1.0, 1..500)) {
        let x = signal(samples);
        let att = metrics::attenuation(&x, &x).unwrap();
        prop_assert_eq!(att, 0.0);
        prop_assert_eq!(metrics::noise_reduction_percent(att, att), 0.0);
    }

    /// Uniform scaling by g shows up as -20*log10(g) dB of attenuation
    #[test]
    fn scaling_maps_to_attenuation(
        gain in 0.01f64..1.0,
        samples in prop::collection::vec(0.1f64..1.0, 1..200),
    ) {
        let x = signal(samples);
        let y = signal(x.samples().iter().map(|s| s * gain).collect());
        let att = metrics::attenuation(&x, &y).unwrap();
        prop_assert!((att + 20.0 * gain.log10()).abs() < 1e-9);
    }
}
