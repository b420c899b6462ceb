//! Short-time Fourier transform and overlap-add inverse
//!
//! Frames are Hann-windowed, transformed with a real-input FFT and stored in
//! time order. The inverse applies the same window again on synthesis and
//! divides by the accumulated squared window so an unmodified spectrogram
//! reconstructs its input.

use std::f64::consts::PI;
use std::sync::Arc;

use realfft::num_complex::Complex64;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

use super::signal::Signal;
use crate::error::{DenoiseError, Result};

/// Overlap-add positions whose squared-window sum is below this are left at zero
const WINDOW_SUM_FLOOR: f64 = 1e-8;

/// Complex STFT values, indexed by frequency bin and time frame
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// One spectrum of `window_length / 2 + 1` bins per frame
    frames: Vec<Vec<Complex64>>,
    window_length: usize,
    hop_length: usize,
    sample_rate: u32,
    /// Samples prepended before framing (centered analysis)
    padding: usize,
    /// Length of the signal the frames were taken from
    source_len: usize,
}

impl Spectrogram {
    /// Assemble a spectrogram from externally produced frames.
    ///
    /// The source length is taken to be the full overlap-add span.
    pub fn from_frames(
        frames: Vec<Vec<Complex64>>,
        window_length: usize,
        hop_length: usize,
        sample_rate: u32,
    ) -> Self {
        let source_len = if frames.is_empty() {
            0
        } else {
            window_length + hop_length * (frames.len() - 1)
        };
        Self {
            frames,
            window_length,
            hop_length,
            sample_rate,
            padding: 0,
            source_len,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.window_length / 2 + 1
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn frame(&self, index: usize) -> Option<&[Complex64]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    /// Value at `[bin, frame]`
    pub fn value(&self, bin: usize, frame: usize) -> Option<Complex64> {
        self.frames.get(frame).and_then(|f| f.get(bin)).copied()
    }

    /// Centre frequency of every bin in Hz
    pub fn bin_frequencies(&self) -> Vec<f64> {
        bin_frequencies(self.window_length, self.sample_rate)
    }

    /// |X| per frame, frames outermost
    pub fn magnitudes(&self) -> Vec<Vec<f64>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect()
    }

    /// Copy with every frame's bin `i` multiplied by `gains[i]`
    pub(crate) fn scaled_by_bin(&self, gains: &[f64]) -> Self {
        let frames = self
            .frames
            .iter()
            .map(|frame| {
                frame
                    .iter()
                    .zip(gains)
                    .map(|(&value, &gain)| value * gain)
                    .collect()
            })
            .collect();
        Self {
            frames,
            ..self.clone_shape()
        }
    }

    fn clone_shape(&self) -> Self {
        Self {
            frames: Vec::new(),
            window_length: self.window_length,
            hop_length: self.hop_length,
            sample_rate: self.sample_rate,
            padding: self.padding,
            source_len: self.source_len,
        }
    }
}

/// Frequencies of the `window_length / 2 + 1` bins of a real FFT
pub fn bin_frequencies(window_length: usize, sample_rate: u32) -> Vec<f64> {
    let resolution = sample_rate as f64 / window_length as f64;
    (0..window_length / 2 + 1)
        .map(|i| i as f64 * resolution)
        .collect()
}

/// STFT analysis/synthesis for one window/hop configuration
pub struct SpectralTransform {
    window_length: usize,
    hop_length: usize,
    center: bool,
    forward_fft: Arc<dyn RealToComplex<f64>>,
    inverse_fft: Arc<dyn ComplexToReal<f64>>,
    window: Vec<f64>,
}

impl std::fmt::Debug for SpectralTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralTransform")
            .field("window_length", &self.window_length)
            .field("hop_length", &self.hop_length)
            .field("center", &self.center)
            .finish_non_exhaustive()
    }
}

impl SpectralTransform {
    /// Plan forward and inverse FFTs for the given frame layout.
    ///
    /// # Arguments
    /// * `window_length` - Samples per frame (and FFT size), at least 2
    /// * `hop_length` - Stride between frames, strictly less than `window_length`
    ///   so every sample is covered by a non-zero part of some window
    pub fn new(window_length: usize, hop_length: usize) -> Result<Self> {
        if window_length < 2 {
            return Err(DenoiseError::invalid(
                "window_length",
                window_length as f64,
                "window must span at least 2 samples",
            ));
        }
        if hop_length == 0 || hop_length >= window_length {
            return Err(DenoiseError::invalid(
                "hop_length",
                hop_length as f64,
                format!("hop must be at least 1 and below the window length ({})", window_length),
            ));
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let forward_fft = planner.plan_fft_forward(window_length);
        let inverse_fft = planner.plan_fft_inverse(window_length);

        // Periodic Hann window
        let window: Vec<f64> = (0..window_length)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / window_length as f64).cos()))
            .collect();

        Ok(Self {
            window_length,
            hop_length,
            center: false,
            forward_fft,
            inverse_fft,
            window,
        })
    }

    /// Reflect-pad half a window on both sides before framing, so the first
    /// and last samples sit under the middle of a frame.
    pub fn centered(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    pub fn bin_count(&self) -> usize {
        self.window_length / 2 + 1
    }

    /// Frames needed to cover `padded_len` samples, the last one zero-filled
    fn frame_count(&self, padded_len: usize) -> usize {
        1 + (padded_len - self.window_length).div_ceil(self.hop_length)
    }

    /// Compute the STFT of `signal`.
    pub fn forward(&self, signal: &Signal) -> Result<Spectrogram> {
        let samples = signal.samples();
        let padding = if self.center { self.window_length / 2 } else { 0 };

        if self.center && samples.len() <= padding {
            return Err(DenoiseError::SignalTooShort {
                required: padding,
                actual: samples.len(),
            });
        }
        if !self.center && samples.len() < self.window_length {
            return Err(DenoiseError::SignalTooShort {
                required: self.window_length - 1,
                actual: samples.len(),
            });
        }

        let mut padded = Vec::with_capacity(samples.len() + 2 * padding + self.window_length);
        padded.extend((1..=padding).rev().map(|i| samples[i]));
        padded.extend_from_slice(samples);
        let n = samples.len();
        padded.extend((1..=padding).map(|i| samples[n - 1 - i]));

        let frame_count = self.frame_count(padded.len());
        padded.resize(self.window_length + self.hop_length * (frame_count - 1), 0.0);

        let mut buffer = self.forward_fft.make_input_vec();
        let mut frames = Vec::with_capacity(frame_count);

        for f in 0..frame_count {
            let start = f * self.hop_length;
            let frame = &padded[start..start + self.window_length];
            for ((dst, &s), &w) in buffer.iter_mut().zip(frame).zip(&self.window) {
                *dst = s * w;
            }

            let mut spectrum = self.forward_fft.make_output_vec();
            self.forward_fft
                .process(&mut buffer, &mut spectrum)
                .map_err(|e| DenoiseError::Transform(format!("{:?}", e)))?;
            frames.push(spectrum);
        }

        log::debug!(
            "STFT: {} samples -> {} frames x {} bins (window {}, hop {})",
            n,
            frame_count,
            self.bin_count(),
            self.window_length,
            self.hop_length
        );

        Ok(Spectrogram {
            frames,
            window_length: self.window_length,
            hop_length: self.hop_length,
            sample_rate: signal.sample_rate(),
            padding,
            source_len: n,
        })
    }

    /// Overlap-add every frame back into the time domain.
    ///
    /// Returns `window + hop * (frames - 1)` samples, padding included.
    pub fn inverse(&self, spectrogram: &Spectrogram) -> Result<Signal> {
        self.check_shape(spectrogram)?;

        let frame_count = spectrogram.frame_count();
        let out_len = self.window_length + self.hop_length * (frame_count - 1);
        let mut output = vec![0.0f64; out_len];
        let mut window_sum = vec![0.0f64; out_len];

        let norm = 1.0 / self.window_length as f64;
        let mut spectrum = self.inverse_fft.make_input_vec();
        let mut time_buffer = self.inverse_fft.make_output_vec();

        for (f, frame) in spectrogram.frames.iter().enumerate() {
            spectrum.copy_from_slice(frame);
            // DC (and Nyquist for even sizes) must be real for a real output
            spectrum[0].im = 0.0;
            if self.window_length % 2 == 0 {
                if let Some(last) = spectrum.last_mut() {
                    last.im = 0.0;
                }
            }

            self.inverse_fft
                .process(&mut spectrum, &mut time_buffer)
                .map_err(|e| DenoiseError::Transform(format!("{:?}", e)))?;

            let offset = f * self.hop_length;
            for (i, (&sample, &w)) in time_buffer.iter().zip(&self.window).enumerate() {
                output[offset + i] += sample * norm * w;
                window_sum[offset + i] += w * w;
            }
        }

        for (sample, &sum) in output.iter_mut().zip(&window_sum) {
            *sample = if sum > WINDOW_SUM_FLOOR { *sample / sum } else { 0.0 };
        }

        Signal::new(output, spectrogram.sample_rate)
    }

    /// Inverse transform trimmed back to the analysed signal's extent.
    pub fn reconstruct(&self, spectrogram: &Spectrogram) -> Result<Signal> {
        let full = self.inverse(spectrogram)?;
        let samples: Vec<f64> = full
            .into_samples()
            .into_iter()
            .skip(spectrogram.padding)
            .take(spectrogram.source_len)
            .collect();
        Signal::new(samples, spectrogram.sample_rate)
    }

    fn check_shape(&self, spectrogram: &Spectrogram) -> Result<()> {
        if spectrogram.window_length != self.window_length {
            return Err(DenoiseError::ConfigurationMismatch(format!(
                "spectrogram window {} vs transform window {}",
                spectrogram.window_length, self.window_length
            )));
        }
        if spectrogram.hop_length != self.hop_length {
            return Err(DenoiseError::ConfigurationMismatch(format!(
                "spectrogram hop {} vs transform hop {}",
                spectrogram.hop_length, self.hop_length
            )));
        }
        if spectrogram.frames.is_empty() {
            return Err(DenoiseError::ConfigurationMismatch(
                "spectrogram has no frames".to_string(),
            ));
        }
        let bins = self.bin_count();
        if let Some((i, frame)) = spectrogram
            .frames
            .iter()
            .enumerate()
            .find(|(_, frame)| frame.len() != bins)
        {
            return Err(DenoiseError::ConfigurationMismatch(format!(
                "frame {} has {} bins, expected {}",
                i,
                frame.len(),
                bins
            )));
        }
        let expected_frames = self.frame_count(
            (spectrogram.source_len + 2 * spectrogram.padding).max(self.window_length),
        );
        if spectrogram.frames.len() != expected_frames {
            return Err(DenoiseError::ConfigurationMismatch(format!(
                "{} frames for a {}-sample source, expected {}",
                spectrogram.frames.len(),
                spectrogram.source_len,
                expected_frames
            )));
        }
        Ok(())
    }
}
