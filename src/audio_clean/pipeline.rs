//! Denoising analysis pipeline orchestration
//!
//! Runs the two filtering strategies in sequence and measures both:
//! Loaded -> SpectralFiltered (STFT mask) -> TimeFiltered (zero-phase IIR on the
//! STFT output) -> Measured -> Reported.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::filters::{design_lowpass, MAX_FILTER_ORDER};
use super::mask;
use super::metrics::compute_metrics;
use super::signal::Signal;
use super::spectral::SpectralTransform;
use super::zero_phase;
use crate::error::{DenoiseError, ErrorKind, Result};

/// Parameters for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOptions {
    /// Brick-wall cutoff for the STFT mask (Hz)
    pub stft_cutoff_hz: f64,
    /// Butterworth cutoff for the IIR stage (Hz)
    pub iir_cutoff_hz: f64,
    /// Butterworth order (1-32)
    pub filter_order: usize,
    /// STFT frame length in samples
    pub window_length: usize,
    /// STFT frame stride in samples
    pub hop_length: usize,
    /// Reflect-pad half a window at both ends before framing
    pub center: bool,
    /// Raised-cosine transition above the STFT cutoff; `None` keeps the brick wall
    pub mask_taper_hz: Option<f64>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            stft_cutoff_hz: 1000.0,
            iir_cutoff_hz: 1000.0,
            filter_order: 4,
            window_length: 2048,
            hop_length: 512,
            center: true,
            mask_taper_hz: None,
        }
    }
}

impl AnalysisOptions {
    /// Reject options that cannot work at `sample_rate` before any processing.
    pub fn validate(&self, sample_rate: u32) -> Result<()> {
        let nyquist = 0.5 * sample_rate as f64;
        check_cutoff("stft_cutoff_hz", self.stft_cutoff_hz, nyquist)?;
        check_cutoff("iir_cutoff_hz", self.iir_cutoff_hz, nyquist)?;

        if self.filter_order == 0 || self.filter_order > MAX_FILTER_ORDER {
            return Err(DenoiseError::invalid(
                "filter_order",
                self.filter_order as f64,
                format!("filter order must be between 1 and {}", MAX_FILTER_ORDER),
            ));
        }
        if self.window_length < 2 {
            return Err(DenoiseError::invalid(
                "window_length",
                self.window_length as f64,
                "window must span at least 2 samples",
            ));
        }
        if self.hop_length == 0 || self.hop_length >= self.window_length {
            return Err(DenoiseError::invalid(
                "hop_length",
                self.hop_length as f64,
                "hop must be at least 1 and below the window length",
            ));
        }
        if let Some(width) = self.mask_taper_hz {
            if !(width.is_finite() && width > 0.0) {
                return Err(DenoiseError::invalid(
                    "mask_taper_hz",
                    width,
                    "taper width must be positive",
                ));
            }
        }
        Ok(())
    }
}

fn check_cutoff(name: &'static str, cutoff_hz: f64, nyquist: f64) -> Result<()> {
    if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
        return Err(DenoiseError::invalid(
            name,
            cutoff_hz,
            format!("cutoff must be above 0 Hz and below Nyquist ({} Hz)", nyquist),
        ));
    }
    Ok(())
}

/// STFT-mask the signal at `cutoff_hz` and return it with the time taken.
///
/// Window, hop, centering and taper come from `options`.
pub fn run_stft_path(
    signal: &Signal,
    cutoff_hz: f64,
    options: &AnalysisOptions,
) -> Result<(Signal, Duration)> {
    check_cutoff("stft_cutoff_hz", cutoff_hz, signal.nyquist())?;
    let start = Instant::now();

    let transform =
        SpectralTransform::new(options.window_length, options.hop_length)?.centered(options.center);
    let spectrogram = transform.forward(signal)?;
    let freqs = spectrogram.bin_frequencies();

    let masked = match options.mask_taper_hz {
        Some(width) => {
            let gains = mask::build_tapered_mask(&freqs, cutoff_hz, width)?;
            mask::apply_gains(&spectrogram, &gains)?
        }
        None => {
            let bins = mask::build_mask(&freqs, cutoff_hz);
            log::debug!(
                "STFT mask passes {} of {} bins at {} Hz",
                bins.iter().filter(|&&b| b).count(),
                bins.len(),
                cutoff_hz
            );
            mask::apply(&spectrogram, &bins)?
        }
    };

    let filtered = transform.reconstruct(&masked)?;
    Ok((filtered, start.elapsed()))
}

/// Zero-phase Butterworth low-pass at `cutoff_hz`, returned with the time taken.
pub fn run_iir_path(signal: &Signal, cutoff_hz: f64, order: usize) -> Result<(Signal, Duration)> {
    let start = Instant::now();
    let coeffs = design_lowpass(order, cutoff_hz, signal.sample_rate() as f64)?;
    let filtered = zero_phase::apply(&coeffs, signal)?;
    Ok((filtered, start.elapsed()))
}

/// Pipeline states, in the order they are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Loaded,
    SpectralFiltered,
    TimeFiltered,
    Measured,
    Reported,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loaded => "load",
            Self::SpectralFiltered => "spectral filter",
            Self::TimeFiltered => "time-domain filter",
            Self::Measured => "metrics",
            Self::Reported => "report",
        };
        f.write_str(name)
    }
}

/// A pipeline failure: the stage being entered and the untouched cause
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: PipelineStage,
    pub source: DenoiseError,
}

impl StageError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// One filtering strategy's output and measurements
#[derive(Debug, Clone)]
pub struct StageResult {
    pub label: String,
    pub signal: Signal,
    pub duration: Duration,
    pub attenuation_db: f64,
    pub noise_reduction_pct: f64,
}

/// Receives stage results once they are measured (printing, plotting, export)
pub trait ReportSink {
    fn accept(&mut self, result: &StageResult);
}

impl ReportSink for Vec<StageResult> {
    fn accept(&mut self, result: &StageResult) {
        self.push(result.clone());
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub original: Signal,
    pub stages: Vec<StageResult>,
    pub state: PipelineStage,
}

/// Sequences both filtering strategies over one buffered signal
#[derive(Debug, Clone, Default)]
pub struct DenoisePipeline {
    options: AnalysisOptions,
}

impl DenoisePipeline {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Run every stage on `signal`, handing measured results to `sink`.
    ///
    /// The first failing stage aborts the run; nothing is retried.
    pub fn run(
        &self,
        signal: Signal,
        sink: &mut dyn ReportSink,
    ) -> std::result::Result<PipelineReport, StageError> {
        let options = &self.options;
        let mut state = PipelineStage::Loaded;
        log::info!(
            "Loaded {} samples at {} Hz ({:.2}s)",
            signal.len(),
            signal.sample_rate(),
            signal.duration_secs()
        );

        let (stft_signal, stft_time) =
            run_stft_path(&signal, options.stft_cutoff_hz, options)
                .map_err(|e| fail(PipelineStage::SpectralFiltered, e))?;
        state = advance(state, PipelineStage::SpectralFiltered);
        log::info!(
            "STFT mask at {} Hz done in {:.1}ms",
            options.stft_cutoff_hz,
            stft_time.as_secs_f64() * 1000.0
        );

        let (iir_signal, iir_time) =
            run_iir_path(&stft_signal, options.iir_cutoff_hz, options.filter_order)
                .map_err(|e| fail(PipelineStage::TimeFiltered, e))?;
        state = advance(state, PipelineStage::TimeFiltered);
        log::info!(
            "Order-{} IIR at {} Hz done in {:.1}ms",
            options.filter_order,
            options.iir_cutoff_hz,
            iir_time.as_secs_f64() * 1000.0
        );

        let (stft_att, stft_pct) = compute_metrics(&signal, &stft_signal)
            .map_err(|e| fail(PipelineStage::Measured, e))?;
        let (iir_att, iir_pct) = compute_metrics(&signal, &iir_signal)
            .map_err(|e| fail(PipelineStage::Measured, e))?;
        state = advance(state, PipelineStage::Measured);

        let stages = vec![
            StageResult {
                label: "STFT".to_string(),
                signal: stft_signal,
                duration: stft_time,
                attenuation_db: stft_att,
                noise_reduction_pct: stft_pct,
            },
            StageResult {
                label: "IIR".to_string(),
                signal: iir_signal,
                duration: iir_time,
                attenuation_db: iir_att,
                noise_reduction_pct: iir_pct,
            },
        ];

        for result in &stages {
            sink.accept(result);
        }
        state = advance(state, PipelineStage::Reported);

        Ok(PipelineReport {
            original: signal,
            stages,
            state,
        })
    }
}

fn advance(from: PipelineStage, to: PipelineStage) -> PipelineStage {
    log::debug!("Pipeline: {:?} -> {:?}", from, to);
    to
}

fn fail(stage: PipelineStage, source: DenoiseError) -> StageError {
    log::error!("Pipeline aborted in {} stage: {}", stage, source);
    StageError { stage, source }
}
