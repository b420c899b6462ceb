//! Offline comparison of two audio low-pass denoising strategies.

pub mod audio_clean;
pub mod commands;
pub mod error;

pub use audio_clean::{
    compute_metrics, design_lowpass, run_iir_path, run_stft_path, AnalysisOptions,
    DenoisePipeline, FilterCoefficients, PipelineReport, PipelineStage, ReportSink, Signal,
    StageError, StageResult,
};
pub use error::{DenoiseError, ErrorKind, Result};
