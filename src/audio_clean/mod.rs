//! Audio denoising analysis core
//!
//! Two low-pass strategies over a fully buffered mono signal, plus the metrics
//! used to compare them:
//! 1. STFT analysis, brick-wall (or tapered) bin mask, overlap-add resynthesis
//! 2. Butterworth design as second-order sections, run forward and backward
//! 3. Sample-domain attenuation and noise-reduction percentage

pub mod filters;
pub mod mask;
pub mod metrics;
pub mod pipeline;
pub mod signal;
pub mod spectral;
pub mod zero_phase;

pub use filters::{design_lowpass, FilterCoefficients, SecondOrderSection};
pub use metrics::{attenuation, compute_metrics, noise_reduction_percent};
pub use pipeline::{
    run_iir_path, run_stft_path, AnalysisOptions, DenoisePipeline, PipelineReport, PipelineStage,
    ReportSink, StageError, StageResult,
};
pub use signal::Signal;
pub use spectral::{SpectralTransform, Spectrogram};
