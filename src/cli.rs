use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "denoise-analyzer",
    version,
    about = "Compare STFT masking and zero-phase Butterworth low-pass denoising",
    long_about = "Decode an audio file to mono, run it through an STFT brick-wall mask and a\n\
                  zero-phase Butterworth low-pass, and report attenuation and noise reduction\n\
                  for each strategy."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run both filtering strategies on an audio file and measure them
    Analyze(AnalyzeArgs),
    /// Print Butterworth second-order sections as JSON
    Design(DesignArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input audio file (WAV, FLAC, MP3, OGG, M4A)
    #[arg(long, short)]
    pub input: PathBuf,

    /// JSON options file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the effective options to this file
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// STFT mask cutoff (Hz)
    #[arg(long)]
    pub stft_cutoff: Option<f64>,

    /// Butterworth cutoff (Hz)
    #[arg(long)]
    pub iir_cutoff: Option<f64>,

    /// Butterworth order
    #[arg(long)]
    pub order: Option<usize>,

    /// STFT window length in samples
    #[arg(long)]
    pub window: Option<usize>,

    /// STFT hop length in samples
    #[arg(long)]
    pub hop: Option<usize>,

    /// Frame the signal without reflect-padding its ends
    #[arg(long)]
    pub no_center: bool,

    /// Raised-cosine transition width above the STFT cutoff (Hz)
    #[arg(long)]
    pub taper: Option<f64>,

    /// Write each stage's output as a WAV file into this directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(long, requires = "json")]
    pub compact: bool,
}

#[derive(Args)]
pub struct DesignArgs {
    /// Filter order
    #[arg(long, default_value_t = 4)]
    pub order: usize,

    /// Cutoff frequency (Hz)
    #[arg(long)]
    pub cutoff: f64,

    /// Sample rate (Hz)
    #[arg(long, default_value_t = 16000.0)]
    pub sample_rate: f64,

    /// Compact JSON output (no pretty-printing)
    #[arg(long)]
    pub compact: bool,
}
