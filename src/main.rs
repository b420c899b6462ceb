use std::io::Write;

use clap::Parser;
use serde::Serialize;

use denoise_analyzer::commands::report::{ConsoleReport, JsonReport};
use denoise_analyzer::commands::{audio, export, project};
use denoise_analyzer::{
    design_lowpass, AnalysisOptions, DenoiseError, DenoisePipeline, ErrorKind, ReportSink,
};

mod cli;
mod exit_codes;

use cli::{AnalyzeArgs, Cli, DesignArgs};

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let exit_code = match cli.command {
        cli::Command::Analyze(args) => analyze(args),
        cli::Command::Design(args) => design(args),
    };

    std::process::exit(exit_code);
}

fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidParameter
        | ErrorKind::SignalTooShort
        | ErrorKind::Decode
        | ErrorKind::Config
        | ErrorKind::Io => exit_codes::INPUT_ERROR,
        _ => exit_codes::EXECUTION_ERROR,
    }
}

fn report_error(err: &DenoiseError) -> i32 {
    eprintln!("Error: {}", err);
    exit_code_for(err.kind())
}

fn effective_options(args: &AnalyzeArgs) -> Result<AnalysisOptions, DenoiseError> {
    let mut options = match &args.config {
        Some(path) => project::load_options(path)?,
        None => AnalysisOptions::default(),
    };

    if let Some(cutoff) = args.stft_cutoff {
        options.stft_cutoff_hz = cutoff;
    }
    if let Some(cutoff) = args.iir_cutoff {
        options.iir_cutoff_hz = cutoff;
    }
    if let Some(order) = args.order {
        options.filter_order = order;
    }
    if let Some(window) = args.window {
        options.window_length = window;
    }
    if let Some(hop) = args.hop {
        options.hop_length = hop;
    }
    if args.no_center {
        options.center = false;
    }
    if args.taper.is_some() {
        options.mask_taper_hz = args.taper;
    }
    Ok(options)
}

fn analyze(args: AnalyzeArgs) -> i32 {
    let options = match effective_options(&args) {
        Ok(options) => options,
        Err(e) => return report_error(&e),
    };

    let metadata = match audio::probe_metadata(&args.input) {
        Ok(metadata) => metadata,
        Err(e) => return report_error(&e),
    };
    log::info!(
        "Input: {}, {} Hz, {} channel(s), {:.2}s",
        metadata.format,
        metadata.sample_rate,
        metadata.channels,
        metadata.duration
    );

    let signal = match audio::load_mono(&args.input) {
        Ok(signal) => signal,
        Err(e) => return report_error(&e),
    };

    if let Err(e) = options.validate(signal.sample_rate()) {
        return report_error(&e);
    }
    if let Some(path) = &args.save_config {
        if let Err(e) = project::save_options(path, &options) {
            return report_error(&e);
        }
    }

    let source = args.input.display().to_string();
    let mut json_report = JsonReport::new(Some(source)).with_input(metadata);
    let mut text_report = ConsoleReport::new(std::io::stdout());
    let sink: &mut dyn ReportSink = if args.json {
        &mut json_report
    } else {
        &mut text_report
    };

    let report = match DenoisePipeline::new(options).run(signal, sink) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_code_for(e.kind());
        }
    };

    if let Some(dir) = &args.output_dir {
        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        match export::export_stages(dir, stem, &report.stages) {
            Ok(paths) => {
                for path in paths {
                    log::info!("Exported {}", path.display());
                }
            }
            Err(e) => return report_error(&e),
        }
    }

    if args.json {
        return match json_report.to_json(args.compact) {
            Ok(json) => write_stdout(&json),
            Err(e) => report_error(&e),
        };
    }

    match text_report.finish() {
        Ok(_) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Failed to write report: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DesignOutput {
    order: usize,
    cutoff_hz: f64,
    sample_rate_hz: f64,
    dc_gain: f64,
    /// `[b0, b1, b2, a0, a1, a2]` per section
    sections: Vec<[f64; 6]>,
}

fn design(args: DesignArgs) -> i32 {
    let coeffs = match design_lowpass(args.order, args.cutoff, args.sample_rate) {
        Ok(coeffs) => coeffs,
        Err(e) => return report_error(&e),
    };

    let output = DesignOutput {
        order: coeffs.order(),
        cutoff_hz: args.cutoff,
        sample_rate_hz: args.sample_rate,
        dc_gain: coeffs.dc_gain(),
        sections: coeffs.rows(),
    };

    let json = if args.compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    };
    match json {
        Ok(json) => write_stdout(&json),
        Err(e) => report_error(&DenoiseError::from(e)),
    }
}

fn write_stdout(text: &str) -> i32 {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match handle
        .write_all(text.as_bytes())
        .and_then(|_| handle.write_all(b"\n"))
    {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Failed to write to stdout: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}
