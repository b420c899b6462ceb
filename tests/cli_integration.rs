use std::f64::consts::PI;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn analyzer() -> Command {
    Command::cargo_bin("denoise-analyzer").unwrap()
}

fn write_test_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..16000 {
        let t = i as f64 / 16000.0;
        let s = 0.3 * (2.0 * PI * 440.0 * t).sin() + 0.2 * (2.0 * PI * 3000.0 * t).sin();
        writer.write_sample((s * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_help() {
    analyzer()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_help_flag() {
    analyzer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("design"));
}

// =============================================================================
// DESIGN SUBCOMMAND
// =============================================================================

#[test]
fn test_design_prints_sections() {
    let output = analyzer()
        .args(["design", "--order", "5", "--cutoff", "1000", "--compact"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["order"], 5);
    assert_eq!(value["sections"].as_array().unwrap().len(), 3);
    assert_eq!(value["sections"][0].as_array().unwrap().len(), 6);
}

#[test]
fn test_design_rejects_cutoff_above_nyquist() {
    analyzer()
        .args(["design", "--cutoff", "9000", "--sample-rate", "16000"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cutoff_hz"));
}

// =============================================================================
// ANALYZE SUBCOMMAND
// =============================================================================

#[test]
fn test_analyze_prints_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mix.wav");
    write_test_wav(&input);

    analyzer()
        .args(["analyze", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("STFT"))
        .stdout(predicate::str::contains("IIR"));
}

#[test]
fn test_analyze_json_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mix.wav");
    let out_dir = dir.path().join("out");
    let saved = dir.path().join("options.json");
    write_test_wav(&input);

    let output = analyzer()
        .args(["analyze", "--json", "--compact", "--iir-cutoff", "1500", "--input"])
        .arg(&input)
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--save-config")
        .arg(&saved)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stages = value["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0]["label"], "STFT");
    assert_eq!(stages[1]["samples"], 16000);
    assert_eq!(value["input"]["sampleRate"], 16000);
    assert_eq!(value["input"]["channels"], 1);
    assert_eq!(value["input"]["format"], "WAV");

    assert!(out_dir.join("mix_stft.wav").exists());
    assert!(out_dir.join("mix_iir.wav").exists());

    let options: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(options["iirCutoffHz"], 1500.0);
}

#[test]
fn test_analyze_rejects_cutoff_for_sample_rate() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mix.wav");
    write_test_wav(&input);

    analyzer()
        .args(["analyze", "--stft-cutoff", "8000", "--input"])
        .arg(&input)
        .assert()
        .code(2);
}

#[test]
fn test_analyze_missing_file() {
    analyzer()
        .args(["analyze", "--input", "/nonexistent/input.wav"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}
