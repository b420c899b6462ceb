//! Stage result sinks: a plain-text table and a JSON document

use std::io::Write;

use serde::Serialize;

use super::audio::AudioMetadata;
use crate::audio_clean::{ReportSink, StageResult};
use crate::error::Result;

/// Numbers from one stage, without the samples
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub label: String,
    pub samples: usize,
    pub sample_rate: u32,
    pub duration_ms: f64,
    pub attenuation_db: f64,
    pub noise_reduction_pct: f64,
    pub peak: f64,
    pub rms: f64,
}

impl From<&StageResult> for StageSummary {
    fn from(result: &StageResult) -> Self {
        Self {
            label: result.label.clone(),
            samples: result.signal.len(),
            sample_rate: result.signal.sample_rate(),
            duration_ms: result.duration.as_secs_f64() * 1000.0,
            attenuation_db: result.attenuation_db,
            noise_reduction_pct: result.noise_reduction_pct,
            peak: result.signal.peak(),
            rms: result.signal.rms(),
        }
    }
}

/// Writes one aligned text row per stage.
///
/// The first write error stops all further output and is returned by
/// [`ConsoleReport::finish`].
pub struct ConsoleReport<W: Write> {
    out: W,
    header_written: bool,
    error: Option<std::io::Error>,
}

impl<W: Write> ConsoleReport<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
            error: None,
        }
    }

    /// Flush and hand back the writer, or the first error hit while writing.
    pub fn finish(mut self) -> std::io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_row(&mut self, summary: &StageSummary) -> std::io::Result<()> {
        if !self.header_written {
            writeln!(
                self.out,
                "{:<6} {:>10} {:>16} {:>16}",
                "stage", "time (ms)", "attenuation (dB)", "reduction (%)"
            )?;
            self.header_written = true;
        }
        writeln!(
            self.out,
            "{:<6} {:>10.2} {:>16.2} {:>16.2}",
            summary.label, summary.duration_ms, summary.attenuation_db, summary.noise_reduction_pct
        )
    }
}

impl<W: Write> ReportSink for ConsoleReport<W> {
    fn accept(&mut self, result: &StageResult) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.write_row(&StageSummary::from(result)) {
            log::warn!("Failed to write report row: {}", e);
            self.error = Some(e);
        }
    }
}

/// Collects stage summaries into a timestamped JSON document
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    pub source: Option<String>,
    pub input: Option<AudioMetadata>,
    pub generated_at: String,
    pub stages: Vec<StageSummary>,
}

impl JsonReport {
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            input: None,
            generated_at: chrono::Utc::now().to_rfc3339(),
            stages: Vec::new(),
        }
    }

    /// Attach the decoded file's stream parameters
    pub fn with_input(mut self, metadata: AudioMetadata) -> Self {
        self.input = Some(metadata);
        self
    }

    pub fn to_json(&self, compact: bool) -> Result<String> {
        let json = if compact {
            serde_json::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        Ok(json)
    }
}

impl ReportSink for JsonReport {
    fn accept(&mut self, result: &StageResult) {
        self.stages.push(StageSummary::from(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_clean::Signal;
    use std::time::Duration;

    fn result(label: &str) -> StageResult {
        StageResult {
            label: label.to_string(),
            signal: Signal::new(vec![0.5, -0.5, 0.5, -0.5], 8000).unwrap(),
            duration: Duration::from_millis(12),
            attenuation_db: 6.02,
            noise_reduction_pct: 75.0,
        }
    }

    #[test]
    fn test_text_report_rows() {
        let mut report = ConsoleReport::new(Vec::new());
        report.accept(&result("STFT"));
        report.accept(&result("IIR"));

        let text = String::from_utf8(report.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("stage"));
        assert!(lines[1].starts_with("STFT"));
        assert!(lines[2].contains("75.00"));
    }

    /// Accepts `budget` bytes, then fails every write
    struct FailingWriter {
        budget: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.budget == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_report_keeps_write_error() {
        let mut report = ConsoleReport::new(FailingWriter { budget: 10 });
        report.accept(&result("STFT"));
        report.accept(&result("IIR"));

        let err = report.finish().err().unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_json_report() {
        let metadata = AudioMetadata {
            duration: 1.5,
            sample_rate: 8000,
            channels: 2,
            format: "WAV".to_string(),
        };
        let mut report = JsonReport::new(Some("voice.wav".to_string())).with_input(metadata);
        report.accept(&result("STFT"));

        let json = report.to_json(true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["source"], "voice.wav");
        assert_eq!(value["stages"][0]["label"], "STFT");
        assert_eq!(value["stages"][0]["samples"], 4);
        assert_eq!(value["stages"][0]["rms"], 0.5);
        assert_eq!(value["input"]["sampleRate"], 8000);
        assert_eq!(value["input"]["channels"], 2);
        assert!(value["generatedAt"].is_string());
    }
}
