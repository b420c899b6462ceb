//! Filtered-signal export as 32-bit float WAV

use std::path::{Path, PathBuf};

use hound::{WavSpec, WavWriter};

use crate::audio_clean::{Signal, StageResult};
use crate::error::Result;

/// Write `signal` as a mono IEEE-float WAV file.
pub fn write_wav(path: &Path, signal: &Signal) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: signal.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in signal.samples() {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;

    log::info!("Wrote {} samples to {:?}", signal.len(), path);
    Ok(())
}

/// Write each stage's output as `<stem>_<label>.wav` inside `dir`.
pub fn export_stages(dir: &Path, stem: &str, stages: &[StageResult]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(stages.len());
    for stage in stages {
        let filename = format!("{}_{}.wav", stem, stage.label.to_lowercase());
        let path = dir.join(filename);
        write_wav(&path, &stage.signal)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_wav_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let signal = Signal::new(vec![0.0, 0.5, -0.5, 0.25], 22050).unwrap();

        write_wav(&path, &signal).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn test_export_stages_names() {
        let dir = tempfile::tempdir().unwrap();
        let signal = Signal::new(vec![0.1; 8], 8000).unwrap();
        let stages = vec![StageResult {
            label: "STFT".to_string(),
            signal,
            duration: std::time::Duration::from_millis(3),
            attenuation_db: 1.0,
            noise_reduction_pct: 20.0,
        }];

        let written = export_stages(&dir.path().join("out"), "voice", &stages).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("voice_stft.wav"));
        assert!(written[0].exists());
    }
}
