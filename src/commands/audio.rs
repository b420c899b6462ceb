//! Audio decoding collaborator: any symphonia-supported file to a mono `Signal`

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio_clean::Signal;
use crate::error::{DenoiseError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMetadata {
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: u32,
    pub format: String,
}

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DenoiseError::Decode(format!("Failed to probe format: {}", e)))?;

    Ok(probed.format)
}

/// Read stream parameters without decoding any audio
pub fn probe_metadata(path: &Path) -> Result<AudioMetadata> {
    let format = open_format(path)?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| DenoiseError::Decode("No audio tracks found".to_string()))?;

    let codec_params = &track.codec_params;
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| DenoiseError::Decode("Stream has no sample rate".to_string()))?;
    let channels = codec_params.channels.map(|c| c.count() as u32).unwrap_or(1);

    let duration = codec_params
        .n_frames
        .map(|n| n as f64 / sample_rate as f64)
        .unwrap_or(0.0);

    let format_name = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("unknown")
        .to_uppercase();

    Ok(AudioMetadata {
        duration,
        sample_rate,
        channels,
        format: format_name,
    })
}

/// Decode the whole file, averaging channels down to mono.
pub fn load_mono(path: &Path) -> Result<Signal> {
    let mut format = open_format(path)?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| DenoiseError::Decode("No audio tracks found".to_string()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| DenoiseError::Decode("Stream has no sample rate".to_string()))?;
    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(1);
    let n_frames = track.codec_params.n_frames.unwrap_or(0) as usize;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DenoiseError::Decode(format!("Failed to create decoder: {}", e)))?;

    let mut mono_samples: Vec<f32> = Vec::with_capacity(n_frames);
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(DenoiseError::Decode(format!("Error reading packet: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(_)) => {
                skipped_packets += 1;
                continue;
            }
            Err(e) => return Err(DenoiseError::Decode(format!("Decode error: {}", e))),
        };

        let spec = *decoded.spec();
        let duration = decoded.capacity() as u64;

        let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(decoded);

        // Mix to mono
        let frame_channels = spec.channels.count().max(1);
        for chunk in sample_buf.samples().chunks(frame_channels) {
            mono_samples.push(chunk.iter().sum::<f32>() / frame_channels as f32);
        }
    }

    if skipped_packets > 0 {
        log::warn!("Skipped {} undecodable packets in {:?}", skipped_packets, path);
    }
    log::info!(
        "Loaded {:?}: {} frames, {} Hz, {} channel(s) mixed to mono",
        path,
        mono_samples.len(),
        sample_rate,
        channels
    );

    Signal::from_f32(&mono_samples, sample_rate)
}
