//! Audio decoding via ffmpeg.
//!
//! Whisper expects 16 kHz mono f32 PCM; ffmpeg does the demux/resample work
//! and we read the raw samples back from a temp file.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{Error, Result};

/// Sample rate required by the recognizer.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Decoded, resampled audio ready for recognition.
#[derive(Debug, Clone)]
pub struct PcmAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// External capability that turns a media file into normalized PCM.
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    async fn decode(&self, input: &Path, temp_dir: &Path) -> Result<PcmAudio>;
}

/// Decoder that shells out to ffmpeg.
pub struct FfmpegDecoder {
    ffmpeg_path: String,
}

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }

    /// Check that ffmpeg is runnable, with install hints on failure.
    async fn check_available(&self) -> Result<()> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => Ok(()),
            _ => Err(Error::Decode(
                "ffmpeg not found; install it (macOS: brew install ffmpeg, \
                 Debian/Ubuntu: apt install ffmpeg)"
                    .to_string(),
            )),
        }
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Arguments converting any input into raw f32le 16 kHz mono PCM.
pub fn ffmpeg_decode_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-f".to_string(),
        "f32le".to_string(),
        "-acodec".to_string(),
        "pcm_f32le".to_string(),
        "-ac".to_string(),
        "1".to_string(),
        "-ar".to_string(),
        WHISPER_SAMPLE_RATE.to_string(),
        "-y".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Parse little-endian f32 samples from raw PCM bytes.
pub fn parse_f32le(bytes: &[u8]) -> Vec<f32> {
    let mut samples = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        samples.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    samples
}

#[async_trait]
impl AudioDecoder for FfmpegDecoder {
    async fn decode(&self, input: &Path, temp_dir: &Path) -> Result<PcmAudio> {
        self.check_available().await?;

        let pcm_path = temp_dir.join("decoded.pcm");
        let args = ffmpeg_decode_args(input, &pcm_path);

        tracing::debug!("Decoding {} with ffmpeg", input.display());

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::Decode(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Decode(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }

        let bytes = fs_err::read(&pcm_path)?;
        let samples = parse_f32le(&bytes);

        if samples.is_empty() {
            return Err(Error::Decode(format!(
                "no audio stream decoded from {}",
                input.display()
            )));
        }

        Ok(PcmAudio {
            samples,
            sample_rate: WHISPER_SAMPLE_RATE,
        })
    }
}
