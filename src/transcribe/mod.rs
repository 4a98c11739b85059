use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::audio::{AudioDecoder, FfmpegDecoder};
use crate::config::{self, RunConfig};
use crate::extractors::{self, AudioFetcher, YtDlpFetcher};
use crate::signals::CancelFlag;
use crate::{output, utils, Error, Result};

pub mod whisper;

pub use whisper::{Recognition, SpeechRecognizer, WhisperRecognizer};

/// A single timestamped span of recognized speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// 1-indexed position in the transcript.
    pub id: usize,

    /// Start time in seconds.
    pub start: f64,

    /// End time in seconds.
    pub end: f64,

    pub text: String,
}

impl Segment {
    /// Create a segment, clamping times so that `0 <= start <= end` holds.
    pub fn new(id: usize, start: f64, end: f64, text: impl Into<String>) -> Self {
        let start = start.max(0.0);
        Self {
            id,
            start,
            end: end.max(start),
            text: text.into(),
        }
    }
}

/// Metadata attached to a transcript once, read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub source: String,
    pub duration: Option<f64>,
    pub model: String,
    pub language: Option<String>,
}

/// A complete transcription result.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub segments: Vec<Segment>,
    pub metadata: Metadata,
}

impl Transcript {
    pub fn new(segments: Vec<Segment>, metadata: Metadata) -> Self {
        Self { segments, metadata }
    }

    pub fn to_txt(&self) -> String {
        output::formatters::format_txt(&self.segments)
    }

    pub fn to_json(&self) -> Result<String> {
        output::formatters::format_json(&self.segments, &self.metadata)
    }

    pub fn to_srt(&self) -> Result<String> {
        output::formatters::format_srt(&self.segments)
    }

    pub fn to_vtt(&self) -> Result<String> {
        output::formatters::format_vtt(&self.segments, &self.metadata)
    }
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub title: String,
    pub language: Option<String>,
    pub duration: Option<f64>,
    pub segment_count: usize,
    pub written: Vec<PathBuf>,
}

/// Sequences fetch, decode, recognition, and output for one run.
///
/// All intermediate files live in a [`TempDir`] owned by the pipeline, so
/// they are removed on every exit path (success, error, or cancellation)
/// when the pipeline drops.
pub struct TranscriptionPipeline {
    fetcher: Box<dyn AudioFetcher>,
    decoder: Box<dyn AudioDecoder>,
    recognizer: Box<dyn SpeechRecognizer>,
    temp_dir: TempDir,
    cancel: CancelFlag,
}

impl TranscriptionPipeline {
    /// Create a pipeline with the default external tools.
    pub fn new(cancel: CancelFlag) -> Result<Self> {
        Self::with_components(
            Box::new(YtDlpFetcher::new()),
            Box::new(FfmpegDecoder::new()),
            Box::new(WhisperRecognizer::new()),
            cancel,
        )
    }

    /// Create a pipeline from explicit components, used by tests to
    /// substitute doubles for the network and the recognizer.
    pub fn with_components(
        fetcher: Box<dyn AudioFetcher>,
        decoder: Box<dyn AudioDecoder>,
        recognizer: Box<dyn SpeechRecognizer>,
        cancel: CancelFlag,
    ) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        Ok(Self {
            fetcher,
            decoder,
            recognizer,
            temp_dir,
            cancel,
        })
    }

    /// Run the full transcription workflow.
    pub async fn run(&self, config: &RunConfig) -> Result<RunSummary> {
        let media = if config::is_url(&config.input) {
            self.checkpoint()?;
            tracing::info!("Downloading via {}: {}", self.fetcher.name(), config.input);
            self.fetcher
                .fetch(&config.input, self.temp_dir.path())
                .await?
        } else {
            extractors::resolve_local(&config.input)?
        };

        // Model weights must be in place before any audio work starts.
        self.checkpoint()?;
        self.recognizer.prepare(config.model).await?;

        self.checkpoint()?;
        tracing::info!("Decoding: {}", media.path.display());
        let pcm = self
            .decoder
            .decode(&media.path, self.temp_dir.path())
            .await?;

        self.checkpoint()?;
        tracing::info!(
            "Transcribing {:.1}s of audio with model '{}'",
            pcm.duration_secs(),
            config.model.name
        );
        let recognition = self.recognizer.transcribe(&pcm, config.model).await?;

        self.checkpoint()?;
        let metadata = Metadata {
            title: media.title.clone(),
            source: config.input.clone(),
            duration: media.duration.or(Some(pcm.duration_secs())),
            model: config.model.name.to_string(),
            language: recognition.language.clone(),
        };
        let transcript = Transcript::new(recognition.segments, metadata);

        let base_name = config
            .output
            .base_name
            .clone()
            .unwrap_or_else(|| utils::sanitize_filename(&media.title));

        let written = output::write_outputs(&transcript, &config.output, &base_name)?;

        // The downloaded audio is the only intermediate worth keeping; for
        // local inputs the source file already belongs to the user. Stdout
        // mode still honors --keep since only transcript files are skipped.
        if config.keep_audio && config::is_url(&config.input) {
            let dest = config.output.dir.join(format!("{}.mp3", base_name));
            fs_err::copy(&media.path, &dest)?;
            tracing::info!("Audio saved: {}", dest.display());
        }

        Ok(RunSummary {
            title: media.title,
            language: transcript.metadata.language.clone(),
            duration: transcript.metadata.duration,
            segment_count: transcript.segments.len(),
            written,
        })
    }

    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
