//! Speech recognition behind a swappable trait.
//!
//! The real engine is whisper.cpp via whisper-rs, compiled in with the
//! `whisper` feature. Builds without it fail at transcription time with a
//! clear message, which keeps test and CI builds free of the C++ toolchain.

use async_trait::async_trait;

use crate::audio::PcmAudio;
use crate::models::ModelSpec;
use crate::transcribe::Segment;
use crate::Result;

#[cfg(not(feature = "whisper"))]
use crate::Error;

/// Output of the recognizer: ordered segments plus detected language.
///
/// The language is metadata only; it never gates formatting behavior.
#[derive(Debug, Clone)]
pub struct Recognition {
    pub segments: Vec<Segment>,
    pub language: Option<String>,
}

/// External capability that turns PCM audio into timestamped text.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Fetch or load whatever the recognizer needs before audio work
    /// starts, so a missing model fails the run before decoding begins.
    async fn prepare(&self, _model: &'static ModelSpec) -> Result<()> {
        Ok(())
    }

    async fn transcribe(&self, audio: &PcmAudio, model: &'static ModelSpec) -> Result<Recognition>;
}

/// Recognizer backed by whisper.cpp.
///
/// `prepare` caches the model weights locally (downloading them if
/// absent) so the download happens before any audio work.
pub struct WhisperRecognizer;

impl WhisperRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WhisperRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    #[cfg(feature = "whisper")]
    async fn prepare(&self, model: &'static ModelSpec) -> Result<()> {
        crate::models::ensure_downloaded(model).await?;
        Ok(())
    }

    #[cfg(feature = "whisper")]
    async fn transcribe(&self, audio: &PcmAudio, model: &'static ModelSpec) -> Result<Recognition> {
        // Cache hit after prepare; still the source of truth for the path.
        let model_path = crate::models::ensure_downloaded(model).await?;

        // Whisper inference is CPU-bound and blocking.
        let samples = audio.samples.clone();
        tokio::task::spawn_blocking(move || engine::run(&samples, &model_path))
            .await
            .map_err(|e| crate::Error::Transcription(format!("inference task failed: {}", e)))?
    }

    #[cfg(not(feature = "whisper"))]
    async fn transcribe(
        &self,
        _audio: &PcmAudio,
        _model: &'static ModelSpec,
    ) -> Result<Recognition> {
        Err(Error::Transcription(
            "this build does not include the Whisper engine; rebuild with --features whisper"
                .to_string(),
        ))
    }
}

#[cfg(feature = "whisper")]
mod engine {
    use std::path::Path;
    use std::sync::Once;

    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    use super::Recognition;
    use crate::transcribe::Segment;
    use crate::{Error, Result};

    static LOG_HOOK: Once = Once::new();

    pub fn run(samples: &[f32], model_path: &Path) -> Result<Recognition> {
        // Route whisper.cpp's chatty stderr output through the logging
        // layer so the default log level keeps it quiet.
        LOG_HOOK.call_once(whisper_rs::install_logging_hooks);

        let path = model_path.to_string_lossy();
        let ctx = WhisperContext::new_with_params(&path, WhisperContextParameters::default())
            .map_err(|e| Error::Transcription(format!("failed to load model: {}", e)))?;

        let mut state = ctx
            .create_state()
            .map_err(|e| Error::Transcription(format!("failed to create state: {}", e)))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, samples)
            .map_err(|e| Error::Transcription(format!("inference failed: {}", e)))?;

        let num_segments = state.full_n_segments();

        let mut segments = Vec::with_capacity(num_segments as usize);
        for i in 0..num_segments {
            let segment = state
                .get_segment(i)
                .ok_or_else(|| Error::Transcription(format!("failed to read segment {}", i)))?;

            let text = segment
                .to_str()
                .map_err(|e| Error::Transcription(format!("failed to read segment {}: {}", i, e)))?;

            // Whisper reports time in centiseconds.
            let start = segment.start_timestamp() as f64 / 100.0;
            let end = segment.end_timestamp() as f64 / 100.0;

            segments.push(Segment::new(i as usize + 1, start, end, text.trim()));
        }

        let language =
            whisper_rs::get_lang_str(state.full_lang_id_from_state()).map(|s| s.to_string());

        Ok(Recognition { segments, language })
    }
}
