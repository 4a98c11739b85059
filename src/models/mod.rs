//! Whisper model registry.
//!
//! A static table of known models plus on-demand download into the local
//! cache directory. Downloads are atomic: bytes stream into a temp file in
//! the cache directory which is only renamed into place on success.

use std::io::Write;
use std::path::PathBuf;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{Error, Result};

/// A known Whisper model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Approximate parameter count, e.g. "244M".
    pub params: &'static str,
    /// Approximate memory requirement, e.g. "~2GB".
    pub memory: &'static str,
    pub english_only: bool,
}

impl ModelSpec {
    /// File name of the ggml weights in the cache directory.
    pub fn file_name(&self) -> String {
        format!("ggml-{}.bin", self.name)
    }

    /// Upstream URL for the ggml weights.
    pub fn download_url(&self) -> String {
        format!(
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-{}.bin",
            self.name
        )
    }

    /// Local cache path, whether or not the file exists yet.
    pub fn cache_path(&self) -> Result<PathBuf> {
        Ok(models_dir()?.join(self.file_name()))
    }
}

/// All models voxscribe knows how to fetch.
pub const AVAILABLE_MODELS: &[ModelSpec] = &[
    ModelSpec {
        name: "tiny",
        description: "Fastest model, 39M parameters",
        params: "39M",
        memory: "~1GB",
        english_only: false,
    },
    ModelSpec {
        name: "tiny.en",
        description: "English-only tiny model",
        params: "39M",
        memory: "~1GB",
        english_only: true,
    },
    ModelSpec {
        name: "base",
        description: "Smaller balanced model, 74M parameters",
        params: "74M",
        memory: "~1GB",
        english_only: false,
    },
    ModelSpec {
        name: "base.en",
        description: "English-only base model",
        params: "74M",
        memory: "~1GB",
        english_only: true,
    },
    ModelSpec {
        name: "small",
        description: "Default balanced model, 244M parameters",
        params: "244M",
        memory: "~2GB",
        english_only: false,
    },
    ModelSpec {
        name: "small.en",
        description: "English-only small model",
        params: "244M",
        memory: "~2GB",
        english_only: true,
    },
    ModelSpec {
        name: "medium",
        description: "Good accuracy model, 769M parameters",
        params: "769M",
        memory: "~5GB",
        english_only: false,
    },
    ModelSpec {
        name: "medium.en",
        description: "English-only medium model",
        params: "769M",
        memory: "~5GB",
        english_only: true,
    },
    ModelSpec {
        name: "large-v2",
        description: "Improved large model, 1550M parameters",
        params: "1550M",
        memory: "~10GB",
        english_only: false,
    },
    ModelSpec {
        name: "large-v3",
        description: "Latest large model, 1550M parameters",
        params: "1550M",
        memory: "~10GB",
        english_only: false,
    },
];

/// Resolve a model name to its registry entry.
///
/// The bare name "large" normalizes to "large-v3". Unknown names fail
/// without touching the network or the filesystem.
pub fn resolve(name: &str) -> Result<&'static ModelSpec> {
    let normalized = if name == "large" { "large-v3" } else { name };

    AVAILABLE_MODELS
        .iter()
        .find(|m| m.name == normalized)
        .ok_or_else(|| Error::UnknownModel(name.to_string()))
}

/// All known model specs, regardless of local download state.
pub fn list() -> &'static [ModelSpec] {
    AVAILABLE_MODELS
}

/// Registry entries grouped by family (tiny, base, ...) in table order,
/// so listings stay in sync with the registry itself.
pub fn families() -> Vec<(&'static str, Vec<&'static ModelSpec>)> {
    let mut groups: Vec<(&'static str, Vec<&'static ModelSpec>)> = Vec::new();
    for model in AVAILABLE_MODELS {
        let family = family_of(model.name);
        match groups.last_mut() {
            Some((name, members)) if *name == family => members.push(model),
            _ => groups.push((family, vec![model])),
        }
    }
    groups
}

/// Family name: strip the `.en` suffix and any `-vN` revision.
fn family_of(name: &'static str) -> &'static str {
    let base = name.split('.').next().unwrap_or(name);
    base.split('-').next().unwrap_or(base)
}

/// Directory where model weights are cached, created on first use.
pub fn models_dir() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .ok_or_else(|| {
            Error::ModelDownload("could not determine local data directory".to_string())
        })?
        .join("voxscribe")
        .join("models");

    if !dir.exists() {
        fs_err::create_dir_all(&dir)?;
    }

    Ok(dir)
}

/// Return the cached path for a model, downloading it first if absent.
pub async fn ensure_downloaded(spec: &ModelSpec) -> Result<PathBuf> {
    let path = spec.cache_path()?;
    if path.exists() {
        tracing::debug!("Model '{}' already cached at {}", spec.name, path.display());
        return Ok(path);
    }

    let url = spec.download_url();
    tracing::info!("Downloading model '{}' from {}", spec.name, url);

    let response = reqwest::get(&url)
        .await
        .map_err(|e| Error::ModelDownload(format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(Error::ModelDownload(format!(
            "HTTP {} fetching {}",
            response.status(),
            url
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    let progress = ProgressBar::new(total_size);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.set_message(format!("Downloading model '{}'", spec.name));

    // Stream into a temp file in the same directory; dropped on any error
    // so a failed download never leaves a partial model behind.
    let dir = models_dir()?;
    let mut temp = tempfile::NamedTempFile::new_in(&dir)?;

    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::ModelDownload(format!("read failed: {}", e)))?;
        temp.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        progress.set_position(downloaded);
    }
    temp.flush()?;

    temp.persist(&path)
        .map_err(|e| Error::ModelDownload(format!("could not store model: {}", e)))?;

    progress.finish_with_message(format!("Model '{}' ready", spec.name));
    tracing::info!("Model saved: {}", path.display());

    Ok(path)
}
