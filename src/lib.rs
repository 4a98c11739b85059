//! Voxscribe - A Rust CLI tool for transcribing media into text and subtitles
//!
//! This library provides functionality to download media from URLs, decode the
//! audio track, transcribe it with Whisper, and render the result as TXT, JSON,
//! SRT, or VTT.

use std::path::PathBuf;

pub mod audio;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod models;
pub mod output;
pub mod signals;
pub mod transcribe;
pub mod utils;

pub use cli::{Cli, OutputFormat};
pub use config::{OutputRequest, RunConfig, WritePolicy};
pub use transcribe::{Metadata, RunSummary, Segment, Transcript, TranscriptionPipeline};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the transcription workflow
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Input not found: {0}")]
    InputNotFound(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Unknown model: {0} (see --list-models)")]
    UnknownModel(String),

    #[error("Model download failed: {0}")]
    ModelDownload(String),

    #[error("Audio decode failed: {0}")]
    Decode(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("File already exists: {0} (use --overwrite to replace)")]
    FileExists(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Timestamp {0:.3}s exceeds the 99 hour subtitle limit")]
    TimestampOverflow(f64),

    #[error("Some output formats failed: {0}")]
    OutputFailed(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for this error, so shell callers can tell failure
    /// classes apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => 2,
            Error::InputNotFound(_) | Error::Download(_) => 3,
            Error::UnknownModel(_) => 4,
            Error::ModelDownload(_) => 5,
            Error::Decode(_) => 6,
            Error::Transcription(_) => 7,
            Error::FileExists(_) | Error::OutputFailed(_) => 8,
            Error::Cancelled => 130,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_class() {
        let errors = [
            Error::InvalidArgument("x".into()),
            Error::InputNotFound("x".into()),
            Error::UnknownModel("x".into()),
            Error::ModelDownload("x".into()),
            Error::Decode("x".into()),
            Error::Transcription("x".into()),
            Error::FileExists(PathBuf::from("x")),
        ];

        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn test_cancelled_uses_signal_convention() {
        assert_eq!(Error::Cancelled.exit_code(), 130);
    }
}
