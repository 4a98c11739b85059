use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::Result;

pub mod local;
pub mod youtube;

pub use local::resolve_local;
pub use youtube::YtDlpFetcher;

/// Audio acquired from a URL or local path, ready for decoding.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    /// Local path to the media file.
    pub path: PathBuf,

    /// Title from source metadata, or the file stem for local files.
    pub title: String,

    /// Duration in seconds if the source reported one.
    pub duration: Option<f64>,
}

/// External capability that turns a URL into a local audio file.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Download the media behind `url` into `dest_dir` and return its
    /// local path plus title metadata.
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<FetchedMedia>;

    /// Name of the tool or platform, for logs.
    fn name(&self) -> &'static str;
}
