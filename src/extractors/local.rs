use std::path::Path;

use super::FetchedMedia;
use crate::{Error, Result};

/// Resolve a local media file into a [`FetchedMedia`].
///
/// Fails with [`Error::InputNotFound`] before any decode work if the path
/// does not point at a readable file.
pub fn resolve_local(input: &str) -> Result<FetchedMedia> {
    let path = Path::new(input);

    if !path.exists() || !path.is_file() {
        return Err(Error::InputNotFound(input.to_string()));
    }

    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio")
        .to_string();

    Ok(FetchedMedia {
        path: path.to_path_buf(),
        title,
        duration: None,
    })
}
