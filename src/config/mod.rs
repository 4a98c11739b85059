use std::path::PathBuf;

use url::Url;

use crate::cli::{Cli, OutputFormat};
use crate::models::{self, ModelSpec};
use crate::{Error, Result};

/// How to treat an output path that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Refuse to replace existing files unless the user confirms interactively.
    Fail,
    /// Replace existing files without asking.
    Overwrite,
    /// Write the single format to stdout, touching no files.
    Stdout,
}

/// Where and how rendered output should be written.
#[derive(Debug, Clone)]
pub struct OutputRequest {
    /// Base name for output files; falls back to the media title.
    pub base_name: Option<String>,

    /// Target directory, created on demand.
    pub dir: PathBuf,

    /// Requested formats, deduplicated, in request order.
    pub formats: Vec<OutputFormat>,

    pub policy: WritePolicy,
}

/// Validated configuration for one transcription run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: String,
    pub model: &'static ModelSpec,
    pub keep_audio: bool,
    pub output: OutputRequest,
}

impl RunConfig {
    /// Build a validated run configuration from parsed CLI arguments.
    ///
    /// All user-input errors (unknown model, multiple formats with --stdout)
    /// surface here, before any download or decode work starts.
    pub fn from_args(cli: &Cli) -> Result<Self> {
        let formats = dedup_formats(&cli.formats);

        if cli.stdout && formats.len() > 1 {
            return Err(Error::InvalidArgument(
                "--stdout accepts exactly one output format".to_string(),
            ));
        }

        let model = models::resolve(&cli.model)?;

        let policy = if cli.stdout {
            WritePolicy::Stdout
        } else if cli.overwrite {
            WritePolicy::Overwrite
        } else {
            WritePolicy::Fail
        };

        let output = OutputRequest {
            base_name: cli.name.as_deref().map(strip_format_extension),
            dir: resolve_output_dir(cli.output.as_deref())?,
            formats,
            policy,
        };

        Ok(Self {
            input: cli.input.clone().unwrap_or_default(),
            model,
            keep_audio: cli.keep,
            output,
        })
    }
}

/// Remove duplicate formats while preserving request order.
pub fn dedup_formats(formats: &[OutputFormat]) -> Vec<OutputFormat> {
    let mut seen = Vec::with_capacity(formats.len());
    for format in formats {
        if !seen.contains(format) {
            seen.push(*format);
        }
    }
    seen
}

/// Resolve the output directory, expanding ~ and creating it if needed.
pub fn resolve_output_dir(output: Option<&str>) -> Result<PathBuf> {
    let path = match output {
        Some(p) => expand_tilde(p),
        None => std::env::current_dir()?,
    };

    if !path.exists() {
        fs_err::create_dir_all(&path)?;
    }

    Ok(path)
}

/// Expand a leading ~/ to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Strip a trailing output-format extension from a user-provided base name,
/// so `-n talk.txt -f txt` does not produce `talk.txt.txt`.
pub fn strip_format_extension(name: &str) -> String {
    for ext in [".txt", ".json", ".srt", ".vtt"] {
        if let Some(stripped) = name.strip_suffix(ext) {
            return stripped.to_string();
        }
    }
    name.to_string()
}

/// True if the input should be acquired from the network.
pub fn is_url(input: &str) -> bool {
    Url::parse(input)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_from_args_defaults() {
        let config = RunConfig::from_args(&cli(&["voxscribe", "talk.mp3"])).unwrap();
        assert_eq!(config.input, "talk.mp3");
        assert_eq!(config.model.name, "small");
        assert!(!config.keep_audio);
        assert_eq!(config.output.formats, vec![OutputFormat::Txt]);
        assert_eq!(config.output.policy, WritePolicy::Fail);
        assert!(config.output.base_name.is_none());
    }

    #[test]
    fn test_from_args_stdout_single_format() {
        let config =
            RunConfig::from_args(&cli(&["voxscribe", "talk.mp3", "--stdout", "-f", "json"]))
                .unwrap();
        assert_eq!(config.output.policy, WritePolicy::Stdout);
        assert_eq!(config.output.formats, vec![OutputFormat::Json]);
    }

    #[test]
    fn test_from_args_stdout_multiple_formats_rejected() {
        let result =
            RunConfig::from_args(&cli(&["voxscribe", "talk.mp3", "--stdout", "-f", "json,srt"]));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_from_args_stdout_duplicate_format_allowed() {
        // txt,txt deduplicates to one format, which stdout mode accepts
        let config =
            RunConfig::from_args(&cli(&["voxscribe", "talk.mp3", "--stdout", "-f", "txt,txt"]))
                .unwrap();
        assert_eq!(config.output.formats, vec![OutputFormat::Txt]);
    }

    #[test]
    fn test_from_args_unknown_model() {
        let result = RunConfig::from_args(&cli(&["voxscribe", "talk.mp3", "--model", "huge"]));
        assert!(matches!(result, Err(Error::UnknownModel(_))));
    }

    #[test]
    fn test_from_args_overwrite_policy() {
        let config =
            RunConfig::from_args(&cli(&["voxscribe", "talk.mp3", "--overwrite"])).unwrap();
        assert_eq!(config.output.policy, WritePolicy::Overwrite);
    }

    #[test]
    fn test_dedup_formats_preserves_order() {
        let formats = vec![
            OutputFormat::Srt,
            OutputFormat::Txt,
            OutputFormat::Srt,
            OutputFormat::Json,
            OutputFormat::Txt,
        ];
        assert_eq!(
            dedup_formats(&formats),
            vec![OutputFormat::Srt, OutputFormat::Txt, OutputFormat::Json]
        );
    }

    #[test]
    fn test_strip_format_extension() {
        assert_eq!(strip_format_extension("talk.txt"), "talk");
        assert_eq!(strip_format_extension("talk.srt"), "talk");
        assert_eq!(strip_format_extension("talk"), "talk");
        assert_eq!(strip_format_extension("talk.mp3"), "talk.mp3");
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/captures");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/video.mp4"));
        assert!(is_url("http://localhost:8080/file.mp3"));
        assert!(!is_url("ftp://example.com/file.mp3"));
        assert!(!is_url("/local/path/file.mp3"));
        assert!(!is_url("file.mp3"));
    }

    #[test]
    fn test_resolve_output_dir_creates_missing() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a/b");
        let resolved = resolve_output_dir(Some(nested.to_str().unwrap())).unwrap();
        assert!(resolved.exists());
    }
}
