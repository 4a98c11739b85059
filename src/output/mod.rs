use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::config::{OutputRequest, WritePolicy};
use crate::transcribe::Transcript;
use crate::{Error, Result};

pub mod formatters;

/// Render a transcript into one format.
pub fn render(transcript: &Transcript, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Txt => Ok(transcript.to_txt()),
        OutputFormat::Json => transcript.to_json(),
        OutputFormat::Srt => transcript.to_srt(),
        OutputFormat::Vtt => transcript.to_vtt(),
    }
}

/// Write every requested format, or stream the single format to stdout.
///
/// File writes are independent: a failing format does not abort the rest,
/// and the error reported at the end lists the status of each failure
/// while successfully written files stay in place.
pub fn write_outputs(
    transcript: &Transcript,
    request: &OutputRequest,
    base_name: &str,
) -> Result<Vec<PathBuf>> {
    if request.policy == WritePolicy::Stdout {
        let format = request
            .formats
            .first()
            .ok_or_else(|| Error::InvalidArgument("no output format requested".to_string()))?;
        println!("{}", render(transcript, *format)?);
        return Ok(Vec::new());
    }

    let mut written = Vec::new();
    let mut failures: Vec<(OutputFormat, Error)> = Vec::new();

    for format in &request.formats {
        match write_one(transcript, request, base_name, *format) {
            Ok(path) => {
                tracing::info!("Saved: {}", path.display());
                written.push(path);
            }
            Err(e) => {
                tracing::error!("{} output failed: {}", format, e);
                failures.push((*format, e));
            }
        }
    }

    if failures.is_empty() {
        Ok(written)
    } else if written.is_empty() && failures.len() == 1 {
        Err(failures.swap_remove(0).1)
    } else {
        let detail = failures
            .iter()
            .map(|(f, e)| format!("{}: {}", f, e))
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::OutputFailed(detail))
    }
}

fn write_one(
    transcript: &Transcript,
    request: &OutputRequest,
    base_name: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    let content = render(transcript, format)?;
    let path = request
        .dir
        .join(format!("{}.{}", base_name, format.extension()));

    match overwrite_decision(request.policy, path.exists(), console::user_attended_stderr()) {
        OverwriteAction::Write => {}
        OverwriteAction::Prompt => {
            if !confirm_overwrite(&path) {
                return Err(Error::FileExists(path));
            }
        }
        OverwriteAction::Refuse => return Err(Error::FileExists(path)),
    }

    fs_err::write(&path, content)?;
    Ok(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverwriteAction {
    Write,
    Prompt,
    Refuse,
}

/// Decide how to treat the target path. Prompting is only allowed on an
/// attended terminal; otherwise an existing file is a hard error so
/// scripted runs never hang on a confirmation.
fn overwrite_decision(policy: WritePolicy, exists: bool, attended: bool) -> OverwriteAction {
    match (exists, policy) {
        (false, _) => OverwriteAction::Write,
        (true, WritePolicy::Overwrite) => OverwriteAction::Write,
        (true, WritePolicy::Fail) if attended => OverwriteAction::Prompt,
        (true, _) => OverwriteAction::Refuse,
    }
}

fn confirm_overwrite(path: &std::path::Path) -> bool {
    eprint!("File '{}' exists. Overwrite? [y/N] ", path.display());
    let mut response = String::new();
    if std::io::stdin().read_line(&mut response).is_err() {
        return false;
    }
    response.trim().eq_ignore_ascii_case("y")
}
