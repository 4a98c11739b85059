use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "voxscribe",
    about = "Transcribe media from URLs and local files into TXT, JSON, SRT, or VTT",
    version,
    long_about = "A CLI tool for transcribing audio from URLs and local media files. \
Audio is decoded with ffmpeg and transcribed locally with Whisper; the transcript \
can be rendered in several text and subtitle formats."
)]
pub struct Cli {
    /// URL or local media file path
    #[arg(value_name = "INPUT", required_unless_present = "list_models")]
    pub input: Option<String>,

    /// Output format(s), comma-separated
    #[arg(
        short,
        long = "format",
        value_enum,
        value_delimiter = ',',
        default_value = "txt"
    )]
    pub formats: Vec<OutputFormat>,

    /// Base name for output files (no extension)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output directory (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Keep the downloaded/converted audio file
    #[arg(short, long)]
    pub keep: bool,

    /// Whisper model to use
    #[arg(short, long, default_value = "small")]
    pub model: String,

    /// List available models and exit
    #[arg(long)]
    pub list_models: bool,

    /// Overwrite existing files without confirmation
    #[arg(long)]
    pub overwrite: bool,

    /// Write the single requested format to stdout, creating no files
    #[arg(long)]
    pub stdout: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Plain text with timestamps
    Txt,
    /// JSON with segments and metadata
    Json,
    /// SRT subtitle format
    Srt,
    /// WebVTT format
    Vtt,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
