use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voxscribe::models;
use voxscribe::utils::format_duration;
use voxscribe::{Cli, Error, RunConfig, TranscriptionPipeline, WritePolicy};

#[tokio::main]
async fn main() {
    let code = run().await;
    std::process::exit(code);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.list_models {
        print_available_models();
        return 0;
    }

    let config = match RunConfig::from_args(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return e.exit_code();
        }
    };

    let cancel = voxscribe::signals::install();

    let pipeline = match TranscriptionPipeline::new(cancel) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            return e.exit_code();
        }
    };

    match pipeline.run(&config).await {
        Ok(summary) => {
            if config.output.policy != WritePolicy::Stdout {
                let duration = summary
                    .duration
                    .map(|d| format!(", {}", format_duration(d)))
                    .unwrap_or_default();
                let language = summary
                    .language
                    .as_deref()
                    .map(|l| format!(", language: {}", l))
                    .unwrap_or_default();
                println!(
                    "Transcribed '{}' ({} segments{}{})",
                    summary.title, summary.segment_count, duration, language
                );
                for path in &summary.written {
                    println!("  {}", path.display());
                }
            }
            0
        }
        Err(Error::Cancelled) => {
            tracing::info!("Run cancelled, intermediate files cleaned up");
            Error::Cancelled.exit_code()
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

/// Map -v counts onto an env-filter default; RUST_LOG still wins.
fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "voxscribe=info",
        1 => "voxscribe=debug",
        _ => "voxscribe=trace",
    };

    // Logs go to stderr so --stdout output stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn print_available_models() {
    println!("{}\n", style("Available Whisper models").bold());

    for (family, members) in models::families() {
        let mut heading = family.to_string();
        heading[..1].make_ascii_uppercase();
        println!("{}:", style(heading).cyan());

        for model in members {
            let languages = if model.english_only {
                "English only"
            } else {
                "multilingual"
            };
            println!("   {:<18} - {}", model.name, model.description);
            println!(
                "                      {} params, {} memory, {}",
                model.params, model.memory, languages
            );
        }
        println!();
    }

    println!("Examples:");
    println!("   voxscribe --model tiny video.mp4          # Fastest transcription");
    println!("   voxscribe --model small video.mp4         # Good balance (default)");
    println!("   voxscribe --model large-v3 video.mp4      # Best accuracy");
    println!("   voxscribe --model small.en audio.mp3      # English-only, faster");
}
