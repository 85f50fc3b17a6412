use std::path::PathBuf;

use clap::Parser;
use vodscribe::{DownloadOptions, TranscribeOptions};

#[derive(Parser)]
#[command(name = "vodscribe", about = "Transcribe media from URL or file into time-aligned segments")]
struct Cli {
    /// URL or local media file to transcribe.
    input: String,

    /// Whisper model name or path, passed to WhisperX verbatim.
    #[arg(short, long, default_value = "large-v2")]
    model: String,

    /// Language code for transcription.
    #[arg(short, long, default_value = "en")]
    language: String,

    /// Artifact formats to keep: json, txt, srt, vtt, tsv (json is always kept).
    #[arg(short, long, value_delimiter = ',', default_value = "json")]
    formats: Vec<String>,

    /// Directory for downloaded media and artifacts.
    #[arg(short = 'd', long, default_value = ".")]
    output_dir: PathBuf,

    /// Output stem for artifacts (defaults to the media id / input stem).
    #[arg(long)]
    stem: Option<String>,

    /// Download audio only instead of combined video+audio.
    #[arg(long)]
    audio_only: bool,

    /// yt-dlp format selector used with --audio-only.
    #[arg(long, default_value = "bestaudio/best")]
    audio_format: String,

    /// Overwrite existing downloads.
    #[arg(long)]
    force: bool,

    /// WhisperX executable to use instead of the built-in candidates.
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Print a short preview instead of the full transcript.
    #[arg(long)]
    preview: bool,

    /// Print the inline caption-track data URI for the word timings.
    #[arg(long)]
    word_track: bool,

    /// Write the transcript text to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vodscribe=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut transcribe_options = TranscribeOptions::new()
        .model(&cli.model)
        .language(&cli.language)
        .formats(cli.formats.iter().cloned());
    if let Some(stem) = &cli.stem {
        transcribe_options = transcribe_options.output_base(cli.output_dir.join(stem));
    }
    if let Some(engine) = cli.engine.clone() {
        transcribe_options = transcribe_options.engine_candidates(vec![engine]);
    }

    let is_url = cli.input.starts_with("http://") || cli.input.starts_with("https://");

    let result = if is_url {
        let download_options = DownloadOptions::new(&cli.output_dir)
            .download_video(!cli.audio_only)
            .format(&cli.audio_format)
            .force_overwrites(cli.force);
        vodscribe::transcribe_url(&cli.input, &download_options, &transcribe_options).await
    } else {
        vodscribe::transcribe_file(&cli.input, &transcribe_options).await
    };

    let outcome = match result {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    eprintln!(
        "Transcription complete: {} words, {} segments{}",
        outcome.words.len(),
        outcome.segments.len(),
        outcome
            .info
            .as_ref()
            .and_then(|i| i.title.as_deref())
            .map(|t| format!(", \"{t}\""))
            .unwrap_or_default(),
    );
    for file in &outcome.output.files {
        eprintln!("  kept {}", file.display());
    }

    let output_text = if cli.word_track {
        vodscribe::build_word_track_data_uri(&outcome.words)
    } else if cli.preview {
        vodscribe::format_transcript_preview(&outcome.text)
    } else {
        vodscribe::format_transcript_with_paragraphs(&outcome.words, &outcome.text)
    };

    match cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &output_text) {
                eprintln!("Error writing to {}: {e}", path.display());
                std::process::exit(1);
            }
            eprintln!("Written to {}", path.display());
        }
        None => println!("{output_text}"),
    }
}
