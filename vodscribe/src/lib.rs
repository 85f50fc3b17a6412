//! Media transcription pipeline — URL or file in, time-aligned transcript out.
//!
//! **vodscribe** coordinates three stages: acquiring source media and
//! metadata (via yt-dlp), invoking the WhisperX CLI across fallback
//! binary candidates, and formatting word-level timings into readable,
//! time-aligned segments for display and playback synchronization.
//!
//! # Quick start
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> vodscribe::Result<()> {
//! use vodscribe::{DownloadOptions, TranscribeOptions};
//!
//! // Transcribe a local media file
//! let outcome = vodscribe::transcribe_file(
//!     "meeting.mp4",
//!     &TranscribeOptions::new().formats(["srt", "txt"]),
//! )
//! .await?;
//! println!("{}", outcome.text);
//!
//! // Or from a URL (requires the "download" feature, enabled by default)
//! let outcome = vodscribe::transcribe_url(
//!     "https://example.com/video",
//!     &DownloadOptions::new("media"),
//!     &TranscribeOptions::new(),
//! )
//! .await?;
//! for segment in &outcome.segments {
//!     println!("[{} - {}] {}", segment.start_ms, segment.end_ms, segment.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Acquisition and invocation each block on one external process per
//! call; segment formatting and word lookup are pure. Concurrent
//! pipelines are safe as long as they use disjoint output
//! directories/stems — serializing same-stem runs is the caller's job.

#[cfg(feature = "download")]
pub mod acquire;
pub mod config;
pub mod error;
pub mod invoke;
pub mod segment;
pub mod track;
pub mod types;

pub use config::{DownloadOptions, TranscribeOptions};
pub use error::{Error, Result};
pub use invoke::{normalize_formats, OutputFormat, TranscriptionOutput};
pub use segment::{
    format_segments, format_transcript_preview, format_transcript_with_paragraphs,
    SegmentThresholds,
};
pub use track::{build_word_track_data_uri, find_active_word_index};
pub use types::{EngineTranscript, FormattedSegment, MediaInfo, TimedWord};

use std::path::Path;

use tracing::debug;

/// Outcome of a full pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Media metadata; present only for URL inputs.
    pub info: Option<MediaInfo>,
    /// Retained engine artifacts.
    pub output: TranscriptionOutput,
    /// Flattened word timings in milliseconds.
    pub words: Vec<TimedWord>,
    /// Formatted display segments.
    pub segments: Vec<FormattedSegment>,
    /// Full transcript text.
    pub text: String,
}

/// Transcribe a local media file: invoke the engine, parse its JSON
/// artifact, and format the word timings into display segments.
pub async fn transcribe_file(
    path: impl AsRef<Path>,
    options: &TranscribeOptions,
) -> Result<PipelineOutcome> {
    let path = path.as_ref();

    let output = invoke::transcribe(path, options).await?;
    let transcript = read_engine_transcript(&output)?;

    let words = transcript.words();
    let text = transcript.text();
    debug!(words = words.len(), "formatting segments");
    let segments = segment::format_segments(&words, &text);

    Ok(PipelineOutcome {
        info: None,
        output,
        words,
        segments,
        text,
    })
}

/// Transcribe from a URL: resolve the canonical id, download media and
/// metadata, then run the engine on the downloaded file.
///
/// The media file and its sidecar stay in `download_options.output_dir`
/// for the caller to persist or discard.
#[cfg(feature = "download")]
pub async fn transcribe_url(
    url: &str,
    download_options: &DownloadOptions,
    transcribe_options: &TranscribeOptions,
) -> Result<PipelineOutcome> {
    let id = acquire::resolve_id(url).await?;
    let acquisition = acquire::download(url, &id, download_options).await?;

    let mut outcome = transcribe_file(&acquisition.media_path, transcribe_options).await?;
    outcome.info = Some(acquisition.info);
    Ok(outcome)
}

/// Read the engine's JSON artifact out of the retained files.
fn read_engine_transcript(output: &TranscriptionOutput) -> Result<EngineTranscript> {
    let json_path = output
        .files
        .iter()
        .find(|path| path.extension().is_some_and(|ext| ext == "json"))
        .ok_or_else(|| Error::Transcription("engine produced no JSON artifact".into()))?;

    let raw = std::fs::read_to_string(json_path)?;
    Ok(serde_json::from_str(&raw)?)
}
