//! WhisperX engine invocation.
//!
//! Locates the engine across an ordered candidate list, runs it with a
//! fixed inference argument set, then reconciles the generated artifacts
//! against the caller's requested format set.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::TranscribeOptions;
use crate::error::{CandidateFailure, CandidateFailures, Error, Result};

/// Environment variable naming the engine executable directly.
/// Takes precedence over every built-in candidate path.
pub const ENGINE_ENV: &str = "VODSCRIBE_WHISPERX";

/// Artifact formats the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputFormat {
    Json,
    Txt,
    Srt,
    Vtt,
    Tsv,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Json,
        OutputFormat::Txt,
        OutputFormat::Srt,
        OutputFormat::Vtt,
        OutputFormat::Tsv,
    ];

    /// File extension of this artifact format.
    pub fn ext(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Txt => "txt",
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
            OutputFormat::Tsv => "tsv",
        }
    }

    /// Parse a caller-supplied token, case-insensitively.
    /// "json-full" is an alias for "json".
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "json" | "json-full" => Some(OutputFormat::Json),
            "txt" => Some(OutputFormat::Txt),
            "srt" => Some(OutputFormat::Srt),
            "vtt" => Some(OutputFormat::Vtt),
            "tsv" => Some(OutputFormat::Tsv),
            _ => None,
        }
    }
}

/// Normalize a caller-requested format list: case-insensitive,
/// deduplicated, unknown tokens dropped, and "json" always included.
pub fn normalize_formats<S: AsRef<str>>(requested: &[S]) -> BTreeSet<OutputFormat> {
    let mut formats = BTreeSet::new();
    for token in requested {
        match OutputFormat::parse(token.as_ref()) {
            Some(format) => {
                formats.insert(format);
            }
            None => warn!(token = token.as_ref(), "ignoring unknown output format"),
        }
    }
    formats.insert(OutputFormat::Json);
    formats
}

/// Retained artifacts after reconciliation.
#[derive(Debug)]
pub struct TranscriptionOutput {
    /// Directory + stem the artifacts were renamed to.
    pub output_base: PathBuf,
    /// The retained artifact files, one per requested format the engine
    /// actually produced.
    pub files: Vec<PathBuf>,
}

/// Default engine candidates, tried strictly in order: the environment
/// override, the bare command on PATH, then two conventional
/// virtual-environment locations.
pub fn engine_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = std::env::var_os(ENGINE_ENV) {
        if !path.is_empty() {
            candidates.push(PathBuf::from(path));
        }
    }
    candidates.push(PathBuf::from("whisperx"));
    candidates.push(PathBuf::from(".venv/bin/whisperx"));
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".venv/bin/whisperx"));
    }
    candidates
}

/// Run the engine on a media file and reconcile its artifacts.
///
/// The engine is always invoked with `--output_format all`; the requested
/// format set only controls which artifacts are kept afterwards. Engine
/// output is named after the input file's stem and renamed to the
/// caller's output stem when the two differ.
pub async fn transcribe(media_path: &Path, options: &TranscribeOptions) -> Result<TranscriptionOutput> {
    let output_base = options.resolve_output_base(media_path);
    let output_dir = match output_base.parent() {
        Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
        Some(dir) => dir,
        None => Path::new("."),
    };
    let output_stem = output_base
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidOption(format!("output base has no stem: {}", output_base.display())))?
        .to_string();
    let input_stem = media_path
        .file_stem()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidOption(format!("media path has no stem: {}", media_path.display())))?
        .to_string();
    let media = media_path
        .to_str()
        .ok_or_else(|| Error::InvalidOption("media path contains invalid UTF-8".into()))?;
    let dir_arg = output_dir
        .to_str()
        .ok_or_else(|| Error::InvalidOption("output directory path contains invalid UTF-8".into()))?;

    std::fs::create_dir_all(output_dir)?;

    // Fixed inference arguments, independent of the requested formats.
    let args: Vec<String> = vec![
        media.into(),
        "--model".into(),
        options.model.clone(),
        "--language".into(),
        options.language.clone(),
        "--output_dir".into(),
        dir_arg.into(),
        "--output_format".into(),
        "all".into(),
        "--compute_type".into(),
        "int8".into(),
        "--batch_size".into(),
        "4".into(),
        "--vad_method".into(),
        "silero".into(),
        "--print_progress".into(),
        "True".into(),
    ];

    let candidates = options
        .engine_candidates
        .clone()
        .unwrap_or_else(engine_candidates);
    let engine = run_engine(&candidates, &args).await?;
    info!(
        engine = %engine.display(),
        media = %media_path.display(),
        "transcription complete"
    );

    let formats = normalize_formats(&options.formats);
    let files = reconcile_outputs(output_dir, &input_stem, &output_stem, &formats)?;

    Ok(TranscriptionOutput { output_base, files })
}

/// Try each candidate in order; the first clean exit wins and stops the
/// search. Every failure is recorded with its specific cause.
async fn run_engine(candidates: &[PathBuf], args: &[String]) -> Result<PathBuf> {
    let mut failures = Vec::new();

    for candidate in candidates {
        debug!(candidate = %candidate.display(), "attempting engine candidate");
        match tokio::process::Command::new(candidate).args(args).output().await {
            Err(e) => {
                debug!(candidate = %candidate.display(), error = %e, "candidate failed to start");
                failures.push((candidate.clone(), CandidateFailure::Startup(e)));
            }
            Ok(output) if output.status.success() => {
                return Ok(candidate.clone());
            }
            Ok(output) => {
                let stderr: String = String::from_utf8_lossy(&output.stderr)
                    .chars()
                    .take(1000)
                    .collect();
                debug!(
                    candidate = %candidate.display(),
                    code = output.status.code(),
                    "candidate exited non-zero"
                );
                failures.push((
                    candidate.clone(),
                    CandidateFailure::Exit {
                        code: output.status.code(),
                        stderr,
                    },
                ));
            }
        }
    }

    Err(Error::EngineExhausted(CandidateFailures(failures)))
}

/// Reconcile engine artifacts against the requested format set.
///
/// The engine names every artifact `<inputStem>.<ext>`. Requested
/// artifacts are renamed to `<outputStem>.<ext>` (overwriting any
/// pre-existing file) and retained; unrequested ones are deleted
/// best-effort. A format the engine did not emit is silently skipped.
fn reconcile_outputs(
    output_dir: &Path,
    input_stem: &str,
    output_stem: &str,
    formats: &BTreeSet<OutputFormat>,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for format in OutputFormat::ALL {
        let generated = output_dir.join(format!("{input_stem}.{}", format.ext()));
        if !generated.exists() {
            continue;
        }
        if formats.contains(&format) {
            let retained = if input_stem == output_stem {
                generated
            } else {
                let renamed = output_dir.join(format!("{output_stem}.{}", format.ext()));
                std::fs::rename(&generated, &renamed)?;
                renamed
            };
            debug!(path = %retained.display(), "retained artifact");
            files.push(retained);
        } else if let Err(e) = std::fs::remove_file(&generated) {
            warn!(
                path = %generated.display(),
                error = %e,
                "failed to remove unrequested artifact"
            );
        }
    }

    Ok(files)
}
