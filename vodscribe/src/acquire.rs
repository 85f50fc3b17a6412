//! Source media acquisition via yt-dlp.
//!
//! Resolves canonical media ids and downloads media plus its metadata
//! sidecar. No retry here — retry policy belongs to the external
//! scheduler driving the pipeline.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::DownloadOptions;
use crate::error::{Error, Result};
use crate::types::MediaInfo;

/// Container extension assumed when the metadata does not carry one.
const DEFAULT_CONTAINER_EXT: &str = "mp4";

/// Everything produced by a successful download.
#[derive(Debug)]
pub struct Acquisition {
    /// Parsed metadata sidecar.
    pub info: MediaInfo,
    /// The full sidecar as raw JSON, for fields `MediaInfo` drops.
    pub info_json: Value,
    /// `<outputDir>/<id>.<ext>`
    pub media_path: PathBuf,
    /// `<outputDir>/<id>.info.json`
    pub info_json_path: PathBuf,
}

/// Validate that a string looks like a URL.
/// Rejects anything that isn't http:// or https://.
fn validate_url(url: &str) -> Result<()> {
    let trimmed = url.trim();
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        Ok(())
    } else {
        Err(Error::Acquisition(format!(
            "invalid URL (must start with http:// or https://): {trimmed}"
        )))
    }
}

async fn yt_dlp<I, S>(args: I) -> Result<std::process::Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    tokio::process::Command::new("yt-dlp")
        .args(args)
        .output()
        .await
        .map_err(|_| Error::YtDlpNotFound)
}

fn truncated_stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr)
        .chars()
        .take(1000)
        .collect()
}

/// Resolve the canonical media id for a URL.
///
/// The tool may emit warnings on earlier stdout lines, so the id is the
/// last non-empty line.
pub async fn resolve_id(url: &str) -> Result<String> {
    validate_url(url)?;

    debug!(%url, "resolving media id");
    let output = yt_dlp(["--no-playlist", "--skip-download", "--print", "%(id)s", url]).await?;

    if !output.status.success() {
        return Err(Error::Acquisition(format!(
            "yt-dlp failed resolving id: {}",
            truncated_stderr(&output)
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    last_non_empty_line(&stdout)
        .map(str::to_string)
        .ok_or_else(|| Error::Acquisition("id resolution produced no output".into()))
}

fn last_non_empty_line(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
}

/// Download media and its metadata sidecar into the output directory.
///
/// `id` must be the canonical id previously resolved for `url`: it is the
/// stem of both the media file and the `<id>.info.json` sidecar.
///
/// # Security
/// - URL is validated to start with http:// or https://
/// - Arguments are passed to yt-dlp via `.arg()` (no shell expansion)
pub async fn download(url: &str, id: &str, options: &DownloadOptions) -> Result<Acquisition> {
    validate_url(url)?;

    info!(%url, id, "downloading media");
    std::fs::create_dir_all(&options.output_dir)?;

    let output_template = options
        .output_dir
        .join("%(id)s.%(ext)s")
        .to_str()
        .ok_or_else(|| Error::Acquisition("output directory path contains invalid UTF-8".into()))?
        .to_string();

    let mut args: Vec<String> = vec![
        "--no-playlist".into(),
        "--write-info-json".into(),
        "-o".into(),
        output_template,
    ];
    if options.force_overwrites {
        args.push("--force-overwrites".into());
    }
    args.push("-f".into());
    args.push(options.selector_arg());
    args.push(url.into());

    let output = yt_dlp(&args).await?;
    if !output.status.success() {
        return Err(Error::Acquisition(format!(
            "yt-dlp failed: {}",
            truncated_stderr(&output)
        )));
    }

    let info_json_path = options.output_dir.join(format!("{id}.info.json"));
    let raw = std::fs::read_to_string(&info_json_path).map_err(|e| {
        Error::Metadata(format!(
            "cannot read metadata sidecar {}: {e}",
            info_json_path.display()
        ))
    })?;
    let info_json: Value = serde_json::from_str(&raw)
        .map_err(|e| Error::Metadata(format!("malformed metadata sidecar: {e}")))?;
    let info = parse_media_info(&info_json)?;

    let ext = info.ext.as_deref().unwrap_or(DEFAULT_CONTAINER_EXT);
    let media_path = options.output_dir.join(format!("{}.{ext}", info.id));
    debug!(path = %media_path.display(), "media downloaded");

    Ok(Acquisition {
        info,
        info_json,
        media_path,
        info_json_path,
    })
}

fn parse_media_info(value: &Value) -> Result<MediaInfo> {
    match value.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => {}
        _ => return Err(Error::Metadata("metadata sidecar is missing the id field".into())),
    }
    serde_json::from_value(value.clone())
        .map_err(|e| Error::Metadata(format!("metadata sidecar: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- URL validation ---

    #[test]
    fn test_validate_url_https() {
        assert!(validate_url("https://youtube.com/watch?v=abc").is_ok());
    }

    #[test]
    fn test_validate_url_http() {
        assert!(validate_url("http://example.com/video.mp4").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_no_scheme() {
        assert!(validate_url("youtube.com/watch?v=abc").is_err());
    }

    #[test]
    fn test_validate_url_rejects_file_scheme() {
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_validate_url_rejects_empty() {
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_validate_url_rejects_command() {
        assert!(validate_url("$(whoami)").is_err());
    }

    // --- Id extraction ---

    #[test]
    fn test_last_non_empty_line_skips_warnings() {
        let stdout = "WARNING: skipping fragment\n\ndQw4w9WgXcQ\n";
        assert_eq!(last_non_empty_line(stdout), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_last_non_empty_line_trims() {
        assert_eq!(last_non_empty_line("  abc123  \n\n"), Some("abc123"));
    }

    #[test]
    fn test_last_non_empty_line_empty_output() {
        assert_eq!(last_non_empty_line(""), None);
        assert_eq!(last_non_empty_line("\n  \n"), None);
    }

    // --- Metadata parsing ---

    #[test]
    fn test_parse_media_info_complete() {
        let value: Value = serde_json::from_str(
            r#"{"id": "abc123", "title": "Test", "uploader": "someone",
                "duration": 63.5, "ext": "webm",
                "chapters": [{"title": "Intro", "start_time": 0.0, "end_time": 10.0}]}"#,
        )
        .unwrap();
        let info = parse_media_info(&value).unwrap();
        assert_eq!(info.id, "abc123");
        assert_eq!(info.duration, Some(63.5));
        assert_eq!(info.chapters.as_ref().map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_parse_media_info_missing_id() {
        let value: Value = serde_json::from_str(r#"{"title": "No id here"}"#).unwrap();
        let err = parse_media_info(&value).unwrap_err();
        assert!(matches!(err, Error::Metadata(_)));
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn test_parse_media_info_empty_id() {
        let value: Value = serde_json::from_str(r#"{"id": ""}"#).unwrap();
        assert!(parse_media_info(&value).is_err());
    }

    #[test]
    fn test_parse_media_info_non_string_id() {
        let value: Value = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert!(parse_media_info(&value).is_err());
    }
}
