use std::fmt;
use std::path::PathBuf;

/// All errors that can occur in vodscribe.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[cfg(feature = "download")]
    #[error("acquisition failed: {0}")]
    Acquisition(String),

    #[cfg(feature = "download")]
    #[error("yt-dlp not found — install with: pip install yt-dlp")]
    YtDlpNotFound,

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("transcription engine unavailable, tried:\n{0}")]
    EngineExhausted(CandidateFailures),

    #[error("transcription error: {0}")]
    Transcription(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single engine candidate was rejected.
#[derive(Debug)]
pub enum CandidateFailure {
    /// The executable could not be launched at all.
    Startup(std::io::Error),
    /// The process ran and exited non-zero.
    Exit { code: Option<i32>, stderr: String },
}

/// Every attempted engine candidate paired with its specific failure.
#[derive(Debug)]
pub struct CandidateFailures(pub Vec<(PathBuf, CandidateFailure)>);

impl fmt::Display for CandidateFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, failure)) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match failure {
                CandidateFailure::Startup(e) => {
                    write!(f, "  {}: failed to start: {e}", path.display())?;
                }
                CandidateFailure::Exit { code: Some(code), stderr } if !stderr.is_empty() => {
                    write!(f, "  {}: exit code {code}: {stderr}", path.display())?;
                }
                CandidateFailure::Exit { code: Some(code), .. } => {
                    write!(f, "  {}: exit code {code}", path.display())?;
                }
                CandidateFailure::Exit { code: None, .. } => {
                    write!(f, "  {}: terminated by signal", path.display())?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_metadata() {
        let e = Error::Metadata("sidecar missing".into());
        assert_eq!(e.to_string(), "metadata error: sidecar missing");
    }

    #[cfg(feature = "download")]
    #[test]
    fn test_error_display_acquisition() {
        let e = Error::Acquisition("yt-dlp failed".into());
        assert_eq!(e.to_string(), "acquisition failed: yt-dlp failed");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<String>("invalid json").unwrap_err();
        let e: Error = json_err.into();
        assert!(matches!(e, Error::Json(_)));
    }

    #[test]
    fn test_candidate_failures_lists_every_candidate() {
        let failures = CandidateFailures(vec![
            (
                PathBuf::from("/opt/whisperx"),
                CandidateFailure::Startup(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such file",
                )),
            ),
            (
                PathBuf::from("whisperx"),
                CandidateFailure::Exit {
                    code: Some(2),
                    stderr: "bad args".into(),
                },
            ),
        ]);
        let e = Error::EngineExhausted(failures);
        let msg = e.to_string();
        assert!(msg.contains("/opt/whisperx"));
        assert!(msg.contains("failed to start"));
        assert!(msg.contains("exit code 2: bad args"));
    }

    #[test]
    fn test_candidate_failure_signal_display() {
        let failures = CandidateFailures(vec![(
            PathBuf::from("whisperx"),
            CandidateFailure::Exit {
                code: None,
                stderr: String::new(),
            },
        )]);
        assert!(failures.to_string().contains("terminated by signal"));
    }
}
