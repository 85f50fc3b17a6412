use serde::{Deserialize, Serialize};

/// A single transcript word with millisecond timing.
///
/// This is the persisted unit: the engine's second-scale word timings are
/// converted to milliseconds once, and everything downstream (segment
/// formatting, playback lookup, caption tracks) works on this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    pub text: String,
    pub start_ms: f64,
    pub end_ms: f64,
}

/// Final caption/paragraph unit with millisecond-rounded boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedSegment {
    pub id: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

/// Chapter marker from the downloader metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub title: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
}

/// Metadata sidecar written by yt-dlp (`<id>.info.json`).
///
/// Only the fields the pipeline cares about; yt-dlp writes many more,
/// which are kept available as raw JSON alongside this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub duration: Option<f64>,
    pub upload_date: Option<String>,
    pub timestamp: Option<i64>,
    pub chapters: Option<Vec<Chapter>>,
    /// Container extension of the downloaded media file.
    pub ext: Option<String>,
}

/// A word as the engine writes it in its JSON artifact.
///
/// Timing is optional: alignment can fail for individual words, in which
/// case the engine emits the word without start/end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineWord {
    pub word: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub score: Option<f64>,
}

/// A sentence-level segment from the engine's JSON artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSegment {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub text: String,
    #[serde(default)]
    pub words: Vec<EngineWord>,
}

/// The engine's word-timed JSON artifact (`<stem>.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineTranscript {
    #[serde(default)]
    pub segments: Vec<EngineSegment>,
    pub language: Option<String>,
}

impl EngineTranscript {
    /// Flatten all aligned words into millisecond-scale `TimedWord`s.
    /// Words the engine could not align (no start/end) are skipped.
    pub fn words(&self) -> Vec<TimedWord> {
        self.segments
            .iter()
            .flat_map(|segment| &segment.words)
            .filter_map(|word| {
                let start = word.start?;
                let end = word.end?;
                let text = word.word.trim();
                if text.is_empty() {
                    return None;
                }
                Some(TimedWord {
                    text: text.to_string(),
                    start_ms: start * 1000.0,
                    end_ms: end * 1000.0,
                })
            })
            .collect()
    }

    /// Full text (all segments concatenated).
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transcript() -> EngineTranscript {
        serde_json::from_str(
            r#"{
                "segments": [
                    {
                        "start": 0.0,
                        "end": 1.5,
                        "text": " Hello there. ",
                        "words": [
                            {"word": "Hello", "start": 0.0, "end": 0.6, "score": 0.98},
                            {"word": "there.", "start": 0.7, "end": 1.5, "score": 0.95}
                        ]
                    },
                    {
                        "start": 2.0,
                        "end": 3.0,
                        "text": "General Kenobi.",
                        "words": [
                            {"word": "General", "start": 2.0, "end": 2.4},
                            {"word": "Kenobi."}
                        ]
                    }
                ],
                "language": "en"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_words_flatten_and_scale_to_ms() {
        let words = sample_transcript().words();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Hello");
        assert_eq!(words[0].start_ms, 0.0);
        assert_eq!(words[0].end_ms, 600.0);
        assert_eq!(words[1].start_ms, 700.0);
    }

    #[test]
    fn test_words_skip_unaligned() {
        let words = sample_transcript().words();
        // "Kenobi." has no timing and must not appear
        assert!(words.iter().all(|w| w.text != "Kenobi."));
    }

    #[test]
    fn test_text_joins_trimmed_segments() {
        assert_eq!(sample_transcript().text(), "Hello there. General Kenobi.");
    }

    #[test]
    fn test_transcript_tolerates_missing_fields() {
        let t: EngineTranscript = serde_json::from_str(r#"{"segments": []}"#).unwrap();
        assert!(t.segments.is_empty());
        assert!(t.language.is_none());
        assert!(t.words().is_empty());
        assert_eq!(t.text(), "");
    }

    #[test]
    fn test_media_info_ignores_unknown_fields() {
        let info: MediaInfo = serde_json::from_str(
            r#"{"id": "abc123", "title": "A video", "ext": "webm",
                "width": 1920, "formats": [{"format_id": "22"}]}"#,
        )
        .unwrap();
        assert_eq!(info.id, "abc123");
        assert_eq!(info.title.as_deref(), Some("A video"));
        assert_eq!(info.ext.as_deref(), Some("webm"));
        assert!(info.chapters.is_none());
    }

    #[test]
    fn test_media_info_requires_id() {
        let result = serde_json::from_str::<MediaInfo>(r#"{"title": "No id"}"#);
        assert!(result.is_err());
    }
}
