//! Playback-offset word lookup and caption-track construction.

use crate::types::TimedWord;

/// Find the word active at a playback offset.
///
/// Binary search over a time-ordered, non-overlapping word sequence.
/// Returns `Some(index)` when `time_ms` falls inside a word's
/// `[start_ms, end_ms]` interval, `None` before the first word, strictly
/// between two words, or after the last.
pub fn find_active_word_index(words: &[TimedWord], time_ms: f64) -> Option<usize> {
    let mut low = 0usize;
    let mut high = words.len();
    while low < high {
        let mid = low + (high - low) / 2;
        let word = &words[mid];
        if time_ms < word.start_ms {
            high = mid;
        } else if time_ms > word.end_ms {
            low = mid + 1;
        } else {
            return Some(mid);
        }
    }
    None
}

/// MIME prefix of the inline caption track.
const TRACK_URI_PREFIX: &str = "data:text/vtt,";

/// Build an inline WebVTT data URI with one numbered cue per word.
///
/// Empty input yields the minimal header-only track. Embedded newlines in
/// word text are collapsed to spaces so each cue stays well-formed.
pub fn build_word_track_data_uri(words: &[TimedWord]) -> String {
    let mut body = String::from("WEBVTT\n");
    for (i, word) in words.iter().enumerate() {
        let text = word.text.replace('\r', " ").replace('\n', " ");
        body.push('\n');
        body.push_str(&format!(
            "{}\n{} --> {}\n{}\n",
            i + 1,
            format_cue_time(word.start_ms),
            format_cue_time(word.end_ms),
            text,
        ));
    }
    format!("{TRACK_URI_PREFIX}{}", urlencoding::encode(&body))
}

/// Format milliseconds as a VTT cue timestamp: HH:MM:SS.mmm
/// Negative offsets clamp to zero.
fn format_cue_time(ms: f64) -> String {
    let total_ms = ms.max(0.0).round() as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start_ms: f64, end_ms: f64) -> TimedWord {
        TimedWord {
            text: text.into(),
            start_ms,
            end_ms,
        }
    }

    fn two_words() -> Vec<TimedWord> {
        vec![word("first", 0.0, 500.0), word("second", 600.0, 900.0)]
    }

    // --- Active word lookup ---

    #[test]
    fn test_find_inside_second_word() {
        assert_eq!(find_active_word_index(&two_words(), 700.0), Some(1));
    }

    #[test]
    fn test_find_between_words() {
        assert_eq!(find_active_word_index(&two_words(), 550.0), None);
    }

    #[test]
    fn test_find_before_first_word() {
        assert_eq!(find_active_word_index(&two_words(), -10.0), None);
    }

    #[test]
    fn test_find_after_last_word() {
        assert_eq!(find_active_word_index(&two_words(), 901.0), None);
    }

    #[test]
    fn test_find_empty_input() {
        assert_eq!(find_active_word_index(&[], 100.0), None);
    }

    #[test]
    fn test_find_boundaries_are_inclusive() {
        let words = two_words();
        assert_eq!(find_active_word_index(&words, 0.0), Some(0));
        assert_eq!(find_active_word_index(&words, 500.0), Some(0));
        assert_eq!(find_active_word_index(&words, 600.0), Some(1));
        assert_eq!(find_active_word_index(&words, 900.0), Some(1));
    }

    #[test]
    fn test_find_in_long_sequence() {
        let words: Vec<TimedWord> = (0..1000)
            .map(|i| word(&format!("w{i}"), i as f64 * 100.0, i as f64 * 100.0 + 80.0))
            .collect();
        assert_eq!(find_active_word_index(&words, 55_050.0), Some(550));
        assert_eq!(find_active_word_index(&words, 55_090.0), None);
    }

    // --- Caption track ---

    #[test]
    fn test_empty_track_is_header_only() {
        let uri = build_word_track_data_uri(&[]);
        assert!(uri.starts_with("data:text/vtt,"));
        let body = urlencoding::decode(&uri["data:text/vtt,".len()..]).unwrap();
        assert_eq!(body, "WEBVTT\n");
    }

    #[test]
    fn test_single_word_track() {
        let uri = build_word_track_data_uri(&[word("hello", 0.0, 500.0)]);
        let body = urlencoding::decode(&uri["data:text/vtt,".len()..]).unwrap();
        assert_eq!(
            body,
            "WEBVTT\n\n1\n00:00:00.000 --> 00:00:00.500\nhello\n"
        );
    }

    #[test]
    fn test_cues_are_numbered_from_one() {
        let uri = build_word_track_data_uri(&two_words());
        let body = urlencoding::decode(&uri["data:text/vtt,".len()..])
            .unwrap()
            .into_owned();
        assert!(body.contains("\n1\n00:00:00.000 --> 00:00:00.500\nfirst\n"));
        assert!(body.contains("\n2\n00:00:00.600 --> 00:00:00.900\nsecond\n"));
    }

    #[test]
    fn test_newlines_in_word_text_collapse() {
        let uri = build_word_track_data_uri(&[word("multi\nline", 0.0, 100.0)]);
        let body = urlencoding::decode(&uri["data:text/vtt,".len()..]).unwrap();
        assert!(body.contains("multi line"));
    }

    #[test]
    fn test_cue_time_formatting() {
        assert_eq!(format_cue_time(0.0), "00:00:00.000");
        assert_eq!(format_cue_time(1234.0), "00:00:01.234");
        assert_eq!(format_cue_time(61_000.0), "00:01:01.000");
        assert_eq!(format_cue_time(3_600_000.0 + 62_345.0), "01:01:02.345");
    }

    #[test]
    fn test_cue_time_clamps_negative() {
        assert_eq!(format_cue_time(-250.0), "00:00:00.000");
    }
}
