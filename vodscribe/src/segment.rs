//! Word-timing → display segment formatting.
//!
//! Converts noisy token-level timing data into coherent, time-bounded
//! paragraph/caption segments. Formatting degrades through three levels
//! (timed words → text-estimated timings → one literal segment) and never
//! fails outward: the worst case is an empty result when there is no
//! usable text at all.

use tracing::debug;

use crate::types::{FormattedSegment, TimedWord};

/// Thresholds steering the combine and line-wrap stages.
#[derive(Debug, Clone, Copy)]
pub struct SegmentThresholds {
    /// Inter-token silence that forces a split, in seconds.
    pub gap_split: f64,
    /// Accumulated span duration that forces a split, in seconds.
    pub max_span: f64,
    /// Spans with fewer words are merged into a neighbor.
    pub min_words: usize,
    /// Maximum sub-segment length after line-wrapping, in seconds.
    pub max_line: f64,
}

impl SegmentThresholds {
    /// Paragraph-scale thresholds for word-timed transcripts.
    pub const DOCUMENT: Self = Self {
        gap_split: 1.2,
        max_span: 42.0,
        min_words: 6,
        max_line: 18.0,
    };

    /// Tighter thresholds for estimated timings and previews.
    pub const ESTIMATED: Self = Self {
        gap_split: 0.8,
        max_span: 20.0,
        min_words: 4,
        max_line: 10.0,
    };
}

/// Estimated speech duration per word when no timing data exists.
const ESTIMATED_SECS_PER_WORD: f64 = 0.45;

/// Floor for an estimated transcript duration, in seconds.
const MIN_ESTIMATED_SECS: f64 = 1.0;

/// A word with second-scale timing, validated on construction.
#[derive(Debug, Clone)]
struct Token {
    text: String,
    start: f64,
    end: f64,
}

#[derive(Debug, thiserror::Error)]
enum SegmentError {
    #[error("token sequence is not time-ordered")]
    NonMonotonic,
    #[error("combine stage produced an empty span")]
    EmptySpan,
}

/// Format word timings into display segments.
///
/// Primary path uses the millisecond word records; without usable timed
/// words the timing is estimated from `fallback_text`; if segmentation
/// itself fails, the whole fallback text becomes one literal segment.
pub fn format_segments(words: &[TimedWord], fallback_text: &str) -> Vec<FormattedSegment> {
    let tokens = tokens_from_words(words);

    let attempt = if tokens.is_empty() {
        debug!("no usable word timings, estimating from text");
        tokens_from_text(fallback_text).map(|t| run_stages(&t, SegmentThresholds::ESTIMATED))
    } else {
        Some(run_stages(&tokens, SegmentThresholds::DOCUMENT))
    };

    match attempt {
        Some(Ok(segments)) => segments,
        Some(Err(e)) => {
            debug!(error = %e, "segmentation degraded to literal text");
            literal_segment(fallback_text)
        }
        None => literal_segment(fallback_text),
    }
}

/// Full transcript as paragraphs separated by blank lines.
/// Returns the fallback text verbatim when no segments could be formed.
pub fn format_transcript_with_paragraphs(words: &[TimedWord], fallback_text: &str) -> String {
    let segments = format_segments(words, fallback_text);
    if segments.is_empty() {
        return fallback_text.to_string();
    }
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Compact multi-line preview of a plain-text transcript.
/// Returns the trimmed original text when segmentation fails or is empty.
pub fn format_transcript_preview(text: &str) -> String {
    let attempt = tokens_from_text(text).map(|t| run_stages(&t, SegmentThresholds::ESTIMATED));
    match attempt {
        Some(Ok(segments)) if !segments.is_empty() => segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => text.trim().to_string(),
    }
}

/// Convert millisecond word records to second-scale tokens, discarding
/// any with empty text, non-finite timing, or end before start.
fn tokens_from_words(words: &[TimedWord]) -> Vec<Token> {
    words
        .iter()
        .filter_map(|word| {
            let text = word.text.trim();
            if text.is_empty() {
                return None;
            }
            if !word.start_ms.is_finite() || !word.end_ms.is_finite() {
                return None;
            }
            if word.end_ms < word.start_ms {
                return None;
            }
            Some(Token {
                text: text.to_string(),
                start: word.start_ms / 1000.0,
                end: word.end_ms / 1000.0,
            })
        })
        .collect()
}

/// Synthesize evenly spaced tokens from plain text, 0.45 s per word with
/// a 1 s floor. Returns None for text with no words.
fn tokens_from_text(text: &str) -> Option<Vec<Token>> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let total = (words.len() as f64 * ESTIMATED_SECS_PER_WORD).max(MIN_ESTIMATED_SECS);
    let per_word = total / words.len() as f64;
    Some(
        words
            .iter()
            .enumerate()
            .map(|(i, word)| Token {
                text: (*word).to_string(),
                start: i as f64 * per_word,
                end: (i + 1) as f64 * per_word,
            })
            .collect(),
    )
}

/// One literal segment covering the entire fallback text, or nothing.
fn literal_segment(fallback_text: &str) -> Vec<FormattedSegment> {
    let text = fallback_text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let word_count = text.split_whitespace().count();
    let total = (word_count as f64 * ESTIMATED_SECS_PER_WORD).max(MIN_ESTIMATED_SECS);
    vec![FormattedSegment {
        id: 0,
        start_ms: 0,
        end_ms: (total * 1000.0).round() as u64,
        text: text.to_string(),
    }]
}

/// The two-stage algorithm: combine tokens into spans, then wrap each
/// span into caption-sized lines.
fn run_stages(
    tokens: &[Token],
    thresholds: SegmentThresholds,
) -> Result<Vec<FormattedSegment>, SegmentError> {
    let spans = combine(tokens, thresholds)?;

    let mut segments = Vec::new();
    for span in &spans {
        for line in line_wrap(span, thresholds.max_line) {
            if let Some(segment) = emit(line) {
                segments.push(segment);
            }
        }
    }
    for (i, segment) in segments.iter_mut().enumerate() {
        segment.id = i;
    }
    Ok(segments)
}

/// Combine stage: group tokens into spans, splitting on silence gaps and
/// on accumulated duration, then fold under-sized spans into a neighbor.
fn combine(tokens: &[Token], thresholds: SegmentThresholds) -> Result<Vec<Vec<Token>>, SegmentError> {
    let mut spans: Vec<Vec<Token>> = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut previous_start = f64::NEG_INFINITY;

    for token in tokens {
        if token.start < previous_start {
            return Err(SegmentError::NonMonotonic);
        }
        previous_start = token.start;

        if let (Some(first), Some(last)) = (current.first(), current.last()) {
            let gap = token.start - last.end;
            let span_secs = token.end - first.start;
            if gap > thresholds.gap_split || span_secs > thresholds.max_span {
                spans.push(std::mem::take(&mut current));
            }
        }
        current.push(token.clone());
    }
    if !current.is_empty() {
        spans.push(current);
    }

    merge_short_spans(&mut spans, thresholds.min_words);

    if spans.iter().any(|span| span.is_empty()) {
        return Err(SegmentError::EmptySpan);
    }
    Ok(spans)
}

/// Fold spans with fewer than `min_words` tokens into the following span,
/// or the preceding one for a trailing short span. A lone short span is
/// kept as-is.
fn merge_short_spans(spans: &mut Vec<Vec<Token>>, min_words: usize) {
    let mut i = 0;
    while spans.len() > 1 && i < spans.len() {
        if spans[i].len() >= min_words {
            i += 1;
            continue;
        }
        if i + 1 < spans.len() {
            let mut short = spans.remove(i);
            short.append(&mut spans[i]);
            spans[i] = short;
            // re-check the merged span at the same index
        } else {
            let Some(short) = spans.pop() else { break };
            if let Some(previous) = spans.last_mut() {
                previous.extend(short);
            }
            break;
        }
    }
}

/// Line-wrap stage: subdivide a span into runs no longer than `max_line`
/// seconds each.
fn line_wrap(span: &[Token], max_line: f64) -> Vec<Vec<Token>> {
    let mut lines: Vec<Vec<Token>> = Vec::new();
    let mut current: Vec<Token> = Vec::new();

    for token in span {
        if let Some(first) = current.first() {
            if token.end - first.start > max_line {
                lines.push(std::mem::take(&mut current));
            }
        }
        current.push(token.clone());
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Build the externally visible segment from a run of tokens.
/// Returns None when the concatenated text trims to nothing.
fn emit(line: Vec<Token>) -> Option<FormattedSegment> {
    let first = line.first()?;
    let last = line.last()?;
    let text = line
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    if text.is_empty() {
        return None;
    }
    Some(FormattedSegment {
        id: 0,
        start_ms: (first.start * 1000.0).round().max(0.0) as u64,
        end_ms: (last.end * 1000.0).round().max(0.0) as u64,
        text,
    })
}
