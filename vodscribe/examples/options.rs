//! Transcribe with a custom model, language, and output stem, then walk
//! the word timings.
//!
//! Usage: cargo run --example options -- path/to/video.mp4

use vodscribe::TranscribeOptions;

#[tokio::main]
async fn main() -> vodscribe::Result<()> {
    let path = std::env::args()
        .nth(1)
        .expect("usage: options <media-file>");

    let options = TranscribeOptions::new()
        .model("small")
        .language("de")
        .output_base("out/episode")
        .formats(["srt"]);

    let outcome = vodscribe::transcribe_file(&path, &options).await?;

    for segment in &outcome.segments {
        println!(
            "[{:.1}s - {:.1}s] {}",
            segment.start_ms as f64 / 1000.0,
            segment.end_ms as f64 / 1000.0,
            segment.text
        );
    }

    if let Some(index) = vodscribe::find_active_word_index(&outcome.words, 5000.0) {
        println!("word at 5s: {}", outcome.words[index].text);
    }

    Ok(())
}
