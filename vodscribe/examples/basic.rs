//! Transcribe a local media file and print the paragraph-formatted text.
//!
//! Usage: cargo run --example basic -- path/to/video.mp4

use vodscribe::TranscribeOptions;

#[tokio::main]
async fn main() -> vodscribe::Result<()> {
    let path = std::env::args()
        .nth(1)
        .expect("usage: basic <media-file>");

    let outcome = vodscribe::transcribe_file(&path, &TranscribeOptions::new()).await?;

    println!(
        "{}",
        vodscribe::format_transcript_with_paragraphs(&outcome.words, &outcome.text)
    );

    Ok(())
}
