//! Keep SRT, WebVTT, and TSV artifacts alongside the engine JSON.
//!
//! Usage: cargo run --example formats -- path/to/video.mp4

use vodscribe::TranscribeOptions;

#[tokio::main]
async fn main() -> vodscribe::Result<()> {
    let path = std::env::args()
        .nth(1)
        .expect("usage: formats <media-file>");

    let options = TranscribeOptions::new().formats(["srt", "vtt", "tsv"]);
    let outcome = vodscribe::transcribe_file(&path, &options).await?;

    for file in &outcome.output.files {
        println!("kept {}", file.display());
    }

    Ok(())
}
