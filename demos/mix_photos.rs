//! Photo mixing example - blends two to four photos into one image.
//!
//! Run with: `cargo run --example mix_photos -- <a.jpg> <b.jpg> [c.jpg] [d.jpg]`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use editor_ai::{GeminiGateway, Locale, Mixer, SourceImage};

#[tokio::main]
async fn main() -> editor_ai::Result<()> {
    let paths: Vec<String> = std::env::args().skip(1).collect();

    let mixer = Mixer::with_locale(GeminiGateway::builder().build()?, Locale::English);

    let mut batch = Vec::new();
    for path in &paths {
        batch.push(SourceImage::from_path(path).await?);
    }
    mixer.upload_batch(batch)?;
    mixer.set_prompt("Blend the styles of these photos into a single cohesive scene");

    match mixer.submit().await {
        Ok(image) => {
            let path = image.save_to_dir(".")?;
            println!("Mixed image saved to {}", path.display());
        }
        Err(e) => {
            // The failure kind and localized message stay on the workflow
            if let Some(failure) = mixer.state().failure() {
                eprintln!("{:?}: {}", failure.kind, failure.message);
            } else {
                eprintln!("{e}");
            }
        }
    }

    Ok(())
}
