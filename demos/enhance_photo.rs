//! Photo enhancement example - edits one product photo with a prompt.
//!
//! Run with: `cargo run --example enhance_photo -- <photo.jpg> [prompt]`
//!
//! Without a prompt the built-in product-photography prompt is used.
//! Requires `GOOGLE_API_KEY` (or `EDITOR_AI_ENDPOINT` pointing at a server
//! that holds the key).

use editor_ai::{Enhancer, GeminiGateway, SourceImage};

#[tokio::main]
async fn main() -> editor_ai::Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .expect("Usage: enhance_photo <photo.jpg> [prompt]");

    let enhancer = Enhancer::new(GeminiGateway::builder().build()?);
    enhancer.upload(SourceImage::from_path(&input_path).await?)?;

    match args.next() {
        Some(prompt) => enhancer.set_prompt(prompt),
        None => enhancer.use_auto_prompt(),
    }

    match enhancer.submit().await {
        Ok(image) => {
            let path = image.save_to_dir(".")?;
            println!("Enhanced image saved to {}", path.display());
        }
        Err(_) => {
            // The workflow keeps the localized message for display
            eprintln!("{}", enhancer.message().unwrap_or_default());
        }
    }

    Ok(())
}
