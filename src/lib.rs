#![warn(missing_docs)]
//! Editor AI - prompt-driven photo enhancement and multi-image mixing.
//!
//! Two workflows sit on top of a generative image model:
//!
//! - [`Enhancer`]: one product photo plus an instruction (or the canned
//!   "auto" prompt) produces a single edited image.
//! - [`Mixer`]: two to four photos plus an instruction are blended into one.
//!
//! Both validate their inputs before any network call, allow at most one
//! generation at a time, and classify failures into [`ErrorKind`]s with
//! localized messages.
//!
//! # Quick Start
//!
//! ```no_run
//! use editor_ai::{Enhancer, GeminiGateway, SourceImage};
//!
//! #[tokio::main]
//! async fn main() -> editor_ai::Result<()> {
//!     let gateway = GeminiGateway::builder().build()?;
//!     let enhancer = Enhancer::new(gateway);
//!
//!     enhancer.upload(SourceImage::from_path("shoe.jpg").await?)?;
//!     enhancer.set_prompt("add sunset lighting");
//!
//!     let image = enhancer.submit().await?;
//!     image.save_to_dir(".")?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! [`GeminiGateway::builder`] reads `GOOGLE_API_KEY` and
//! `EDITOR_AI_ENDPOINT` when the key or endpoint are not set explicitly. A
//! custom endpoint (for instance a server that holds the key) may be used
//! without a key.
//!
//! # Features
//!
//! - `cli`: the `editor-ai` command-line interface

mod error;
pub mod image;
mod locale;
pub mod workflow;

// Re-export error types at crate root
pub use error::{truncate_chars, EditorError, ErrorKind, MissingInput, Result};
pub use locale::Locale;

// Re-export commonly used image types
pub use image::providers::{GeminiGateway, GeminiGatewayBuilder, GeminiModel};
pub use image::{
    EncodedImage, GeneratedImage, GenerationGateway, GenerationMetadata, GenerationRequest,
    ImageContent, ImageFormat, SourceImage, MAX_FILE_SIZE,
};

// Re-export workflow controllers
pub use workflow::{Enhancer, Failure, Mixer, WorkflowState};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{EditorError, Result};
    pub use crate::image::providers::GeminiGateway;
    pub use crate::image::{GeneratedImage, GenerationGateway, GenerationRequest, SourceImage};
    pub use crate::locale::Locale;
    pub use crate::workflow::{Enhancer, Mixer, WorkflowState};
}
