//! Source images, encoding, validation and the generation gateway.

pub mod encoder;
mod gateway;
pub mod providers;
mod types;
pub mod validation;

pub use gateway::GenerationGateway;
pub use types::{
    EncodedImage, GeneratedImage, GenerationMetadata, GenerationRequest, ImageContent,
    ImageFormat, SourceImage, MAX_FILE_SIZE,
};
