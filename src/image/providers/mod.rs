//! Generation gateway implementations.

pub mod gemini;

pub use gemini::{GeminiGateway, GeminiGatewayBuilder, GeminiModel};
