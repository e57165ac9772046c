//! Generation gateway trait.

use crate::error::Result;
use crate::image::types::{GeneratedImage, GenerationRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A single-call bridge to an external image-generation capability.
///
/// Implementations attempt each call exactly once. When `cancel` fires
/// before the call resolves, the call must return
/// [`EditorError::Cancelled`](crate::EditorError::Cancelled).
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Generates one image from the prompt and reference images.
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage>;

    /// Returns the name of this gateway for display.
    fn name(&self) -> &str;
}

#[async_trait]
impl<G: GenerationGateway + ?Sized> GenerationGateway for Arc<G> {
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage> {
        (**self).generate(request, cancel).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
