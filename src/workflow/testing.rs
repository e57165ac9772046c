//! Scripted gateway for workflow tests.
//!
//! Replies are canned HTTP bodies run through the real Gemini response
//! interpretation, so workflow tests exercise the same classification the
//! network gateway uses.

use crate::error::{EditorError, Result};
use crate::image::providers::gemini::{interpret_reply, HttpReply};
use crate::image::{GeneratedImage, GenerationGateway, GenerationRequest, SourceImage};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hold {
    None,
    UntilReleasedOrCancelled,
    UntilReleased,
}

pub(crate) struct ScriptedGateway {
    reply: HttpReply,
    hold: Hold,
    release: Notify,
    entered: Notify,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedGateway {
    fn new(reply: HttpReply, hold: Hold) -> Self {
        Self {
            reply,
            hold,
            release: Notify::new(),
            entered: Notify::new(),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Replies immediately.
    pub fn ok(reply: HttpReply) -> Self {
        Self::new(reply, Hold::None)
    }

    /// Replies once released; honours cancellation while waiting.
    pub fn held(reply: HttpReply) -> Self {
        Self::new(reply, Hold::UntilReleasedOrCancelled)
    }

    /// Replies once released, even if cancelled meanwhile.
    pub fn held_ignoring_cancel(reply: HttpReply) -> Self {
        Self::new(reply, Hold::UntilReleased)
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub async fn wait_until_called(&self) {
        self.entered.notified().await;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.entered.notify_one();

        match self.hold {
            Hold::None => {}
            Hold::UntilReleased => self.release.notified().await,
            Hold::UntilReleasedOrCancelled => {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(EditorError::Cancelled),
                    _ = self.release.notified() => {}
                }
            }
        }
        interpret_reply(&self.reply)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub(crate) fn reply(status: u16, body: &str) -> HttpReply {
    HttpReply {
        status,
        reason: None,
        body: body.to_string(),
    }
}

pub(crate) fn png_reply(data: &str) -> HttpReply {
    let body = serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": data } }] },
            "finishReason": "STOP"
        }]
    });
    reply(200, &body.to_string())
}

pub(crate) fn text_reply(text: &str) -> HttpReply {
    let body = serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] }, "finishReason": "STOP" }]
    });
    reply(200, &body.to_string())
}

pub(crate) fn jpeg_of_size(size: u64) -> SourceImage {
    SourceImage {
        size_bytes: size,
        ..SourceImage::from_bytes("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
    }
}
