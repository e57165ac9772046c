//! Single-image enhancer: one photo plus an instruction.

use crate::error::Result;
use crate::image::validation;
use crate::image::{GeneratedImage, GenerationGateway, SourceImage};
use crate::locale::Locale;
use crate::workflow::preview::{PreviewHandle, PreviewRegistry};
use crate::workflow::session::{Session, Submission};
use crate::workflow::state::WorkflowState;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Inputs {
    image: Option<(SourceImage, PreviewHandle)>,
    prompt: String,
}

/// Controller for the single-image workflow.
pub struct Enhancer<G: GenerationGateway> {
    session: Session<G>,
    previews: PreviewRegistry,
    inputs: Mutex<Inputs>,
}

impl<G: GenerationGateway> Enhancer<G> {
    /// Creates an enhancer that generates through `gateway`.
    pub fn new(gateway: G) -> Self {
        Self::with_locale(gateway, Locale::default())
    }

    /// Creates an enhancer that reports messages in `locale`.
    pub fn with_locale(gateway: G, locale: Locale) -> Self {
        Self {
            session: Session::new(gateway, locale),
            previews: PreviewRegistry::new(),
            inputs: Mutex::default(),
        }
    }

    fn inputs(&self) -> MutexGuard<'_, Inputs> {
        self.inputs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accepts `image`, replacing any previous one.
    ///
    /// A rejected file leaves the current image untouched.
    pub fn upload(&self, image: SourceImage) -> Result<u64> {
        self.session.ensure_open()?;
        if let Err(e) = validation::validate_file(&image) {
            self.session.report(&e);
            return Err(e);
        }

        let preview = self.previews.acquire();
        let id = preview.id();
        let previous = self.inputs().image.replace((image, preview));
        if let Some((_, old)) = previous {
            old.release();
        }
        self.session.clear_outcome();
        Ok(id)
    }

    /// Removes the current image and releases its preview.
    pub fn remove_image(&self) {
        if let Some((_, preview)) = self.inputs().image.take() {
            preview.release();
        }
    }

    /// Returns true if an image is held.
    pub fn has_image(&self) -> bool {
        self.inputs().image.is_some()
    }

    /// Preview handle id of the held image.
    pub fn preview_id(&self) -> Option<u64> {
        self.inputs().image.as_ref().map(|(_, p)| p.id())
    }

    /// Replaces the prompt.
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        self.inputs().prompt = prompt.into();
    }

    /// Fills in the canned product-photography prompt.
    pub fn use_auto_prompt(&self) {
        let prompt = self.session.locale().auto_prompt();
        self.set_prompt(prompt);
    }

    /// Current prompt.
    pub fn prompt(&self) -> String {
        self.inputs().prompt.clone()
    }

    /// Validates, encodes and generates.
    ///
    /// Every failure is also recorded as the workflow's state and message.
    pub async fn submit(&self) -> Result<GeneratedImage> {
        self.session
            .submit(|| {
                let inputs = self.inputs();
                let image = inputs.image.as_ref().map(|(image, _)| image);
                validation::validate_enhancer_submit(image, &inputs.prompt)?;
                Ok(Submission {
                    prompt: inputs.prompt.clone(),
                    images: image.into_iter().cloned().collect(),
                })
            })
            .await
    }

    /// Cancels the outstanding generation, if any.
    pub fn cancel(&self) {
        self.session.cancel();
    }

    /// Current state.
    pub fn state(&self) -> WorkflowState {
        self.session.state()
    }

    /// Message to show the user, if any.
    pub fn message(&self) -> Option<String> {
        self.session.message()
    }

    /// Result of the last completed generation.
    pub fn result(&self) -> Option<GeneratedImage> {
        self.state().result().cloned()
    }

    /// Registry tracking this workflow's preview handles.
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Cancels any outstanding generation and releases all previews.
    pub fn teardown(&self) {
        self.session.teardown();
        self.remove_image();
    }
}

impl<G: GenerationGateway> Drop for Enhancer<G> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EditorError, MissingInput};
    use crate::image::MAX_FILE_SIZE;
    use crate::workflow::testing::{jpeg_of_size, png_reply, ScriptedGateway};
    use crate::ErrorKind;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_enhance_scenario_completes_with_data_url() {
        let gateway = Arc::new(ScriptedGateway::ok(png_reply("iVBORw0KGgo=")));
        let enhancer = Enhancer::new(Arc::clone(&gateway));

        enhancer.upload(jpeg_of_size(2 * 1000 * 1000)).unwrap();
        enhancer.set_prompt("add sunset lighting");

        let image = enhancer.submit().await.unwrap();
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw0KGgo=");
        assert!(matches!(enhancer.state(), WorkflowState::Completed(_)));
        assert_eq!(enhancer.result(), Some(image));
        assert!(enhancer.message().is_none());

        let sent = gateway.last_request().unwrap();
        assert_eq!(sent.prompt, "add sunset lighting");
        assert_eq!(sent.images.len(), 1);
        assert_eq!(sent.images[0].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_submit_without_image_makes_no_call() {
        let gateway = Arc::new(ScriptedGateway::ok(png_reply("AAAA")));
        let enhancer = Enhancer::new(Arc::clone(&gateway));
        enhancer.set_prompt("anything");

        let err = enhancer.submit().await.unwrap_err();
        assert!(matches!(
            err,
            EditorError::MissingInput(MissingInput::NoImage)
        ));
        assert_eq!(enhancer.state(), WorkflowState::Idle);
        assert_eq!(
            enhancer.message().as_deref(),
            Some("Please upload a product photo first.")
        );
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_with_empty_prompt_makes_no_call() {
        let gateway = Arc::new(ScriptedGateway::ok(png_reply("AAAA")));
        let enhancer = Enhancer::new(Arc::clone(&gateway));
        enhancer.upload(jpeg_of_size(10)).unwrap();

        let err = enhancer.submit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_auto_prompt_satisfies_prompt_rule() {
        let gateway = Arc::new(ScriptedGateway::ok(png_reply("AAAA")));
        let enhancer = Enhancer::new(Arc::clone(&gateway));
        enhancer.upload(jpeg_of_size(10)).unwrap();
        enhancer.use_auto_prompt();

        assert!(enhancer.prompt().starts_with("Professional product photography"));
        let image = enhancer.submit().await.unwrap();
        assert_eq!(image.data, "AAAA");
    }

    #[test]
    fn test_rejected_upload_keeps_previous_image() {
        let enhancer = Enhancer::new(ScriptedGateway::ok(png_reply("AAAA")));
        let first = enhancer.upload(jpeg_of_size(10)).unwrap();

        let err = enhancer
            .upload(SourceImage::from_bytes("text/plain", b"hi".to_vec()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFileType);

        let err = enhancer.upload(jpeg_of_size(MAX_FILE_SIZE + 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);

        assert_eq!(enhancer.preview_id(), Some(first));
        assert_eq!(enhancer.previews().live(), 1);
        assert!(enhancer.message().unwrap().contains("too large"));
    }

    #[test]
    fn test_replacing_image_releases_old_preview() {
        let enhancer = Enhancer::new(ScriptedGateway::ok(png_reply("AAAA")));
        let first = enhancer.upload(jpeg_of_size(10)).unwrap();
        let second = enhancer.upload(jpeg_of_size(20)).unwrap();

        assert_ne!(first, second);
        assert_eq!(enhancer.previews().live(), 1);
        assert_eq!(enhancer.previews().released(), 1);

        enhancer.remove_image();
        assert!(!enhancer.has_image());
        assert_eq!(enhancer.previews().live(), 0);
    }

    #[tokio::test]
    async fn test_new_upload_clears_previous_result() {
        let enhancer = Enhancer::new(ScriptedGateway::ok(png_reply("AAAA")));
        enhancer.upload(jpeg_of_size(10)).unwrap();
        enhancer.set_prompt("go");
        let image = enhancer.submit().await.unwrap();
        assert_eq!(enhancer.result(), Some(image));

        enhancer.upload(jpeg_of_size(10)).unwrap();
        assert_eq!(enhancer.state(), WorkflowState::Idle);
        assert!(enhancer.result().is_none());
    }

    #[tokio::test]
    async fn test_teardown_cancels_in_flight_and_releases_previews() {
        let gateway = Arc::new(ScriptedGateway::held(png_reply("AAAA")));
        let enhancer = Arc::new(Enhancer::new(Arc::clone(&gateway)));
        enhancer.upload(jpeg_of_size(10)).unwrap();
        enhancer.set_prompt("go");

        let task = tokio::spawn({
            let enhancer = Arc::clone(&enhancer);
            async move { enhancer.submit().await }
        });
        gateway.wait_until_called().await;
        assert!(enhancer.state().is_in_flight());

        enhancer.teardown();
        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, EditorError::Cancelled));
        assert_eq!(
            enhancer.state().failure().map(|f| f.kind),
            Some(ErrorKind::Cancelled)
        );
        assert_eq!(enhancer.previews().live(), 0);

        // Torn down workflows refuse further work
        assert!(matches!(
            enhancer.upload(jpeg_of_size(10)),
            Err(EditorError::Cancelled)
        ));
        assert!(matches!(
            enhancer.submit().await,
            Err(EditorError::Cancelled)
        ));
    }

    #[test]
    fn test_drop_releases_previews() {
        let registry = {
            let enhancer = Enhancer::new(ScriptedGateway::ok(png_reply("AAAA")));
            enhancer.upload(jpeg_of_size(10)).unwrap();
            enhancer.previews().clone()
        };
        assert_eq!(registry.live(), 0);
    }
}
