//! Multi-image mixer: two to four photos blended by an instruction.

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
    images: Vec<(SourceImage, PreviewHandle)>,
    prompt: String,
}

/// Controller for the multi-image workflow.
pub struct Mixer<G: GenerationGateway> {
    session: Session<G>,
    previews: PreviewRegistry,
    inputs: Mutex<Inputs>,
}

impl<G: GenerationGateway> Mixer<G> {
    /// Creates a mixer that generates through `gateway`.
    pub fn new(gateway: G) -> Self {
        Self::with_locale(gateway, Locale::default())
    }

    /// Creates a mixer that reports messages in `locale`.
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

    /// Adds a batch of images after the ones already held.
    ///
    /// The batch is all-or-nothing: if it would exceed the cap, or any file
    /// in it is invalid, nothing is added. Returns the new image count.
    pub fn upload_batch(&self, batch: Vec<SourceImage>) -> Result<usize> {
        self.session.ensure_open()?;
        if batch.is_empty() {
            return Ok(self.images_len());
        }

        let count = {
            let mut inputs = self.inputs();
            if let Err(e) = validation::validate_batch(inputs.images.len(), &batch) {
                drop(inputs);
                self.session.report(&e);
                return Err(e);
            }
            inputs
                .images
                .extend(batch.into_iter().map(|image| (image, self.previews.acquire())));
            inputs.images.len()
        };

        tracing::debug!(count, "mixer images accepted");
        self.session.clear_outcome();
        Ok(count)
    }

    /// Removes the image at `index`, releasing its preview.
    ///
    /// Returns false if there is no such image.
    pub fn remove_image(&self, index: usize) -> bool {
        let mut inputs = self.inputs();
        if index >= inputs.images.len() {
            return false;
        }
        let (_, preview) = inputs.images.remove(index);
        preview.release();
        true
    }

    /// Number of images held.
    pub fn images_len(&self) -> usize {
        self.inputs().images.len()
    }

    /// True while more images can be added.
    pub fn can_add_more(&self) -> bool {
        self.images_len() < validation::MAX_MIXER_IMAGES
    }

    /// Preview handle ids in upload order.
    pub fn preview_ids(&self) -> Vec<u64> {
        self.inputs().images.iter().map(|(_, p)| p.id()).collect()
    }

    /// Replaces the prompt.
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        self.inputs().prompt = prompt.into();
    }

    /// Current prompt.
    pub fn prompt(&self) -> String {
        self.inputs().prompt.clone()
    }

    /// Validates, encodes all images concurrently and generates.
    pub async fn submit(&self) -> Result<GeneratedImage> {
        self.session
            .submit(|| {
                let inputs = self.inputs();
                validation::validate_mixer_submit(inputs.images.len(), &inputs.prompt)?;
                Ok(Submission {
                    prompt: inputs.prompt.clone(),
                    images: inputs.images.iter().map(|(image, _)| image.clone()).collect(),
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
        let images = std::mem::take(&mut self.inputs().images);
        for (_, preview) in images {
            preview.release();
        }
    }
}

impl<G: GenerationGateway> Drop for Mixer<G> {
    fn drop(&mut self) {
        self.teardown();
    }
}
