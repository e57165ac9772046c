//! Submit cycle shared by the workflow controllers.

use crate::error::{EditorError, Result};
use crate::image::{encoder, GeneratedImage, GenerationGateway, GenerationRequest, SourceImage};
use crate::locale::Locale;
use crate::workflow::state::{Failure, WorkflowState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Shared {
    state: WorkflowState,
    message: Option<String>,
    current: Option<(u64, CancellationToken)>,
    next_id: u64,
    torn_down: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Validated input for one generation.
pub(crate) struct Submission {
    pub prompt: String,
    pub images: Vec<SourceImage>,
}

/// State machine, teardown token and in-flight slot of one workflow.
pub(crate) struct Session<G> {
    gateway: G,
    locale: Locale,
    teardown: CancellationToken,
    shared: Arc<Mutex<Shared>>,
}

impl<G: GenerationGateway> Session<G> {
    pub fn new(gateway: G, locale: Locale) -> Self {
        Self {
            gateway,
            locale,
            teardown: CancellationToken::new(),
            shared: Arc::default(),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn state(&self) -> WorkflowState {
        lock(&self.shared).state.clone()
    }

    pub fn message(&self) -> Option<String> {
        lock(&self.shared).message.clone()
    }

    pub fn is_torn_down(&self) -> bool {
        lock(&self.shared).torn_down
    }

    /// Fails with `Cancelled` once the workflow has been torn down.
    pub fn ensure_open(&self) -> Result<()> {
        if self.is_torn_down() {
            return Err(EditorError::Cancelled);
        }
        Ok(())
    }

    /// Shows `err` to the user without changing the state.
    pub fn report(&self, err: &EditorError) {
        lock(&self.shared).message = Some(err.user_message(self.locale));
    }

    /// Drops a finished outcome after the inputs changed.
    pub fn clear_outcome(&self) {
        let mut shared = lock(&self.shared);
        shared.message = None;
        if matches!(
            shared.state,
            WorkflowState::Completed(_) | WorkflowState::Failed(_)
        ) {
            shared.state = WorkflowState::Idle;
        }
    }

    /// Runs one submit cycle.
    ///
    /// `prepare` validates the controller's inputs and snapshots them. It
    /// runs while the state is `Validating`; a rejection returns the state
    /// to `Idle` without any network call.
    pub async fn submit(
        &self,
        prepare: impl FnOnce() -> Result<Submission>,
    ) -> Result<GeneratedImage> {
        {
            let mut shared = lock(&self.shared);
            if shared.torn_down {
                return Err(EditorError::Cancelled);
            }
            if !shared.state.can_submit() {
                return Err(EditorError::Busy);
            }
            shared.state = WorkflowState::Validating;
        }

        let submission = match prepare() {
            Ok(submission) => submission,
            Err(e) => {
                tracing::debug!(kind = ?e.kind(), "submit rejected: {e}");
                let mut shared = lock(&self.shared);
                shared.state = WorkflowState::Idle;
                shared.message = Some(e.user_message(self.locale));
                return Err(e);
            }
        };

        let operation = self.begin();
        let outcome = self.execute(&operation, submission).await;
        operation.settle(outcome)
    }

    fn begin(&self) -> InFlightOperation {
        let cancel = self.teardown.child_token();
        let mut shared = lock(&self.shared);
        let id = shared.next_id;
        shared.next_id += 1;
        shared.current = Some((id, cancel.clone()));
        shared.state = WorkflowState::InFlight;
        shared.message = None;
        InFlightOperation {
            id,
            cancel,
            locale: self.locale,
            shared: Arc::clone(&self.shared),
            settled: false,
        }
    }

    async fn execute(
        &self,
        operation: &InFlightOperation,
        submission: Submission,
    ) -> Result<GeneratedImage> {
        let cancel = &operation.cancel;

        let images = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EditorError::Cancelled),
            encoded = encoder::encode_all(&submission.images) => encoded?,
        };

        let request = GenerationRequest::new(submission.prompt).with_images(images);
        tracing::info!(
            gateway = self.gateway.name(),
            operation = operation.id,
            images = request.images.len(),
            "starting generation"
        );
        self.gateway.generate(&request, cancel).await
    }

    /// Cancels the outstanding generation, if any.
    pub fn cancel(&self) {
        let shared = lock(&self.shared);
        if let Some((id, cancel)) = &shared.current {
            tracing::info!(operation = id, "cancelling generation");
            cancel.cancel();
        }
    }

    /// Cancels any outstanding generation and refuses further work.
    pub fn teardown(&self) {
        let mut shared = lock(&self.shared);
        if shared.torn_down {
            return;
        }
        shared.torn_down = true;
        self.teardown.cancel();
        if shared.current.take().is_some() {
            let failure = Failure::from_error(&EditorError::Cancelled, self.locale);
            shared.message = Some(failure.message.clone());
            shared.state = WorkflowState::Failed(failure);
        }
        tracing::debug!("workflow torn down");
    }
}

/// An outstanding generation paired with its cancellation token.
///
/// Dropping an unsettled operation (for instance when the submit future
/// is dropped) cancels the token and settles the state as cancelled.
struct InFlightOperation {
    id: u64,
    cancel: CancellationToken,
    locale: Locale,
    shared: Arc<Mutex<Shared>>,
    settled: bool,
}

impl InFlightOperation {
    fn settle(mut self, outcome: Result<GeneratedImage>) -> Result<GeneratedImage> {
        self.settled = true;

        // A result that lands after cancellation is stale
        let outcome = if self.cancel.is_cancelled() {
            if outcome.is_ok() {
                tracing::debug!(operation = self.id, "discarding result of cancelled generation");
            }
            Err(EditorError::Cancelled)
        } else {
            outcome
        };

        let mut shared = lock(&self.shared);
        let is_current = matches!(shared.current, Some((id, _)) if id == self.id);
        if is_current && !shared.torn_down {
            shared.current = None;
            match &outcome {
                Ok(image) => {
                    shared.state = WorkflowState::Completed(image.clone());
                    shared.message = None;
                }
                Err(e) => {
                    let failure = Failure::from_error(e, self.locale);
                    shared.message = Some(failure.message.clone());
                    shared.state = WorkflowState::Failed(failure);
                }
            }
        }
        drop(shared);

        match &outcome {
            Ok(_) => tracing::info!(operation = self.id, "generation completed"),
            Err(e) => tracing::warn!(operation = self.id, kind = ?e.kind(), "generation failed: {e}"),
        }
        outcome
    }
}

impl Drop for InFlightOperation {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.cancel.cancel();
        let mut shared = lock(&self.shared);
        let is_current = matches!(shared.current, Some((id, _)) if id == self.id);
        if is_current {
            shared.current = None;
            let failure = Failure::from_error(&EditorError::Cancelled, self.locale);
            shared.message = Some(failure.message.clone());
            shared.state = WorkflowState::Failed(failure);
        }
    }
}
