//! Enhancer and mixer workflow controllers.
//!
//! Each controller owns its inputs, at most one outstanding generation, and
//! the preview handles of the images it holds. Submitting validates the
//! inputs, encodes the images and calls the gateway; the outcome is kept as
//! the controller's [`WorkflowState`] alongside a localized message.

mod enhancer;
mod mixer;
mod preview;
mod session;
mod state;
#[cfg(test)]
mod testing;

pub use enhancer::Enhancer;
pub use mixer::Mixer;
pub use preview::{PreviewHandle, PreviewRegistry};
pub use state::{Failure, WorkflowState};
