//! Input checks applied before any encoding or network call.

use crate::error::{EditorError, MissingInput, Result};
use crate::image::types::{SourceImage, MAX_FILE_SIZE};

/// Fewest images the mixer accepts on submit.
pub const MIN_MIXER_IMAGES: usize = 2;
/// Most images the mixer holds at once.
pub const MAX_MIXER_IMAGES: usize = 4;

/// Checks a single file's type and size.
pub fn validate_file(image: &SourceImage) -> Result<()> {
    if !image.mime_type.starts_with("image/") {
        return Err(EditorError::InvalidFileType {
            mime_type: image.mime_type.clone(),
        });
    }
    if image.size_bytes > MAX_FILE_SIZE {
        return Err(EditorError::FileTooLarge {
            size_bytes: image.size_bytes,
            max_bytes: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// Checks an incoming mixer batch against the images already held.
///
/// The batch is accepted or rejected as a whole: the count is checked
/// first, then every file.
pub fn validate_batch(existing: usize, incoming: &[SourceImage]) -> Result<()> {
    if existing + incoming.len() > MAX_MIXER_IMAGES {
        return Err(EditorError::TooManyFiles {
            existing,
            incoming: incoming.len(),
            max: MAX_MIXER_IMAGES,
        });
    }
    incoming.iter().try_for_each(validate_file)
}

/// Rejects empty or whitespace-only prompts.
pub fn validate_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(EditorError::MissingInput(MissingInput::EmptyPrompt));
    }
    Ok(())
}

/// Submit-time check for the enhancer.
pub fn validate_enhancer_submit(image: Option<&SourceImage>, prompt: &str) -> Result<()> {
    if image.is_none() {
        return Err(EditorError::MissingInput(MissingInput::NoImage));
    }
    validate_prompt(prompt)
}

/// Submit-time check for the mixer.
pub fn validate_mixer_submit(count: usize, prompt: &str) -> Result<()> {
    if count < MIN_MIXER_IMAGES {
        return Err(EditorError::MissingInput(MissingInput::TooFewImages {
            required: MIN_MIXER_IMAGES,
            provided: count,
        }));
    }
    validate_prompt(prompt)
}
