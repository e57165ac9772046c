//! Core types for source images, requests and results.

use crate::error::{EditorError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hard ceiling on the size of an uploaded image: 10 MiB.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Prefix for downloaded result file names.
const DOWNLOAD_PREFIX: &str = "editor-ai";

/// Mime type assumed for files with an unrecognized extension.
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// Well-known image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
    /// GIF format.
    Gif,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Gif => "gif",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Attempts to detect format from a MIME type.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }
}

/// Where the bytes of a [`SourceImage`] live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageContent {
    /// Bytes already held in memory.
    Memory(Vec<u8>),
    /// A local file, read when the image is encoded.
    File(PathBuf),
}

/// A user-supplied image, held only for the duration of a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Declared MIME type, e.g. "image/jpeg".
    pub mime_type: String,
    /// Declared size in bytes.
    pub size_bytes: u64,
    /// Raw content.
    pub content: ImageContent,
}

impl SourceImage {
    /// Creates a source image from in-memory bytes.
    pub fn from_bytes(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            size_bytes: data.len() as u64,
            content: ImageContent::Memory(data),
        }
    }

    /// Creates a source image backed by a local file.
    ///
    /// The size comes from file metadata and the MIME type from the
    /// extension; the content itself is not read until encoding.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(EditorError::LocalRead)?;

        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .map(|f| f.mime_type())
            .unwrap_or(UNKNOWN_MIME_TYPE);

        Ok(Self {
            mime_type: mime_type.to_string(),
            size_bytes: metadata.len(),
            content: ImageContent::File(path.to_path_buf()),
        })
    }
}

/// An image encoded for inline transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    /// MIME type carried over from the source.
    pub mime_type: String,
    /// Standard base64 of the source bytes.
    pub data: String,
}

/// A request to generate one image from a prompt and reference images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Instruction for the model.
    pub prompt: String,
    /// Reference images in upload order.
    pub images: Vec<EncodedImage>,
}

impl GenerationRequest {
    /// Creates a request with the given prompt and no images.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
        }
    }

    /// Appends a reference image.
    pub fn with_image(mut self, image: EncodedImage) -> Self {
        self.images.push(image);
        self
    }

    /// Appends several reference images, keeping their order.
    pub fn with_images(mut self, images: impl IntoIterator<Item = EncodedImage>) -> Self {
        self.images.extend(images);
        self
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Text the model returned alongside the image, if any.
    pub text: Option<String>,
}

/// A generated image as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "generated image should be saved or displayed"]
pub struct GeneratedImage {
    /// MIME type reported by the service.
    pub mime_type: String,
    /// Base64 payload reported by the service.
    pub data: String,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(
        mime_type: impl Into<String>,
        data: impl Into<String>,
        metadata: GenerationMetadata,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
            metadata,
        }
    }

    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decodes the base64 payload.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| EditorError::Decode(e.to_string()))
    }

    /// Returns the known format, if the MIME type is recognized.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// File name used when downloading, e.g. `editor-ai-1700000000000.png`.
    pub fn download_file_name(&self, timestamp_ms: i64) -> String {
        let ext = self.format().unwrap_or_default().extension();
        format!("{DOWNLOAD_PREFIX}-{timestamp_ms}.{ext}")
    }

    /// Saves the decoded image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.decode()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Saves the image into `dir` under a timestamped download name.
    pub fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let name = self.download_file_name(chrono::Utc::now().timestamp_millis());
        let path = dir.as_ref().join(name);
        self.save(&path)?;
        Ok(path)
    }
}
