//! Base64 encoding of source images for inline transport.

use crate::error::{EditorError, Result};
use crate::image::types::{EncodedImage, ImageContent, SourceImage};
use base64::Engine;
use futures::future::try_join_all;

/// Encodes one source image, tagging it with its declared MIME type.
///
/// File-backed images are read here; a failed read surfaces as
/// [`EditorError::LocalRead`].
pub async fn encode(image: &SourceImage) -> Result<EncodedImage> {
    let data = match &image.content {
        ImageContent::Memory(bytes) => encode_bytes(bytes),
        ImageContent::File(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                tracing::warn!(path = %path.display(), "failed to read source image: {e}");
                EditorError::LocalRead(e)
            })?;
            encode_bytes(&bytes)
        }
    };

    Ok(EncodedImage {
        mime_type: image.mime_type.clone(),
        data,
    })
}

/// Encodes all images concurrently, preserving input order.
///
/// Fails as a whole if any single image fails.
pub async fn encode_all(images: &[SourceImage]) -> Result<Vec<EncodedImage>> {
    try_join_all(images.iter().map(encode)).await
}

fn encode_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_encode_round_trips_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let image = SourceImage::from_bytes("image/png", bytes.clone());

        let encoded = encode(&image).await.unwrap();
        assert_eq!(encoded.mime_type, "image/png");

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&encoded.data)
            .unwrap();
        assert_eq!(decoded, bytes);
    }

    #[tokio::test]
    async fn test_encode_is_deterministic() {
        let image = SourceImage::from_bytes("image/jpeg", b"same bytes".to_vec());
        let first = encode(&image).await.unwrap();
        let second = encode(&image).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_encode_reads_file_backed_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"file content").unwrap();

        let image = SourceImage::from_path(&path).await.unwrap();
        let encoded = encode(&image).await.unwrap();
        assert_eq!(encoded.data, encode_bytes(b"file content"));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_local_read_error() {
        let image = SourceImage {
            mime_type: "image/png".into(),
            size_bytes: 10,
            content: ImageContent::File(PathBuf::from("/no/such/dir/photo.png")),
        };
        let err = encode(&image).await.unwrap_err();
        assert!(matches!(err, EditorError::LocalRead(_)));
    }

    #[tokio::test]
    async fn test_encode_all_preserves_order() {
        let images = vec![
            SourceImage::from_bytes("image/png", b"first".to_vec()),
            SourceImage::from_bytes("image/jpeg", b"second".to_vec()),
            SourceImage::from_bytes("image/webp", b"third".to_vec()),
        ];

        let encoded = encode_all(&images).await.unwrap();
        let mimes: Vec<_> = encoded.iter().map(|e| e.mime_type.as_str()).collect();
        assert_eq!(mimes, ["image/png", "image/jpeg", "image/webp"]);
        assert_eq!(encoded[1].data, encode_bytes(b"second"));
    }

    #[tokio::test]
    async fn test_encode_all_fails_if_any_fails() {
        let images = vec![
            SourceImage::from_bytes("image/png", b"ok".to_vec()),
            SourceImage {
                mime_type: "image/png".into(),
                size_bytes: 1,
                content: ImageContent::File(PathBuf::from("/no/such/file.png")),
            },
        ];
        assert!(matches!(
            encode_all(&images).await,
            Err(EditorError::LocalRead(_))
        ));
    }
}
