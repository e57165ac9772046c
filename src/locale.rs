//! User-facing message catalog.

use crate::error::{truncate_chars, EditorError, MissingInput};
use serde::{Deserialize, Serialize};

/// Maximum characters of model text quoted back to the user.
const QUOTED_TEXT_LIMIT: usize = 200;

/// Language for user-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    English,
    /// Bahasa Indonesia.
    Indonesian,
}

impl Locale {
    /// Returns the language tag (e.g., "en").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Indonesian => "id",
        }
    }

    /// Parses a language tag. Region suffixes are ignored ("id-ID").
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        match primary.to_lowercase().as_str() {
            "en" => Some(Self::English),
            "id" => Some(Self::Indonesian),
            _ => None,
        }
    }

    /// Canned prompt offered by the enhancer's "auto" shortcut.
    pub fn auto_prompt(&self) -> &'static str {
        // Sent to the model verbatim, so it stays English in every locale.
        "Professional product photography, cinematic lighting, 4k resolution, \
         bokeh background, minimalistic elegant stand, commercial quality."
    }

    /// Renders the short message for `err`.
    pub fn error_message(&self, err: &EditorError) -> String {
        match self {
            Self::English => english(err),
            Self::Indonesian => indonesian(err),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| format!("unsupported locale: {s}"))
    }
}

fn megabytes(bytes: u64) -> u64 {
    (bytes as f64 / 1024.0 / 1024.0).round() as u64
}

fn english(err: &EditorError) -> String {
    match err {
        EditorError::InvalidFileType { .. } => {
            "Invalid file type. Please upload an image.".to_string()
        }
        EditorError::FileTooLarge { max_bytes, .. } => {
            format!("File is too large (max {}MB).", megabytes(*max_bytes))
        }
        EditorError::TooManyFiles { max, .. } => format!("At most {max} photos are allowed."),
        EditorError::MissingInput(MissingInput::NoImage) => {
            "Please upload a product photo first.".to_string()
        }
        EditorError::MissingInput(MissingInput::TooFewImages { required, .. }) => {
            format!("Upload at least {required} photos to mix.")
        }
        EditorError::MissingInput(MissingInput::EmptyPrompt) => {
            "Please enter an instruction or use the automatic prompt.".to_string()
        }
        EditorError::LocalRead(_) => "Failed to read the local file.".to_string(),
        EditorError::Api { message, .. } => format!("API error: {message}"),
        EditorError::SafetyRejected { .. } => {
            "The image could not be generated for safety reasons (safety filter). \
             Try rephrasing your prompt with a safer description."
                .to_string()
        }
        EditorError::UnexpectedTextResponse { text } => {
            format!(
                "The AI replied with text: \"{}...\"",
                truncate_chars(text, QUOTED_TEXT_LIMIT)
            )
        }
        EditorError::EmptyResponse => {
            "Failed to generate an image. Please try again.".to_string()
        }
        EditorError::Cancelled => "The request was cancelled.".to_string(),
        EditorError::Busy => "A generation is already in progress.".to_string(),
        EditorError::Config(_) => {
            "API key not found. Keep the key on your server and call that endpoint instead."
                .to_string()
        }
        EditorError::Network(_) => "Could not reach the AI server.".to_string(),
        EditorError::Decode(_) => "The generated image could not be decoded.".to_string(),
        EditorError::Io(e) => format!("Could not save the image: {e}"),
    }
}

fn indonesian(err: &EditorError) -> String {
    match err {
        EditorError::InvalidFileType { .. } => {
            "Tipe file tidak valid. Harap unggah gambar.".to_string()
        }
        EditorError::FileTooLarge { max_bytes, .. } => {
            format!("Ukuran file terlalu besar (maks {}MB).", megabytes(*max_bytes))
        }
        EditorError::TooManyFiles { max, .. } => {
            format!("Maksimal {max} foto yang diperbolehkan.")
        }
        EditorError::MissingInput(MissingInput::NoImage) => {
            "Silakan unggah foto produk terlebih dahulu.".to_string()
        }
        EditorError::MissingInput(MissingInput::TooFewImages { required, .. }) => {
            format!("Unggah minimal {required} foto untuk digabungkan.")
        }
        EditorError::MissingInput(MissingInput::EmptyPrompt) => {
            "Silakan masukkan deskripsi atau gunakan prompt otomatis.".to_string()
        }
        EditorError::LocalRead(_) => "Gagal membaca file lokal.".to_string(),
        EditorError::Api { message, .. } => format!("API Error: {message}"),
        EditorError::SafetyRejected { .. } => {
            "Gambar tidak dapat dibuat karena alasan keamanan (Safety Filter). \
             Coba ganti prompt Anda dengan deskripsi yang lebih aman."
                .to_string()
        }
        EditorError::UnexpectedTextResponse { text } => {
            format!(
                "AI merespon teks: \"{}...\"",
                truncate_chars(text, QUOTED_TEXT_LIMIT)
            )
        }
        EditorError::EmptyResponse => {
            "Gagal menghasilkan gambar. Silakan coba lagi.".to_string()
        }
        EditorError::Cancelled => "Permintaan dibatalkan.".to_string(),
        EditorError::Busy => "Proses sedang berjalan.".to_string(),
        EditorError::Config(_) => {
            "API key tidak ditemukan. Simpan kunci di server Anda dan panggil endpoint server tersebut dari klien."
                .to_string()
        }
        EditorError::Network(_) => "Gagal menghubungi server AI.".to_string(),
        EditorError::Decode(_) => "Gambar hasil tidak dapat dibaca.".to_string(),
        EditorError::Io(e) => format!("Gagal menyimpan gambar: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Locale::from_tag("en"), Some(Locale::English));
        assert_eq!(Locale::from_tag("id-ID"), Some(Locale::Indonesian));
        assert_eq!(Locale::from_tag("ID"), Some(Locale::Indonesian));
        assert_eq!(Locale::from_tag("fr"), None);
        assert!("xx".parse::<Locale>().is_err());
    }

    #[test]
    fn test_type_and_size_messages_are_distinct() {
        let wrong_type = EditorError::InvalidFileType {
            mime_type: "application/pdf".into(),
        };
        let too_big = EditorError::FileTooLarge {
            size_bytes: 11 * 1024 * 1024,
            max_bytes: 10 * 1024 * 1024,
        };
        for locale in [Locale::English, Locale::Indonesian] {
            assert_ne!(
                locale.error_message(&wrong_type),
                locale.error_message(&too_big)
            );
        }
        assert_eq!(
            Locale::English.error_message(&too_big),
            "File is too large (max 10MB)."
        );
    }

    #[test]
    fn test_api_message_carries_detail() {
        let err = EditorError::Api {
            status: 429,
            message: "quota exceeded".into(),
        };
        assert!(Locale::English.error_message(&err).contains("quota exceeded"));
        assert!(Locale::Indonesian
            .error_message(&err)
            .contains("quota exceeded"));
    }

    #[test]
    fn test_text_response_is_quoted_and_truncated() {
        let err = EditorError::UnexpectedTextResponse {
            text: "a".repeat(300),
        };
        let msg = Locale::English.error_message(&err);
        assert!(msg.contains(&"a".repeat(200)));
        assert!(!msg.contains(&"a".repeat(201)));
    }

    #[test]
    fn test_indonesian_cancelled() {
        assert_eq!(
            EditorError::Cancelled.user_message(Locale::Indonesian),
            "Permintaan dibatalkan."
        );
    }
}
