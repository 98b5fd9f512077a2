use serde::{Deserialize, Serialize};

use crate::history::{FavouriteOutcome, HistoryEntry};

#[derive(Debug, Deserialize)]
pub(crate) struct TranslateRequest {
    pub(crate) text: String,
    pub(crate) source_language: String,
    pub(crate) target_language: String,
    pub(crate) tone: String,
}

/// Image or document upload; `data_name` doubles as the extension hint when
/// `extension` is absent.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadRequest {
    pub(crate) data_base64: String,
    #[serde(default)]
    pub(crate) data_name: Option<String>,
    #[serde(default)]
    pub(crate) extension: Option<String>,
    pub(crate) source_language: String,
    pub(crate) target_language: String,
    pub(crate) tone: String,
}

impl UploadRequest {
    pub(crate) fn extension_hint(&self) -> String {
        if let Some(extension) = self.extension.as_deref() {
            return extension.to_string();
        }
        self.data_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExplainRequest {
    pub(crate) text: String,
    pub(crate) source_language: String,
    pub(crate) target_language: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpeechRequest {
    pub(crate) text: String,
    pub(crate) language: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranscribeRequest {
    pub(crate) data_base64: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TranslateResponse {
    pub(crate) translated_text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExplainResponse {
    pub(crate) explanation: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SpeechResponse {
    pub(crate) audio_base64: String,
    pub(crate) mime: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TranscribeResponse {
    pub(crate) text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryResponse {
    pub(crate) formatted: String,
    pub(crate) entries: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FavouriteResponse {
    pub(crate) outcome: FavouriteOutcome,
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LanguagesResponse {
    pub(crate) languages: Vec<&'static str>,
    pub(crate) tones: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}
