//! The request boundary: one method per external operation.

use std::sync::Arc;
use tracing::info;

use crate::artifacts::{ArtifactManager, EphemeralArtifact};
use crate::backends::{Backends, DocumentExtractor, OcrEngine, SpeechToText};
use crate::error::{Result, WordWeaveError, backend_message};
use crate::history::{FavouriteOutcome, HistoryEntry, SessionHistoryStore};
use crate::normalize::{self, DocumentKind, normalize_extension};
use crate::settings::Settings;
use crate::translator::{ExplanationRequest, TranslationRequest, Translator};
use crate::validate::validate;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn is_image_extension(extension: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&normalize_extension(extension).as_str())
}

/// An uploaded file: raw bytes plus the extension hint taken from its name.
#[derive(Debug, Clone)]
pub struct Upload<'a> {
    pub bytes: &'a [u8],
    pub extension: &'a str,
    pub file_name: Option<&'a str>,
}

impl Upload<'_> {
    fn label(&self, prefix: &str) -> String {
        let name = self
            .file_name
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload.{}", normalize_extension(self.extension)));
        format!("[{}: {}]", prefix, name)
    }
}

pub struct WordWeave {
    translator: Translator,
    ocr: Arc<dyn OcrEngine>,
    documents: Arc<dyn DocumentExtractor>,
    speech_to_text: Arc<dyn SpeechToText>,
    artifacts: ArtifactManager,
    history: Arc<SessionHistoryStore>,
}

impl WordWeave {
    pub fn new(backends: Backends, settings: &Settings, history: Arc<SessionHistoryStore>) -> Self {
        Self {
            translator: Translator::new(backends.translation),
            ocr: backends.ocr,
            documents: backends.documents,
            speech_to_text: backends.speech_to_text,
            artifacts: ArtifactManager::new(
                backends.text_to_speech,
                settings.artifact_dir(),
                settings.artifact_ttl(),
            ),
            history,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Backends::from_settings(settings),
            settings,
            Arc::new(SessionHistoryStore::new()),
        )
    }

    pub fn history_store(&self) -> &SessionHistoryStore {
        &self.history
    }

    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        tone: &str,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Err(WordWeaveError::EmptyContent);
        }
        self.translate_and_record(
            text.to_string(),
            text.to_string(),
            source_language,
            target_language,
            tone,
        )
        .await
    }

    pub async fn translate_from_image(
        &self,
        upload: Upload<'_>,
        source_language: &str,
        target_language: &str,
        tone: &str,
    ) -> Result<String> {
        if !is_image_extension(upload.extension) {
            return Err(WordWeaveError::UnsupportedFileType(upload.extension.to_string()));
        }
        validate(source_language, target_language, Some(tone))?;

        let segments = self
            .ocr
            .recognize(upload.bytes)
            .await
            .map_err(|err| WordWeaveError::OcrBackend(backend_message(&err)))?;
        let text = normalize::from_ocr_segments(&segments)?;
        info!("image: {} segment(s), {} chars", segments.len(), text.chars().count());
        self.translate_and_record(
            upload.label("Image OCR"),
            text,
            source_language,
            target_language,
            tone,
        )
        .await
    }

    pub async fn translate_from_document(
        &self,
        upload: Upload<'_>,
        source_language: &str,
        target_language: &str,
        tone: &str,
    ) -> Result<String> {
        let kind = DocumentKind::from_extension(upload.extension)?;
        validate(source_language, target_language, Some(tone))?;

        let text =
            normalize::from_document_bytes(upload.bytes, kind, self.documents.as_ref()).await?;
        info!("document: {:?}, {} chars", kind, text.chars().count());
        self.translate_and_record(
            upload.label("Document OCR"),
            text,
            source_language,
            target_language,
            tone,
        )
        .await
    }

    pub async fn explain(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Err(WordWeaveError::EmptyContent);
        }
        self.translator
            .explain(&ExplanationRequest {
                text: text.to_string(),
                source_language: source_language.to_string(),
                target_language: target_language.to_string(),
            })
            .await
    }

    pub async fn synthesize_speech(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        self.artifacts.synthesize_speech(text, language).await
    }

    /// Synthesize speech into a temporary file that deletes itself.
    pub async fn speak(&self, text: &str, language: &str) -> Result<EphemeralArtifact> {
        let audio = self.synthesize_speech(text, language).await?;
        self.artifacts.materialize_ephemeral(&audio)
    }

    pub async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        if !infer::is_audio(audio) {
            return Err(WordWeaveError::UnrecognizedAudio);
        }
        let spans = self
            .speech_to_text
            .transcribe(audio)
            .await
            .map_err(|err| WordWeaveError::TranscriptionBackend(backend_message(&err)))?;
        normalize::from_transcript(&spans)
    }

    pub fn history(&self) -> String {
        self.history.format_history()
    }

    pub fn favourites(&self) -> String {
        self.history.format_favourites()
    }

    pub fn save_latest_to_favourites(&self) -> Result<FavouriteOutcome> {
        self.history.add_favourite()
    }

    async fn translate_and_record(
        &self,
        input_label: String,
        text: String,
        source_language: &str,
        target_language: &str,
        tone: &str,
    ) -> Result<String> {
        let request = TranslationRequest {
            text,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            tone: tone.to_string(),
        };
        let translated = self.translator.translate(&request).await?;
        self.history.record(HistoryEntry {
            input_text: input_label,
            source_language: request.source_language,
            target_language: request.target_language,
            tone: request.tone,
            translated_text: translated.clone(),
        });
        Ok(translated)
    }
}
