//! Error taxonomy for the orchestration core.
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied a bad language or tone.
    Validation,
    /// Input could not be turned into usable text.
    Content,
    /// An external engine failed.
    Backend,
    /// The session store cannot satisfy the request.
    State,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordWeaveError {
    #[error("Source and target languages cannot be the same.")]
    SameLanguage,
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("Unsupported tone: {0}")]
    UnsupportedTone(String),
    #[error("TTS not supported for: {0}")]
    UnsupportedSpeechLanguage(String),

    #[error("No readable text.")]
    EmptyContent,
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("Document is not valid UTF-8 text.")]
    InvalidEncoding,
    #[error("Input is not recognizable audio.")]
    UnrecognizedAudio,

    #[error("translation backend failed: {0}")]
    TranslationBackend(String),
    #[error("ocr backend failed: {0}")]
    OcrBackend(String),
    #[error("document extraction failed: {0}")]
    DocumentBackend(String),
    #[error("speech backend failed: {0}")]
    SpeechBackend(String),
    #[error("transcription backend failed: {0}")]
    TranscriptionBackend(String),
    #[error("failed to store audio: {0}")]
    ArtifactStorage(String),

    #[error("No translations to save.")]
    NoHistory,
}

impl WordWeaveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WordWeaveError::SameLanguage
            | WordWeaveError::UnsupportedLanguage(_)
            | WordWeaveError::UnsupportedTone(_)
            | WordWeaveError::UnsupportedSpeechLanguage(_) => ErrorKind::Validation,
            WordWeaveError::EmptyContent
            | WordWeaveError::UnsupportedFileType(_)
            | WordWeaveError::InvalidEncoding
            | WordWeaveError::UnrecognizedAudio => ErrorKind::Content,
            WordWeaveError::TranslationBackend(_)
            | WordWeaveError::OcrBackend(_)
            | WordWeaveError::DocumentBackend(_)
            | WordWeaveError::SpeechBackend(_)
            | WordWeaveError::TranscriptionBackend(_)
            | WordWeaveError::ArtifactStorage(_) => ErrorKind::Backend,
            WordWeaveError::NoHistory => ErrorKind::State,
        }
    }
}

pub type Result<T, E = WordWeaveError> = std::result::Result<T, E>;

/// Flatten an adapter error chain into a single message.
pub(crate) fn backend_message(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}
