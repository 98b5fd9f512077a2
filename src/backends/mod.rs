//! Narrow interfaces to the external engines and their concrete adapters.
//!
//! Every engine is a black box: one request in, one result or failure out.
//! Adapters report failures as `anyhow::Error`; the service maps them onto the
//! matching backend error.

use anyhow::Result;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::settings::Settings;
use crate::translator::{ExplanationRequest, TranslationRequest};

mod espeak;
pub(crate) mod ollama;
mod pdftotext;
mod process;
pub(crate) mod tesseract;
pub(crate) mod whisper;

pub use espeak::Espeak;
pub use ollama::Ollama;
pub use pdftotext::Pdftotext;
pub use tesseract::Tesseract;
pub use whisper::Whisper;

pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BBoxPx {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// One recognized fragment. Position and confidence are carried through but
/// not used when building canonical text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrSegment {
    pub text: String,
    pub conf: f32,
    pub bbox: BBoxPx,
}

impl OcrSegment {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            conf: 100.0,
            bbox: BBoxPx {
                x: 0,
                y: 0,
                w: 0,
                h: 0,
            },
        }
    }
}

pub trait TranslationEngine: Send + Sync {
    fn translate<'a>(&'a self, request: &'a TranslationRequest) -> BackendFuture<'a, String>;
    fn explain<'a>(&'a self, request: &'a ExplanationRequest) -> BackendFuture<'a, String>;
}

pub trait OcrEngine: Send + Sync {
    fn recognize<'a>(&'a self, image: &'a [u8]) -> BackendFuture<'a, Vec<OcrSegment>>;
}

pub trait DocumentExtractor: Send + Sync {
    /// Text of each page in order; `None` for a page with no extractable text.
    fn pdf_pages<'a>(&'a self, pdf: &'a [u8]) -> BackendFuture<'a, Vec<Option<String>>>;
}

pub trait SpeechToText: Send + Sync {
    /// Transcribed spans in temporal order.
    fn transcribe<'a>(&'a self, audio: &'a [u8]) -> BackendFuture<'a, Vec<String>>;
}

pub trait TextToSpeech: Send + Sync {
    /// Encoded audio for `text` spoken in the language identified by `code`.
    fn synthesize<'a>(&'a self, text: &'a str, code: &'a str) -> BackendFuture<'a, Vec<u8>>;
}

#[derive(Clone)]
pub struct Backends {
    pub translation: Arc<dyn TranslationEngine>,
    pub ocr: Arc<dyn OcrEngine>,
    pub documents: Arc<dyn DocumentExtractor>,
    pub speech_to_text: Arc<dyn SpeechToText>,
    pub text_to_speech: Arc<dyn TextToSpeech>,
}

impl Backends {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            translation: Arc::new(
                Ollama::new(settings.ollama_base_url.clone()).with_model(&settings.ollama_model),
            ),
            ocr: Arc::new(Tesseract::new(settings.ocr_languages.clone())),
            documents: Arc::new(Pdftotext),
            speech_to_text: Arc::new(Whisper::new(settings.whisper_model.clone())),
            text_to_speech: Arc::new(Espeak),
        }
    }
}
