use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

use crate::backends::TranslationEngine;
use crate::error::{Result, WordWeaveError, backend_message};
use crate::validate::validate;

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").expect("parenthetical pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
    pub tone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

/// Issues validated requests to the translation engine.
///
/// Validation runs here on every call, whatever the caller already checked:
/// no request reaches the engine without passing it.
#[derive(Clone)]
pub struct Translator {
    engine: Arc<dyn TranslationEngine>,
}

impl Translator {
    pub fn new(engine: Arc<dyn TranslationEngine>) -> Self {
        Self { engine }
    }

    pub async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        validate(
            &request.source_language,
            &request.target_language,
            Some(&request.tone),
        )?;
        info!(
            "translate: {} -> {} ({}), {} chars",
            request.source_language,
            request.target_language,
            request.tone,
            request.text.chars().count()
        );
        let output = self
            .engine
            .translate(request)
            .await
            .map_err(|err| WordWeaveError::TranslationBackend(backend_message(&err)))?;
        Ok(output.trim().to_string())
    }

    pub async fn explain(&self, request: &ExplanationRequest) -> Result<String> {
        validate(&request.source_language, &request.target_language, None)?;
        info!(
            "explain: {} -> {}",
            request.source_language, request.target_language
        );
        let output = self
            .engine
            .explain(request)
            .await
            .map_err(|err| WordWeaveError::TranslationBackend(backend_message(&err)))?;
        Ok(output.trim().to_string())
    }
}

/// Drop parenthesized asides (and the whitespace before them) so they are not
/// read aloud. Nested parentheses are not balanced.
pub fn prepare_for_speech(text: &str) -> String {
    let cleaned = PARENTHETICAL.replace_all(text, "");
    debug!(
        "speech: stripped {} char(s) of annotations",
        text.len() - cleaned.len()
    );
    cleaned.trim().to_string()
}
