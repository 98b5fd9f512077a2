use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{BackendFuture, TranslationEngine};
use crate::translations;
use crate::translator::{ExplanationRequest, TranslationRequest};

pub(crate) const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
pub(crate) const DEFAULT_MODEL: &str = "Gemma_Translator";

/// Chat client for a local Ollama server.
#[derive(Debug, Clone)]
pub struct Ollama {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl Ollama {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url.trim().trim_end_matches('/').to_string()
        };
        Self {
            base_url,
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model;
        }
        self
    }

    async fn chat(&self, prompt: String) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false
        });
        debug!("ollama: POST {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("failed to reach ollama at {}", self.base_url))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(anyhow!(
                "Ollama API error ({}): {}",
                status,
                extract_ollama_error(&text).unwrap_or(text)
            ));
        }
        extract_message_content(&text)
    }
}

impl TranslationEngine for Ollama {
    fn translate<'a>(&'a self, request: &'a TranslationRequest) -> BackendFuture<'a, String> {
        Box::pin(async move {
            let prompt = translations::render_translation_prompt(request)?;
            self.chat(prompt).await
        })
    }

    fn explain<'a>(&'a self, request: &'a ExplanationRequest) -> BackendFuture<'a, String> {
        Box::pin(async move {
            let prompt = translations::render_explanation_prompt(request)?;
            self.chat(prompt).await
        })
    }
}

fn extract_message_content(text: &str) -> Result<String> {
    let payload: ChatResponse =
        serde_json::from_str(text).with_context(|| "failed to parse Ollama response JSON")?;
    let message = payload
        .message
        .ok_or_else(|| anyhow!("no message returned from Ollama"))?;
    Ok(message.content)
}

fn extract_ollama_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.error.filter(|message| !message.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_content_from_chat_response() {
        let body = concat!(
            r#"{"model":"Gemma_Translator","#,
            r#""message":{"role":"assistant","content":"  Bonjour\n"},"done":true}"#
        );
        assert_eq!(extract_message_content(body).unwrap(), "  Bonjour\n");
    }

    #[test]
    fn missing_message_is_an_error() {
        assert!(extract_message_content(r#"{"done":true}"#).is_err());
        assert!(extract_message_content("not json").is_err());
    }

    #[test]
    fn error_body_is_surfaced() {
        assert_eq!(
            extract_ollama_error(r#"{"error":"model 'x' not found"}"#).as_deref(),
            Some("model 'x' not found")
        );
        assert_eq!(extract_ollama_error("<html>"), None);
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(Ollama::new("").base_url, DEFAULT_BASE_URL);
        assert_eq!(
            Ollama::new("http://gpu-box:11434/").base_url,
            "http://gpu-box:11434"
        );
        assert_eq!(Ollama::new("").with_model("  ").model, DEFAULT_MODEL);
    }
}
