use anyhow::{Context, Result};
use tera::{Context as TeraContext, Tera};

use crate::translator::{ExplanationRequest, TranslationRequest};

const TRANSLATE_TEMPLATE: &str = include_str!("prompts/translate.tera");
const EXPLAIN_TEMPLATE: &str = include_str!("prompts/explain.tera");

pub fn render_translation_prompt(request: &TranslationRequest) -> Result<String> {
    let mut context = TeraContext::new();
    context.insert("source_language", &request.source_language);
    context.insert("target_language", &request.target_language);
    context.insert("tone", &request.tone);
    context.insert("text", &request.text);
    Tera::one_off(TRANSLATE_TEMPLATE, &context, false)
        .with_context(|| "failed to render translation prompt")
}

pub fn render_explanation_prompt(request: &ExplanationRequest) -> Result<String> {
    let mut context = TeraContext::new();
    context.insert("source_language", &request.source_language);
    context.insert("target_language", &request.target_language);
    context.insert("text", &request.text);
    Tera::one_off(EXPLAIN_TEMPLATE, &context, false)
        .with_context(|| "failed to render explanation prompt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_keeps_text_unescaped() {
        let request = TranslationRequest {
            text: "Fish & <chips>".to_string(),
            source_language: "English".to_string(),
            target_language: "French".to_string(),
            tone: "Friendly".to_string(),
        };
        let prompt = render_translation_prompt(&request).expect("prompt");
        assert!(prompt.starts_with("Translate the following English text to French"));
        assert!(prompt.contains("in a Friendly tone:"));
        assert!(prompt.ends_with("\n\nFish & <chips>"));
    }
}
