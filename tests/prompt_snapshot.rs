use wordweave::history::{HistoryEntry, SessionHistoryStore};
use wordweave::translations::{render_explanation_prompt, render_translation_prompt};
use wordweave::translator::{ExplanationRequest, TranslationRequest};

#[test]
fn translation_prompt() {
    let request = TranslationRequest {
        text: "Where is the railway station?".to_string(),
        source_language: "English".to_string(),
        target_language: "Hindi".to_string(),
        tone: "Formal".to_string(),
    };
    let prompt = render_translation_prompt(&request).unwrap();
    insta::assert_snapshot!(prompt);
}

#[test]
fn explanation_prompt() {
    let request = ExplanationRequest {
        text: "Bonjour, ça va ?".to_string(),
        source_language: "English".to_string(),
        target_language: "French".to_string(),
    };
    let prompt = render_explanation_prompt(&request).unwrap();
    insta::assert_snapshot!(prompt);
}

#[test]
fn history_listing() {
    let store = SessionHistoryStore::new();
    store.record(HistoryEntry {
        input_text: "Good morning".to_string(),
        source_language: "English".to_string(),
        target_language: "Spanish".to_string(),
        tone: "Friendly".to_string(),
        translated_text: "¡Buenos días!".to_string(),
    });
    store.record(HistoryEntry {
        input_text: "[Image OCR: menu.png]".to_string(),
        source_language: "French".to_string(),
        target_language: "English".to_string(),
        tone: "Neutral".to_string(),
        translated_text: "Soup of the day".to_string(),
    });
    insta::assert_snapshot!(store.format_history());
}
