use crate::error::{Result, WordWeaveError};
use crate::languages;

/// Check a language pair (and optional tone) against the vocabulary.
///
/// Rules are applied in order and the first failure is returned: identical
/// languages, unknown source, unknown target, unknown tone.
pub fn validate(source: &str, target: &str, tone: Option<&str>) -> Result<()> {
    if source == target {
        return Err(WordWeaveError::SameLanguage);
    }
    if !languages::is_supported_language(source) {
        return Err(WordWeaveError::UnsupportedLanguage(source.to_string()));
    }
    if !languages::is_supported_language(target) {
        return Err(WordWeaveError::UnsupportedLanguage(target.to_string()));
    }
    if let Some(tone) = tone
        && !languages::is_supported_tone(tone)
    {
        return Err(WordWeaveError::UnsupportedTone(tone.to_string()));
    }
    Ok(())
}
