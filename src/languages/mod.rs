//! Fixed vocabulary of language names, tones and speech codes.
//!
//! Matching is exact and case-sensitive: callers must pass names spelled the
//! way they appear here.

mod tools;

pub use tools::map_code_for_espeak;

/// Supported language names, sorted.
pub const LANGUAGE_NAMES: [&str; 52] = [
    "Albanian",
    "Arabic",
    "Assamese",
    "Azerbaijani",
    "Belarusian",
    "Bengali",
    "Bosnian",
    "Bulgarian",
    "Burmese",
    "Cantonese",
    "Catalan",
    "Cebuano",
    "Croatian",
    "Czech",
    "Danish",
    "Dutch",
    "English",
    "Estonian",
    "Finnish",
    "French",
    "German",
    "Greek",
    "Hebrew",
    "Hindi",
    "Hungarian",
    "Indonesian",
    "Italian",
    "Japanese",
    "Korean",
    "Latvian",
    "Lithuanian",
    "Malay",
    "Norwegian",
    "Persian",
    "Polish",
    "Portuguese",
    "Punjabi",
    "Romanian",
    "Russian",
    "Serbian",
    "Simplified Chinese",
    "Slovak",
    "Slovenian",
    "Spanish",
    "Swedish",
    "Thai",
    "Traditional Chinese",
    "Turkish",
    "Ukrainian",
    "Urdu",
    "Vietnamese",
    "Zulu",
];

pub const TONE_NAMES: [&str; 8] = [
    "Neutral",
    "Formal",
    "Informal",
    "Friendly",
    "Sarcastic",
    "Angry",
    "Relaxed",
    "Enthusiastic",
];

const SPEECH_CODES: [(&str, &str); 52] = [
    ("Albanian", "sq"),
    ("Arabic", "ar"),
    ("Assamese", "as"),
    ("Azerbaijani", "az"),
    ("Belarusian", "be"),
    ("Bengali", "bn"),
    ("Bosnian", "bs"),
    ("Bulgarian", "bg"),
    ("Burmese", "my"),
    ("Cantonese", "yue"),
    ("Catalan", "ca"),
    ("Cebuano", "ceb"),
    ("Croatian", "hr"),
    ("Czech", "cs"),
    ("Danish", "da"),
    ("Dutch", "nl"),
    ("English", "en"),
    ("Estonian", "et"),
    ("Finnish", "fi"),
    ("French", "fr"),
    ("German", "de"),
    ("Greek", "el"),
    ("Hebrew", "iw"),
    ("Hindi", "hi"),
    ("Hungarian", "hu"),
    ("Indonesian", "id"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Latvian", "lv"),
    ("Lithuanian", "lt"),
    ("Malay", "ms"),
    ("Norwegian", "no"),
    ("Persian", "fa"),
    ("Polish", "pl"),
    ("Portuguese", "pt"),
    ("Punjabi", "pa"),
    ("Romanian", "ro"),
    ("Russian", "ru"),
    ("Serbian", "sr"),
    ("Simplified Chinese", "zh-CN"),
    ("Slovak", "sk"),
    ("Slovenian", "sl"),
    ("Spanish", "es"),
    ("Swedish", "sv"),
    ("Thai", "th"),
    ("Traditional Chinese", "zh-TW"),
    ("Turkish", "tr"),
    ("Ukrainian", "uk"),
    ("Urdu", "ur"),
    ("Vietnamese", "vi"),
    ("Zulu", "zu"),
];

pub fn is_supported_language(name: &str) -> bool {
    LANGUAGE_NAMES.binary_search(&name).is_ok()
}

pub fn is_supported_tone(name: &str) -> bool {
    TONE_NAMES.contains(&name)
}

/// Speech synthesis code for a language name, if one is registered.
pub fn code_for(name: &str) -> Option<&'static str> {
    SPEECH_CODES
        .iter()
        .find(|(language, _)| *language == name)
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_sorted_for_binary_search() {
        let mut sorted = LANGUAGE_NAMES;
        sorted.sort();
        assert_eq!(sorted, LANGUAGE_NAMES);
    }

    #[test]
    fn lookups_are_case_sensitive() {
        assert!(is_supported_language("Simplified Chinese"));
        assert!(!is_supported_language("simplified chinese"));
        assert!(!is_supported_language("Klingon"));
        assert!(is_supported_tone("Sarcastic"));
        assert!(!is_supported_tone("sarcastic"));
    }

    #[test]
    fn speech_codes_resolve() {
        assert_eq!(code_for("English"), Some("en"));
        assert_eq!(code_for("Simplified Chinese"), Some("zh-CN"));
        assert_eq!(code_for("english"), None);
        for (name, _) in SPEECH_CODES {
            assert!(is_supported_language(name), "{name} missing from names");
        }
    }
}
