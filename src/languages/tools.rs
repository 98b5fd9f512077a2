/// Map a speech code onto an espeak voice name.
pub fn map_code_for_espeak(code: &str) -> &str {
    match code {
        "zh-CN" | "zh-TW" => "cmn",
        "iw" => "he",
        "no" => "nb",
        "ceb" => "en",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_without_a_voice_are_remapped() {
        assert_eq!(map_code_for_espeak("zh-CN"), "cmn");
        assert_eq!(map_code_for_espeak("iw"), "he");
        assert_eq!(map_code_for_espeak("fr"), "fr");
    }
}
