use serde::{ Deserialize, Serialize };
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ja,
    Zh,
    Ko,
    En,
    Fr,
    Es,
}

impl Language {
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::Zh => "zh",
            Language::Ko => "ko",
            Language::En => "en",
            Language::Fr => "fr",
            Language::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

fn is_cjk_ideograph(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}')
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7AF}')
}

const FRENCH_MARKS: &[char] = &['à', 'â', 'ä', 'ç', 'è', 'é', 'ê', 'ë', 'î', 'ï', 'ô', 'ù', 'û', 'ü'];
const SPANISH_MARKS: &[char] = &['á', 'é', 'í', 'ó', 'ú', 'ñ', 'ü', '¿', '¡'];

fn detect_asian(text: &str) -> Option<Language> {
    if text.chars().any(is_kana) {
        return Some(Language::Ja);
    }
    if text.chars().any(is_cjk_ideograph) {
        return Some(Language::Zh);
    }
    if text.chars().any(is_hangul) {
        return Some(Language::Ko);
    }
    None
}

/// Classifies text as `ja`, `zh`, `ko` or `en`. Kana anywhere wins over
/// ideographs, so mixed kanji/kana text is Japanese.
pub fn detect_language(text: &str) -> Language {
    detect_asian(text).unwrap_or(Language::En)
}

/// Same as [`detect_language`], additionally recognising French and Spanish
/// from their diacritics. French marks are checked first.
pub fn detect_language_extended(text: &str) -> Language {
    if let Some(lang) = detect_asian(text) {
        return lang;
    }
    let lowered = text.to_lowercase();
    if lowered.chars().any(|c| FRENCH_MARKS.contains(&c)) {
        return Language::Fr;
    }
    if lowered.chars().any(|c| SPANISH_MARKS.contains(&c)) {
        return Language::Es;
    }
    Language::En
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kana_is_japanese() {
        assert_eq!(detect_language("こんにちは"), Language::Ja);
        assert_eq!(detect_language("カタカナ"), Language::Ja);
        assert_eq!(detect_language("日本酒はおいしい"), Language::Ja);
    }

    #[test]
    fn ideographs_without_kana_are_chinese() {
        assert_eq!(detect_language("你好"), Language::Zh);
        assert_eq!(detect_language("推荐哪个酒"), Language::Zh);
    }

    #[test]
    fn hangul_is_korean() {
        assert_eq!(detect_language("안녕하세요"), Language::Ko);
    }

    #[test]
    fn latin_defaults_to_english() {
        assert_eq!(detect_language("Hello there"), Language::En);
        assert_eq!(detect_language(""), Language::En);
        // the server variant never reports fr/es
        assert_eq!(detect_language("Très bien"), Language::En);
    }

    #[test]
    fn extended_detects_french_and_spanish() {
        assert_eq!(detect_language_extended("Très bien"), Language::Fr);
        assert_eq!(detect_language_extended("ÇA VA"), Language::Fr);
        assert_eq!(detect_language_extended("¿Cuál recomienda?"), Language::Es);
        assert_eq!(detect_language_extended("mañana"), Language::Es);
        assert_eq!(detect_language_extended("plain text"), Language::En);
        assert_eq!(detect_language_extended("こんにちは café"), Language::Ja);
    }

    #[test]
    fn detection_is_deterministic() {
        for text in ["こんにちは", "你好", "안녕", "hi", "¡hola!"] {
            assert_eq!(detect_language_extended(text), detect_language_extended(text));
            assert_eq!(detect_language(text), detect_language(text));
        }
    }

    #[test]
    fn tags_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Ko).unwrap(), "\"ko\"");
        assert_eq!(Language::Es.to_string(), "es");
    }
}
