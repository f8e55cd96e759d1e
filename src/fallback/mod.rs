use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::sync::Arc;
use crate::language::{ detect_language_extended, Language };

const EMBEDDED_RESPONSES: &str = include_str!("../../json/fallback_responses.json");

#[derive(Deserialize, Debug, Clone)]
pub struct KeywordRule {
    pub keywords: Vec<String>,
    pub response: String,
}

impl KeywordRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct LanguageTable {
    #[serde(default)]
    pub rules: Vec<KeywordRule>,
    pub default: String,
}

impl LanguageTable {
    fn respond(&self, lowered: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(lowered))
            .map(|rule| rule.response.as_str())
            .unwrap_or(self.default.as_str())
    }
}

/// Static replies used when the completion provider cannot be reached.
/// Rules are evaluated in file order; the first rule with any keyword
/// contained in the lowercased message wins.
#[derive(Debug, Clone)]
pub struct CannedResponses {
    tables: HashMap<Language, LanguageTable>,
}

impl CannedResponses {
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let tables: HashMap<Language, LanguageTable> = serde_json
            ::from_str(json)
            .map_err(|e| format!("Failed to parse canned responses: {}", e))?;
        if !tables.contains_key(&Language::En) {
            return Err("Canned responses must include an 'en' table".into());
        }
        Ok(Self { tables })
    }

    pub fn embedded() -> Result<Self, Box<dyn Error + Send + Sync>> {
        Self::from_json(EMBEDDED_RESPONSES)
    }

    pub fn load(path: Option<&str>) -> Result<Arc<Self>, Box<dyn Error + Send + Sync>> {
        let responses = match path {
            Some(path) => {
                let content = fs
                    ::read_to_string(path)
                    .map_err(|e| format!("Failed to read canned responses '{}': {}", path, e))?;
                Self::from_json(&content)?
            }
            None => Self::embedded()?,
        };
        Ok(Arc::new(responses))
    }

    /// Detects the message language and answers from that language's table.
    pub fn respond(&self, message: &str) -> &str {
        self.respond_in(detect_language_extended(message), message)
    }

    pub fn respond_in(&self, language: Language, message: &str) -> &str {
        let lowered = message.to_lowercase();
        let table = self.tables
            .get(&language)
            .or_else(|| self.tables.get(&Language::En));
        match table {
            Some(table) => table.respond(&lowered),
            None => "",
        }
    }
}
