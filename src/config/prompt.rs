use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::sync::Arc;
use std::time::SystemTime;
use log::info;

const EMBEDDED_PROMPTS: &str = include_str!("../../json/prompts.json");

#[derive(Debug)]
pub enum PromptError {
    EmptySystemPrompt,
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::EmptySystemPrompt => write!(f, "Prompt file has an empty 'system_prompt'"),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub system_prompt: String,
    #[serde(skip)]
    pub last_loaded: Option<SystemTime>,
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if self.system_prompt.trim().is_empty() {
            return Err(PromptError::EmptySystemPrompt);
        }
        Ok(())
    }
}

pub fn load_prompts_from_str(json: &str) -> Result<PromptConfig, PromptError> {
    let mut config: PromptConfig = serde_json::from_str(json)?;
    config.validate()?;
    config.last_loaded = Some(SystemTime::now());
    Ok(config)
}

/// Loads the prompt file at `path`, or the built-in brewery prompt when no
/// path is configured.
pub fn load_prompts(path: Option<&str>) -> Result<Arc<PromptConfig>, Box<dyn Error + Send + Sync>> {
    let config = match path {
        Some(path) => {
            let file_content = fs
                ::read_to_string(path)
                .map_err(|e| format!("Failed to read prompts file '{}': {}", path, e))?;
            let config = load_prompts_from_str(&file_content).map_err(|e|
                format!("Failed to parse prompts file '{}': {}", path, e)
            )?;
            info!("Loaded system prompt from {}", path);
            config
        }
        None => load_prompts_from_str(EMBEDDED_PROMPTS)?,
    };
    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_prompt_is_valid() {
        let config = load_prompts(None).unwrap();
        assert!(config.system_prompt.contains("天領酒造"));
        assert!(config.last_loaded.is_some());
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let err = load_prompts_from_str(r#"{"system_prompt": "   "}"#).unwrap_err();
        assert!(matches!(err, PromptError::EmptySystemPrompt));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_prompts(Some("/nonexistent/prompts.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prompts.json"));
    }
}
