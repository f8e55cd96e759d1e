use serde::{ Serialize, Deserialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message attributed to a role. Never mutated after construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: Role,
    content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Body accepted by the chat endpoint. Fields are kept as raw JSON so a
/// mistyped optional field never rejects an otherwise valid message.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default)]
    pub session_id: Option<serde_json::Value>,
    /// Accepted for compatibility with existing clients. Detection never reads it.
    #[serde(default)]
    pub language: Option<serde_json::Value>,
}

impl ChatRequest {
    /// The string `sessionId`, or `"default"` when absent or not a string.
    pub fn session_id(&self) -> &str {
        match &self.session_id {
            Some(serde_json::Value::String(s)) => s.as_str(),
            _ => "default",
        }
    }

    pub fn language(&self) -> &str {
        match &self.language {
            Some(serde_json::Value::String(s)) => s.as_str(),
            _ => "auto",
        }
    }

    /// The message text, if present as a non-empty string.
    pub fn message_text(&self) -> Option<&str> {
        match &self.message {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSuccess {
    pub success: bool,
    pub response: String,
    pub detected_language: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatFailure {
    pub success: bool,
    pub error: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub environment: String,
    pub provider_configured: bool,
    /// Same value under the key existing health consumers read.
    pub openai_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_serializes_with_lowercase_role() {
        let turn = ConversationTurn::assistant("hi");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "assistant", "content": "hi" }));
    }

    #[test]
    fn chat_request_defaults_session_and_language() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"hello"}"#).unwrap();
        assert_eq!(req.session_id(), "default");
        assert_eq!(req.language(), "auto");
        assert_eq!(req.message_text(), Some("hello"));
    }

    #[test]
    fn empty_or_non_string_message_is_missing() {
        let empty: ChatRequest = serde_json::from_str(r#"{"message":""}"#).unwrap();
        assert!(empty.message_text().is_none());

        let number: ChatRequest = serde_json::from_str(r#"{"message":42}"#).unwrap();
        assert!(number.message_text().is_none());

        let absent: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(absent.message_text().is_none());
    }

    #[test]
    fn mistyped_optional_fields_fall_back_to_defaults() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"message":"hello","sessionId":42,"language":["ja"]}"#
        ).unwrap();
        assert_eq!(req.message_text(), Some("hello"));
        assert_eq!(req.session_id(), "default");
        assert_eq!(req.language(), "auto");

        let null_session: ChatRequest = serde_json::from_str(
            r#"{"message":"hello","sessionId":null}"#
        ).unwrap();
        assert_eq!(null_session.session_id(), "default");
    }
}
