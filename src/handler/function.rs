use axum::http::Method;
use serde::{ Deserialize, Serialize };
use std::collections::BTreeMap;
use crate::handler::{ ChatHandler, HandlerResponse, HostingEnv };

/// Invocation event handed to a serverless function.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    pub http_method: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<HandlerResponse> for FunctionResponse {
    fn from(response: HandlerResponse) -> Self {
        let mut headers: BTreeMap<String, String> = response
            .cors_headers()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code: response.status.as_u16(),
            headers,
            body: response.body_string(),
        }
    }
}

fn is_health_path(path: Option<&str>) -> bool {
    path.map(|p| p.trim_end_matches('/').ends_with("/health")).unwrap_or(false)
}

pub async fn handle_event(handler: &ChatHandler, event: &FunctionEvent) -> FunctionResponse {
    let method = Method::from_bytes(event.http_method.to_uppercase().as_bytes())
        .unwrap_or(Method::TRACE);
    let response = if is_health_path(event.path.as_deref()) {
        handler.handle_health(HostingEnv::Function, &method)
    } else {
        let body = event.body.as_deref().unwrap_or("");
        handler.handle_chat(HostingEnv::Function, &method, body.as_bytes()).await
    };
    response.into()
}
