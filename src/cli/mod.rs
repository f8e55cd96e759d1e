use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openai)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., https://api.openai.com)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let the adapter handle it if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider. When empty the chat endpoint reports a configuration error.
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion
    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-3.5-turbo")]
    pub chat_model: String,

    // --- History Store Args ---
    /// Maximum turns kept per session; the oldest user/assistant pair is dropped beyond this.
    #[arg(long, env = "HISTORY_MAX_STORED", default_value = "20")]
    pub history_max_stored: usize,

    /// Number of most recent turns sent to the provider with each message.
    #[arg(long, env = "HISTORY_FOR_PROMPT", default_value = "10")]
    pub history_for_prompt: usize,

    // --- Prompt / Response Args ---
    /// Optional JSON file overriding the built-in system prompt ({"system_prompt": "..."}).
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Optional JSON file overriding the built-in canned fallback responses.
    #[arg(long, env = "FALLBACK_RESPONSES_PATH")]
    pub fallback_responses_path: Option<String>,

    /// Answer with a canned reply instead of an error when the provider call fails.
    #[arg(long, env = "FALLBACK_TO_LOCAL", default_value = "false")]
    pub fallback_to_local: bool,

    // --- General App Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    /// Deployment environment reported by the health endpoint.
    #[arg(long, env = "DEPLOY_ENV", default_value = "development")]
    pub deploy_env: String,

    /// Handle a single serverless function event read from stdin, print the response and exit.
    #[arg(long, default_value = "false")]
    pub function_event: bool,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

impl Args {
    pub fn provider_configured(&self) -> bool {
        !self.chat_api_key.trim().is_empty()
    }
}
