pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod handler;
pub mod history;
pub mod language;
pub mod llm;
pub mod models;
pub mod server;

use cli::Args;
use handler::ChatHandler;
use handler::function::{ handle_event, FunctionEvent };
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{ AsyncReadExt, AsyncWriteExt };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Provider Key Present: {}", args.provider_configured());
    info!("History Max Stored: {}", args.history_max_stored);
    info!("History For Prompt: {}", args.history_for_prompt);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Fallback To Local: {}", args.fallback_to_local);
    info!("Deploy Environment: {}", args.deploy_env);
    info!("-------------------------");

    let handler = Arc::new(ChatHandler::from_args(&args)?);

    if args.function_event {
        return run_function_event(&handler).await;
    }

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, handler, args.clone());
    server.run().await?;

    Ok(())
}

/// Reads one function event from stdin and writes the response to stdout.
async fn run_function_event(handler: &ChatHandler) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut raw = String::new();
    tokio::io::stdin().read_to_string(&mut raw).await?;
    let event: FunctionEvent = serde_json
        ::from_str(&raw)
        .map_err(|e| format!("Invalid function event: {}", e))?;

    let response = handle_event(handler, &event).await;
    let mut out = serde_json::to_vec(&response)?;
    out.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;
    Ok(())
}
