use crate::cli::Args;
use crate::handler::{ ChatHandler, HostingEnv, ALLOW_HEADERS, ALLOW_ORIGIN, CHAT_METHODS };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    body::Bytes,
    routing::any,
    Router,
    extract::State,
    response::IntoResponse,
    http::{ header, HeaderValue, Method, StatusCode },
};
use tower_http::set_header::SetResponseHeaderLayer;
use log::info;

#[derive(Clone)]
struct AppState {
    handler: Arc<ChatHandler>,
}

/// Routes for the long-running server. Router-level responses (404 and the
/// like) get the same CORS headers as the chat core.
pub fn router(handler: Arc<ChatHandler>) -> Router {
    let app_state = AppState { handler };

    Router::new()
        .route("/api/chat", any(chat_handler))
        .route("/api/health", any(health_handler))
        .route("/health", any(health_handler))
        .fallback(not_found_handler)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CHAT_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .with_state(app_state)
}

pub async fn start_http_server(
    addr: &str,
    handler: Arc<ChatHandler>,
    args: &Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let app = router(handler);

    match (args.enable_tls, args.tls_cert_path.as_ref(), args.tls_key_path.as_ref()) {
        (true, Some(cert_path), Some(key_path)) => {
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                cert_path,
                key_path
            ).await?;

            info!("Starting HTTPS API server on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        (true, _, _) => {
            return Err("ENABLE_TLS requires both TLS_CERT_PATH and TLS_KEY_PATH".into());
        }
        _ => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;
            info!("Starting HTTP API server on: http://{}", addr);
            axum::serve(listener, app.into_make_service()).await?;
        }
    }

    Ok(())
}

async fn chat_handler(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> impl IntoResponse {
    state.handler.handle_chat(HostingEnv::Server, &method, &body).await
}

async fn health_handler(
    State(state): State<AppState>,
    method: Method,
) -> impl IntoResponse {
    state.handler.handle_health(HostingEnv::Server, &method)
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}
