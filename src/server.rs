//! HTTP server: routes, request handling and lifecycle.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Liveness message |
//! | POST | `/clanrank` | Commit the JSON body and trigger the workflow |
//!
//! Layers, outermost first: request id, request tracing, panic catching. A
//! panic in a handler becomes a 500 with an `error` message rather than a
//! dropped connection.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::RelaySettings;
use crate::error::{RelayError, CONTENT_TYPE_ERROR};
use crate::relay::{relay_upload, RelayReport};
use crate::repository::Repository;

pub const LIVENESS_MESSAGE: &str = "Uploader is running. Use POST /clanrank";

/// Shared state for handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub settings: Arc<RelaySettings>,
}

impl AppState {
    pub fn new(repository: Arc<dyn Repository>, settings: RelaySettings) -> Self {
        AppState {
            repository,
            settings: Arc::new(settings),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/clanrank", post(upload_clanrank))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
}

/// GET /
pub async fn home() -> impl IntoResponse {
    Json(json!({ "status": "ok", "message": LIVENESS_MESSAGE }))
}

/// POST /clanrank
pub async fn upload_clanrank(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match handle_upload(&state, &headers, &body).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({ "status": "success", "filename": report.filename })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_upload(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<RelayReport, RelayError> {
    if !is_json_content_type(headers) {
        return Err(RelayError::Input(CONTENT_TYPE_ERROR.to_string()));
    }

    let payload: Value = serde_json::from_slice(body).map_err(RelayError::internal)?;

    let report = relay_upload(
        state.repository.as_ref(),
        &state.settings,
        &payload,
        Utc::now(),
    )
    .await?;

    info!(
        filename = %report.filename,
        dispatch = ?report.dispatch,
        "Upload relayed"
    );
    Ok(report)
}

/// `application/json` or any `application/*+json`, parameters ignored.
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal server error".to_string()
    };
    RelayError::Internal(message).into_response()
}

/// Adds an `X-Request-Id` header to every response.
async fn inject_request_id(mut req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;
    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", value);
    }
    response
}

/// Bind `addr` and serve until SIGINT or SIGTERM.
pub async fn start_server(app: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
