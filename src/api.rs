//! HTTP surface: webhook intake, health, and admin endpoints.
//!
//! The webhook is ack-first: POST always answers 200 with a short body
//! and the payload is queued for the engine, which does all
//! classification and processing afterwards. Spawned as a background
//! task from `Engine::run()`.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use usher_core::traits::Transport;
use usher_sessions::SessionStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    tx: mpsc::Sender<Value>,
    store: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    admin_key: Option<String>,
    uptime: Instant,
}

impl ApiState {
    pub fn new(
        tx: mpsc::Sender<Value>,
        store: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        admin_key: String,
    ) -> Self {
        let admin_key = if admin_key.is_empty() {
            None
        } else {
            Some(admin_key)
        };
        Self {
            tx,
            store,
            transport,
            admin_key,
            uptime: Instant::now(),
        }
    }
}

/// Constant-time string comparison to prevent timing attacks on token validation.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check bearer token auth for admin routes. Returns `None` if
/// authorized, `Some(response)` if rejected. Without a configured key
/// the admin routes are disabled outright.
fn check_admin_auth(
    headers: &HeaderMap,
    admin_key: &Option<String>,
) -> Option<(StatusCode, Json<Value>)> {
    let key = match admin_key {
        Some(k) => k,
        None => {
            return Some((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "admin endpoints disabled"})),
            ));
        }
    };

    let header = match headers.get("authorization") {
        Some(h) => h,
        None => {
            return Some((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "missing Authorization header"})),
            ));
        }
    };

    let value = match header.to_str() {
        Ok(v) => v,
        Err(_) => {
            return Some((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid Authorization header"})),
            ));
        }
    };

    match value.strip_prefix("Bearer ") {
        Some(token) if constant_time_eq(token, key) => None, // Authorized.
        _ => Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid token"})),
        )),
    }
}

/// Parse a webhook body as JSON, falling back to URL-encoded form
/// fields flattened into a JSON object. Transports differ on which
/// they send.
fn parse_payload(body: &[u8]) -> Option<Value> {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        return Some(value);
    }

    let text = std::str::from_utf8(body).ok()?;
    if text.trim().is_empty() {
        return None;
    }
    let mut fields = serde_json::Map::new();
    for pair in text.trim().split('&') {
        if pair.is_empty() {
            continue;
        }
        // A pair without '=' is not form data.
        let (key, value) = pair.split_once('=')?;
        let key = urlencoding::decode(key).ok()?;
        let value = value.replace('+', " ");
        let value = urlencoding::decode(&value).ok()?;
        if key.is_empty() {
            continue;
        }
        fields.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    if fields.is_empty() {
        None
    } else {
        Some(Value::Object(fields))
    }
}

/// `GET /webhook`: static confirmation that the endpoint is up.
/// Transport consoles probe this when registering the callback URL.
async fn webhook_confirm() -> &'static str {
    "Usher webhook endpoint is active.\n"
}

/// `POST /webhook`: accept an inbound transport event.
///
/// Always answers 200: redelivery storms from the transport help
/// nobody. Parse failures and queue pressure are logged, never
/// surfaced.
async fn webhook_receive(State(state): State<ApiState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let request_id = Uuid::new_v4().to_string();

    let Some(payload) = parse_payload(&body) else {
        warn!(request_id = %request_id, "unparseable webhook payload, acknowledging anyway");
        return (
            StatusCode::OK,
            Json(json!({"status": "ignored", "request_id": request_id})),
        );
    };

    match state.tx.try_send(payload) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(request_id = %request_id, "event queue full, dropping webhook payload");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            error!(request_id = %request_id, "event queue closed, dropping webhook payload");
        }
    }

    (
        StatusCode::OK,
        Json(json!({"status": "received", "request_id": request_id})),
    )
}

/// `GET /health`: liveness, version, uptime and session count.
async fn health(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime.elapsed().as_secs(),
        "active_sessions": state.store.count().await,
    }))
}

/// `POST /admin/transport/restart`: rebuild the transport client.
/// The recovery path for persistent send failures is a human calling
/// this, not an automatic retry loop.
async fn transport_restart(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = check_admin_auth(&headers, &state.admin_key) {
        return Err(err);
    }

    info!("transport restart requested");
    state.transport.restart().await.map_err(|e| {
        error!("transport restart failed: {e}");
        (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": format!("restart failed: {e}")})),
        )
    })?;

    Ok(Json(
        json!({"status": "restarted", "transport": state.transport.name()}),
    ))
}

fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/webhook", get(webhook_confirm).post(webhook_receive))
        .route("/health", get(health))
        .route("/admin/transport/restart", post(transport_restart))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .with_state(state)
}

/// Start the API server. Called from `Engine::run()`.
pub async fn serve(host: &str, port: u16, state: ApiState) {
    let app = build_router(state);
    let addr = format!("{host}:{port}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("API server failed to bind to {addr}: {e}");
            return;
        }
    };

    info!("API server listening on {addr}");
    if let Err(e) = axum::serve(listener, app).await {
        error!("API server error: {e}");
    }
}
