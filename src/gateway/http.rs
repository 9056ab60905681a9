//! HTTP surface for the gateway.
//!
//! Routes:
//! - `POST /api/sms`    : `{to, message, mode?, password?}` -> send outcome
//! - `POST /api/decode` : `{message, encoder?, salt?}` -> `{decoded}`
//! - `GET  /healthz`
//!
//! The client address is the socket peer unless `trust_forwarded_for` is set,
//! in which case the first `X-Forwarded-For` hop wins.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::dispatch::{ClientContext, DispatchGateway, DispatchRequest, Outcome, SendMode};
use crate::config::ServerConfig;
use crate::decoder::{decode_with_config, DecoderConfig};
use crate::text::SymbolAlphabet;
use crate::BROWSER_ID_COOKIE;

/// Body of `POST /api/sms`.
#[derive(Debug, Deserialize)]
struct SendPayload {
    to: Option<String>,
    message: Option<String>,
    mode: Option<SendMode>,
    password: Option<String>,
}

/// Body of `POST /api/decode`.
#[derive(Debug, Deserialize)]
struct DecodePayload {
    message: String,
    #[serde(default)]
    encoder: SymbolAlphabet,
    salt: Option<String>,
}

#[derive(Clone)]
struct AppState {
    gateway: Arc<DispatchGateway>,
    trust_forwarded_for: bool,
}

/// Builds the application router.
pub fn router(gateway: Arc<DispatchGateway>, server: &ServerConfig) -> Router {
    Router::new()
        .route("/api/sms", post(send_sms))
        .route("/api/decode", post(decode_message))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(AppState {
            gateway,
            trust_forwarded_for: server.trust_forwarded_for,
        })
}

/// Binds `server.bind` and serves until Ctrl-C.
pub async fn serve(gateway: Arc<DispatchGateway>, server: &ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&server.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        trust_forwarded_for = server.trust_forwarded_for,
        "gateway listening"
    );

    axum::serve(
        listener,
        router(gateway, server).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

async fn send_sms(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<SendPayload>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            debug!(error = %rejection, "unreadable send payload");
            return outcome_response(&Outcome::InvalidInput);
        }
    };

    let client = ClientContext {
        addr: client_addr(
            &headers,
            connect.map(|ConnectInfo(addr)| addr),
            state.trust_forwarded_for,
        ),
        browser_id: browser_id(&headers).unwrap_or_default(),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    };

    let request = DispatchRequest {
        destination: payload.to.unwrap_or_default(),
        body: payload.message.unwrap_or_default(),
        mode: payload.mode.unwrap_or_default(),
        override_credential: payload.password.filter(|p| !p.is_empty()),
        client,
    };

    let outcome = state.gateway.submit(&request).await;
    outcome_response(&outcome)
}

async fn decode_message(
    payload: Result<Json<DecodePayload>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(payload)) = payload else {
        return outcome_response(&Outcome::InvalidInput);
    };

    let decoded = decode_with_config(
        &payload.message,
        &DecoderConfig {
            alphabet: payload.encoder,
            salt: payload.salt.filter(|s| !s.is_empty()),
        },
    );

    (
        StatusCode::OK,
        Json(json!({ "decoded": decoded.message, "groups": decoded.groups })),
    )
}

/// Maps an outcome to a status code and JSON body.
fn outcome_response(outcome: &Outcome) -> (StatusCode, Json<Value>) {
    match outcome {
        Outcome::Dispatched { message_id, .. } => (
            StatusCode::OK,
            Json(json!({ "success": true, "sid": message_id })),
        ),
        Outcome::QuotaExceeded { .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": outcome.to_string(), "requirePassword": true })),
        ),
        Outcome::InvalidInput | Outcome::TooLong { .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": outcome.to_string() })),
        ),
        Outcome::Forbidden => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": outcome.to_string() })),
        ),
        Outcome::ProviderError { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": outcome.to_string() })),
        ),
    }
}

/// Socket peer, or the first `X-Forwarded-For` hop when behind a trusted proxy.
fn client_addr(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> IpAddr {
    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
    };

    trust_forwarded
        .then(forwarded)
        .flatten()
        .or_else(|| peer.map(|p| p.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Reads the browser identifier cookie.
fn browser_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == BROWSER_ID_COOKIE)
        .map(|(_, value)| value.to_string())
}
