//! Operational endpoints used by deployment tooling: health, memory and
//! the authenticated kill/restart hooks.

use std::time::Duration;

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::AppState;
use crate::error::ApiError;
use crate::security::{bearer_token, secrets_match};

const NO_STORE: &str = "no-store, no-cache, must-revalidate";

/// Delay between answering and exiting so the response is flushed.
const EXIT_DELAY: Duration = Duration::from_millis(500);

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn uptime_seconds(state: &AppState) -> u64 {
    state.started_at.elapsed().as_secs_f64().round() as u64
}

pub async fn health(State(state): State<AppState>) -> Response {
    (
        [(CACHE_CONTROL, NO_STORE)],
        Json(json!({
            "ok": true,
            "uptimeSeconds": uptime_seconds(&state),
            "timestamp": timestamp(),
            "environment": state.config.environment.as_str(),
        })),
    )
        .into_response()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemoryUsage {
    #[serde(rename = "rssMB")]
    pub rss_mb: f64,
    #[serde(rename = "virtualMB")]
    pub virtual_mb: f64,
}

/// Round to one decimal place of a megabyte.
fn to_mb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 / 1024.0 * 10.0).round() / 10.0
}

/// Parse `/proc/self/statm` (`size resident ...`, in pages).
pub fn parse_statm(statm: &str, page_size: u64) -> Option<MemoryUsage> {
    let mut fields = statm.split_whitespace().map(|f| f.parse::<u64>().ok());
    let size = fields.next()??;
    let resident = fields.next()??;
    Some(MemoryUsage {
        rss_mb: to_mb(resident * page_size),
        virtual_mb: to_mb(size * page_size),
    })
}

fn read_memory_usage() -> Option<MemoryUsage> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    parse_statm(&statm, 4096)
}

pub async fn memory(State(state): State<AppState>) -> Response {
    (
        [(CACHE_CONTROL, NO_STORE)],
        Json(json!({
            "ok": true,
            "uptimeSeconds": uptime_seconds(&state),
            "memory": read_memory_usage(),
            "content": state.store.metrics(),
            "timestamp": timestamp(),
        })),
    )
        .into_response()
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Which exit hook is being called; only the wording differs.
#[derive(Debug, Clone, Copy)]
enum ExitHook {
    Kill,
    Restart,
}

impl ExitHook {
    fn tag(&self) -> &'static str {
        match self {
            ExitHook::Kill => "[KILL]",
            ExitHook::Restart => "[RESTART]",
        }
    }

    fn not_configured(&self) -> &'static str {
        match self {
            ExitHook::Kill => "Kill endpoint not configured",
            ExitHook::Restart => "Restart endpoint not configured",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ExitHook::Kill => {
                "Process termination initiated. The supervisor will start a new process."
            }
            ExitHook::Restart => "Restart initiated. The supervisor will restart the application.",
        }
    }
}

/// Checks shared by kill and restart, in order: secret configured,
/// environment allowed, bearer token valid.
fn authorize(state: &AppState, hook: ExitHook, headers: &HeaderMap) -> Result<(), ApiError> {
    let tag = hook.tag();
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    info!(
        "{} POST received (environment: {}, auth header present: {})",
        tag,
        state.config.environment.as_str(),
        authorization.is_some()
    );

    let Some(secret) = state.config.restart_secret_token.as_deref() else {
        error!("{} RESTART_SECRET_TOKEN not configured", tag);
        return Err(ApiError::Internal(hook.not_configured().to_string()));
    };

    if !state.is_production() && !state.config.restart_allow_in_dev {
        warn!("{} Blocked in non-production environment", tag);
        return Err(ApiError::Forbidden);
    }

    let valid = bearer_token(authorization)
        .map(|token| secrets_match(token, secret))
        .unwrap_or(false);
    if !valid {
        warn!("{} Unauthorized attempt", tag);
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

async fn exit_hook(state: AppState, hook: ExitHook, headers: HeaderMap) -> Result<Response, ApiError> {
    authorize(&state, hook, &headers)?;

    info!("{} Authorized, exiting in {:?}", hook.tag(), EXIT_DELAY);
    let exiter = state.exiter.clone();
    let tag = hook.tag();
    tokio::spawn(async move {
        tokio::time::sleep(EXIT_DELAY).await;
        info!("{} Exiting process", tag);
        exiter.exit(0);
    });

    Ok(Json(json!({
        "success": true,
        "message": hook.message(),
        "timestamp": timestamp(),
    }))
    .into_response())
}

pub async fn kill(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    exit_hook(state, ExitHook::Kill, headers).await
}

pub async fn restart(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    exit_hook(state, ExitHook::Restart, headers).await
}
