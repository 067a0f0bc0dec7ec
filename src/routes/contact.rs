use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::config::DEFAULT_ROW_STATUS;
use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::pipeline::Forwarder;
use crate::submission::{intake, metadata, parser};

pub async fn submit(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ip = metadata::client_ip(&headers, addr.ip(), &state.config.trusted_proxies);

    let quota = match state.contact_limiter.check(ip) {
        Ok(quota) => quota,
        Err(quota) => {
            tracing::warn!("Rate limited contact submission from {ip}");
            return AppError::RateLimited(quota).into_response();
        }
    };

    let mut response = match handle(&state, &headers, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };
    quota.apply(response.headers_mut());
    response
}

async fn handle(
    state: &SharedState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let raw = parser::parse_body(content_type, body).map_err(AppError::Validation)?;
    let submission = intake::validate(&raw)?;

    let mailer = state
        .mailer
        .resolve()?
        .ok_or_else(|| AppError::Configuration("Mail transport is disabled".to_string()))?;
    let records = state.records.resolve()?;
    let status = state
        .config
        .sheet
        .as_ref()
        .map_or(DEFAULT_ROW_STATUS, |sheet| sheet.status.as_str());
    let forwarder = Arc::new(Forwarder::new(mailer, records, status));

    let reference = Uuid::now_v7();
    tracing::info!("[{reference}] Contact submission accepted");

    // Detached so a client hanging up cannot stop delivery halfway.
    let task = Arc::clone(&forwarder);
    let forwarded = tokio::spawn(async move { task.forward(reference, &submission).await })
        .await
        .map_err(|e| {
            AppError::Delivery(
                forwarder.unfinished_stage(),
                format!("[{reference}] Forwarder task failed: {e}"),
            )
        })??;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": forwarded.client_message() })),
    )
        .into_response())
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
