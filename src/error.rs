use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::rate_limit::Quota;

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const CONFIGURATION: &str = "Server configuration error. Please contact support.";
pub const TOO_MANY_REQUESTS: &str =
    "Too many requests from this IP, please try again after an hour";
pub const EMAIL_FAILED: &str = "Failed to send email. Please try again later.";
pub const RECORDS_FAILED: &str = "Failed to update records. Please try again later.";
pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";

/// Which outbound channel failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeliveryStage {
    Email,
    Records,
}

/// Every variant maps to a fixed client message; the attached detail is only
/// ever logged.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Configuration(String),
    Delivery(DeliveryStage, String),
    RateLimited(Quota),
    MethodNotAllowed,
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation: {msg}"),
            AppError::Configuration(msg) => write!(f, "Configuration: {msg}"),
            AppError::Delivery(DeliveryStage::Email, msg) => write!(f, "Email delivery: {msg}"),
            AppError::Delivery(DeliveryStage::Records, msg) => write!(f, "Records update: {msg}"),
            AppError::RateLimited(quota) => {
                write!(f, "Rate limited: retry after {}s", quota.reset_after)
            }
            AppError::MethodNotAllowed => write!(f, "Method not allowed"),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::Delivery(..) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn client_message(&self) -> &'static str {
        match self {
            AppError::Validation(_) => MISSING_FIELDS,
            AppError::Configuration(_) => CONFIGURATION,
            AppError::Delivery(DeliveryStage::Email, _) => EMAIL_FAILED,
            AppError::Delivery(DeliveryStage::Records, _) => RECORDS_FAILED,
            AppError::RateLimited(_) => TOO_MANY_REQUESTS,
            AppError::MethodNotAllowed => METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(msg) => tracing::debug!("Rejected submission: {msg}"),
            AppError::Configuration(msg) => tracing::error!("Configuration error: {msg}"),
            AppError::Delivery(DeliveryStage::Email, msg) => {
                tracing::error!("Error sending email: {msg}")
            }
            AppError::Delivery(DeliveryStage::Records, msg) => {
                tracing::error!("Error updating records: {msg}")
            }
            AppError::RateLimited(_) | AppError::MethodNotAllowed => {}
        }

        let body = json!({ "error": self.client_message() });
        let mut response = (self.status(), axum::Json(body)).into_response();

        match &self {
            AppError::RateLimited(quota) => quota.apply(response.headers_mut()),
            AppError::MethodNotAllowed => {
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static("POST"));
            }
            _ => {}
        }

        response
    }
}
