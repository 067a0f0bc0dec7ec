pub mod config;
pub mod email;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod records;
pub mod routes;
pub mod state;
pub mod submission;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::email::{MailTransport, SmtpMailer};
use crate::rate_limit::ContactRateLimiter;
use crate::records::sheets::SheetsClient;
use crate::records::RecordStore;
use crate::state::{AppState, Channel, SharedState};

/// Resolve outbound collaborators from `config` and build the router.
pub fn build_app(config: Config) -> (Router, SharedState) {
    let mailer = build_mailer(&config);
    let records = build_records(&config);
    let state = new_state(config, mailer, records);
    (router(state.clone()), state)
}

pub fn new_state(
    config: Config,
    mailer: Channel<dyn MailTransport>,
    records: Channel<dyn RecordStore>,
) -> SharedState {
    let contact_limiter = ContactRateLimiter::new(config.rate_limit, config.rate_limit_window);
    Arc::new(AppState {
        config,
        mailer,
        records,
        contact_limiter,
    })
}

fn build_mailer(config: &Config) -> Channel<dyn MailTransport> {
    let Some(smtp) = config.smtp.as_ref() else {
        tracing::warn!("EMAIL_USER or EMAIL_PASS is missing; contact submissions will fail");
        return Channel::Unavailable("EMAIL_USER or EMAIL_PASS is missing".to_string());
    };

    match SmtpMailer::new(smtp, &config.recipients, config.outbound_timeout) {
        Ok(mailer) => {
            tracing::info!(
                "SMTP configured via {} for {} recipient(s)",
                smtp.host,
                mailer.recipients().len()
            );
            Channel::Ready(Arc::new(mailer))
        }
        Err(e) => {
            tracing::warn!("SMTP not available: {e}");
            Channel::Unavailable(e)
        }
    }
}

fn build_records(config: &Config) -> Channel<dyn RecordStore> {
    let Some(sheet) = config.sheet.as_ref() else {
        tracing::info!("No leads sheet configured; submissions are emailed only");
        return Channel::Disabled;
    };

    let Some(token) = sheet.token.as_deref() else {
        tracing::warn!("Leads sheet configured without CONTACT_SHEETS_TOKEN");
        return Channel::Unavailable("CONTACT_SHEETS_TOKEN is missing".to_string());
    };

    match SheetsClient::new(sheet, token, config.outbound_timeout) {
        Ok(client) => {
            tracing::info!("Leads sheet '{}' configured", sheet.sheet_name);
            Channel::Ready(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("Leads sheet not available: {e}");
            Channel::Unavailable(e)
        }
    }
}

pub fn router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                // Innermost, so preflights it answers are still traced and get the headers above.
                .option_layer(cors),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{origin}': {e}");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

async fn health() -> &'static str {
    "ok"
}
