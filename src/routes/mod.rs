pub mod contact;

use axum::routing::post;
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new().route(
        "/api/contact",
        post(contact::submit).fallback(contact::method_not_allowed),
    )
}
