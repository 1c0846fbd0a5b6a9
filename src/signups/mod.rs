pub mod dto;
pub mod handlers;
pub mod repo;

use axum::{routing::post, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    // Non-POST methods get the JSON 405 envelope instead of axum's bare 405.
    Router::new().route(
        "/collector",
        post(handlers::submit_signup).fallback(handlers::method_not_allowed),
    )
}
