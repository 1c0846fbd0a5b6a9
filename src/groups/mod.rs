pub mod dto;
pub mod engine;
pub mod handlers;
pub mod repo;
mod services;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // the batch is triggered by a scheduler or by hand, so both verbs work
        .route(
            "/group",
            get(handlers::run_grouping).post(handlers::run_grouping),
        )
        .route("/list-groups", get(handlers::list_groups))
}
