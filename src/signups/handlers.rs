use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{SignupCreated, SignupPayload};
use super::repo;

#[instrument(skip(state, payload))]
pub async fn submit_signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<Json<SignupCreated>, ApiError> {
    let store = state.store()?;
    let record = repo::create(store, &state.config.store.signups_table, payload).await?;
    info!(id = %record.id, "signup stored");
    Ok(Json(SignupCreated {
        ok: true,
        id: record.id,
    }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
