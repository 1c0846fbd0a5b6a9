use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{GroupList, GroupingRan};
use super::{repo, services};

#[instrument(skip(state))]
pub async fn run_grouping(State(state): State<AppState>) -> Result<Json<GroupingRan>, ApiError> {
    let outcome = services::run_grouping(&state).await?;
    info!(
        groups = outcome.groups.len(),
        skipped = outcome.skipped,
        "grouping run finished"
    );
    Ok(Json(GroupingRan {
        ok: true,
        groups: outcome.groups,
        skipped: outcome.skipped,
    }))
}

#[instrument(skip(state))]
pub async fn list_groups(State(state): State<AppState>) -> Result<Json<GroupList>, ApiError> {
    let store = state.store()?;
    let records = repo::list_recent(store, &state.config.store.groups_table).await?;
    Ok(Json(GroupList { ok: true, records }))
}
