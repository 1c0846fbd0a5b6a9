use tracing::{error, info, warn};

use crate::config::GroupingPolicy;
use crate::error::ApiError;
use crate::signups;
use crate::state::AppState;
use crate::util::now_rfc3339;

use super::dto::GroupSummary;
use super::engine;
use super::repo;

/// Result of one grouping run: what was persisted and how many planned groups
/// the best-effort policy dropped.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub groups: Vec<GroupSummary>,
    pub skipped: usize,
}

/// Fetch, plan, persist. Group creation and member flagging are two separate
/// store writes with no transaction between them; a flag failure leaves the
/// group in place and is reported at error level, since those members will be
/// picked up again by the next run.
pub async fn run_grouping(state: &AppState) -> Result<RunOutcome, ApiError> {
    let store = state.store()?;
    let cfg = &state.config;

    let pending = signups::repo::list_ungrouped(store, &cfg.store.signups_table).await?;
    let planned = engine::plan_groups(&pending, cfg.group_size);
    info!(
        signups = pending.len(),
        planned = planned.len(),
        "grouping run planned"
    );

    let mut outcome = RunOutcome::default();
    for plan in &planned {
        let created_at = now_rfc3339();
        let record = match repo::create(store, &cfg.store.groups_table, plan, &created_at).await {
            Ok(record) => record,
            Err(e) => match cfg.grouping_policy {
                GroupingPolicy::FailFast => return Err(e.into()),
                GroupingPolicy::BestEffort => {
                    warn!(
                        error = %e,
                        pref = %plan.date_preference,
                        vibe = %plan.vibe,
                        size = plan.members.len(),
                        "group create rejected; skipping"
                    );
                    outcome.skipped += 1;
                    continue;
                }
            },
        };

        let member_ids = plan.member_ids();
        if let Err(e) =
            signups::repo::mark_grouped(store, &cfg.store.signups_table, &member_ids).await
        {
            // The group now exists while its members are still flagged
            // ungrouped, so a later run can assign them again.
            error!(
                error = %e,
                group_id = %record.id,
                members = ?member_ids,
                "group created but members were not flagged as grouped"
            );
        }

        outcome.groups.push(GroupSummary {
            id: record.id,
            pref: plan.date_preference.clone(),
            vibe: plan.vibe.clone(),
            size: plan.members.len(),
        });
    }

    Ok(outcome)
}
