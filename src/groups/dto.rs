use serde::Serialize;

use crate::store::Record;

/// Summary of one persisted group, as the batch endpoint reports it.
#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub id: String,
    pub pref: String,
    pub vibe: String,
    pub size: usize,
}

#[derive(Debug, Serialize)]
pub struct GroupingRan {
    pub ok: bool,
    pub groups: Vec<GroupSummary>,
    /// Groups the best-effort policy dropped after a rejected create.
    #[serde(skip_serializing_if = "is_zero")]
    pub skipped: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Debug, Serialize)]
pub struct GroupList {
    pub ok: bool,
    pub records: Vec<Record>,
}
