use serde_json::{Map, Value};

use crate::store::{ListQuery, Record, RecordStore, SortDirection, StoreError};

use super::engine::PlannedGroup;

/// Persist one planned group. `created_at` is an RFC 3339 stamp.
pub async fn create(
    store: &dyn RecordStore,
    table: &str,
    plan: &PlannedGroup,
    created_at: &str,
) -> Result<Record, StoreError> {
    let mut fields = Map::new();
    fields.insert(
        "DatePreference".into(),
        Value::String(plan.date_preference.clone()),
    );
    fields.insert("Vibe".into(), Value::String(plan.vibe.clone()));
    fields.insert("Members".into(), Value::String(plan.member_emails()));
    fields.insert("Size".into(), Value::from(plan.members.len()));
    fields.insert("CreatedAt".into(), Value::String(created_at.to_string()));
    store.create_record(table, fields).await
}

/// Newest first, as the site displays them.
pub async fn list_recent(
    store: &dyn RecordStore,
    table: &str,
) -> Result<Vec<Record>, StoreError> {
    store
        .list_records(table, ListQuery::sorted_by("CreatedAt", SortDirection::Desc))
        .await
}
