use serde_json::{Map, Value};

use crate::store::{ListQuery, Record, RecordStore, RecordUpdate, StoreError};
use crate::util::now_rfc3339;

use super::dto::SignupPayload;

/// One signup row, narrowed to the fields the grouping run reads.
#[derive(Debug, Clone)]
pub struct Signup {
    pub id: String,
    pub email: Option<String>,
    pub date_preference: Option<String>,
    pub sections: Option<String>,
    pub coffee_personality: Option<String>,
}

impl Signup {
    pub fn from_record(record: &Record) -> Self {
        let text = |name: &str| {
            record
                .fields
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            id: record.id.clone(),
            email: text("Email"),
            date_preference: text("DatePreference"),
            sections: text("Sections"),
            coffee_personality: text("CoffeePersonality"),
        }
    }
}

pub async fn create(
    store: &dyn RecordStore,
    table: &str,
    payload: SignupPayload,
) -> Result<Record, StoreError> {
    store.create_record(table, record_fields(payload)).await
}

pub async fn list_ungrouped(
    store: &dyn RecordStore,
    table: &str,
) -> Result<Vec<Signup>, StoreError> {
    let records = store
        .list_records(table, ListQuery::filter("NOT({Grouped})"))
        .await?;
    Ok(records.iter().map(Signup::from_record).collect())
}

pub async fn mark_grouped(
    store: &dyn RecordStore,
    table: &str,
    ids: &[String],
) -> Result<(), StoreError> {
    let updates = ids
        .iter()
        .map(|id| {
            let mut fields = Map::new();
            fields.insert("Grouped".into(), Value::Bool(true));
            RecordUpdate {
                id: id.clone(),
                fields,
            }
        })
        .collect();
    store.update_records(table, updates).await
}

/// Store-field mapping for a new signup. Blanks are stored as empty strings,
/// the timestamp falls back to the submission time, and `Grouped` always
/// starts false.
fn record_fields(payload: SignupPayload) -> Map<String, Value> {
    let text = |value: Option<String>| Value::String(value.unwrap_or_default());
    let timestamp = payload
        .timestamp
        .filter(|t| !t.is_empty())
        .unwrap_or_else(now_rfc3339);

    let mut fields = Map::new();
    fields.insert("Email".into(), text(payload.email));
    fields.insert("Phone".into(), text(payload.phone));
    fields.insert("DatePreference".into(), text(payload.date_preference));
    fields.insert(
        "Sections".into(),
        Value::String(payload.sections.map(|s| s.joined()).unwrap_or_default()),
    );
    fields.insert("SectionOther".into(), text(payload.section_other));
    fields.insert("Timestamp".into(), Value::String(timestamp));
    fields.insert("Grouped".into(), Value::Bool(false));
    fields.insert(
        "CoffeePersonality".into(),
        text(payload.coffee_personality),
    );
    fields.insert("LullResponse".into(), text(payload.lull_response));
    fields.insert("UnknownSocial".into(), text(payload.unknown_social));
    fields.insert("EnjoyGatherings".into(), text(payload.enjoy_gatherings));
    fields.insert(
        "BackgroundSoundtrack".into(),
        text(payload.background_soundtrack),
    );
    fields.insert(
        "WildOrderReaction".into(),
        text(payload.wild_order_reaction),
    );
    fields
}
