use anyhow::Context;
use axum::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One row in the external store. `fields` stays raw JSON so tables with
/// different schemas share the same client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter_by_formula: Option<String>,
    pub sort: Option<(String, SortDirection)>,
}

impl ListQuery {
    pub fn filter(formula: impl Into<String>) -> Self {
        Self {
            filter_by_formula: Some(formula.into()),
            sort: None,
        }
    }

    pub fn sorted_by(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            filter_by_formula: None,
            sort: Some((field.into(), direction)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordUpdate {
    pub id: String,
    pub fields: Map<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Non-2xx answer from the store; `message` is the store's own error text.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected store response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::Api { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            StoreError::Transport(_) | StoreError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_records(&self, table: &str, query: ListQuery)
        -> Result<Vec<Record>, StoreError>;
    async fn create_record(
        &self,
        table: &str,
        fields: Map<String, Value>,
    ) -> Result<Record, StoreError>;
    async fn update_records(
        &self,
        table: &str,
        updates: Vec<RecordUpdate>,
    ) -> Result<(), StoreError>;
}

/// Airtable REST client.
pub struct AirtableStore {
    client: reqwest::Client,
    api_url: reqwest::Url,
    base_id: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<Record>,
    offset: Option<String>,
}

impl AirtableStore {
    pub fn new(api_url: &str, base_id: &str, api_key: &str) -> anyhow::Result<Self> {
        let api_url = reqwest::Url::parse(api_url).context("invalid store api url")?;
        anyhow::ensure!(
            !api_url.cannot_be_a_base(),
            "store api url must be an http(s) url"
        );
        Ok(Self {
            client: reqwest::Client::new(),
            api_url,
            base_id: base_id.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> reqwest::Url {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .expect("checked at construction: url can be a base")
            .pop_if_empty()
            .extend([self.base_id.as_str(), table]);
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, StoreError> {
        let response = request.bearer_auth(&self.api_key).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn list_records(
        &self,
        table: &str,
        query: ListQuery,
    ) -> Result<Vec<Record>, StoreError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let mut url = self.table_url(table);
            {
                let mut pairs = url.query_pairs_mut();
                if let Some(formula) = &query.filter_by_formula {
                    pairs.append_pair("filterByFormula", formula);
                }
                if let Some((field, direction)) = &query.sort {
                    pairs.append_pair("sort[0][field]", field);
                    pairs.append_pair("sort[0][direction]", direction.as_str());
                }
                if let Some(offset) = &offset {
                    pairs.append_pair("offset", offset);
                }
            }
            let body = self.send(self.client.get(url)).await?;
            let page: ListResponse = serde_json::from_value(body)?;
            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }
        Ok(records)
    }

    async fn create_record(
        &self,
        table: &str,
        fields: Map<String, Value>,
    ) -> Result<Record, StoreError> {
        let request = self
            .client
            .post(self.table_url(table))
            .json(&json!({ "fields": fields }));
        let body = self.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn update_records(
        &self,
        table: &str,
        updates: Vec<RecordUpdate>,
    ) -> Result<(), StoreError> {
        // the store caps batch updates at 10 records per call
        for chunk in updates.chunks(10) {
            let request = self
                .client
                .patch(self.table_url(table))
                .json(&json!({ "records": chunk }));
            self.send(request).await?;
        }
        Ok(())
    }
}

/// Mirrors the store's error payload shapes: `{error:{message}}`,
/// `{error:"…"}`, anything else falls back to the whole body.
fn error_message(body: &Value) -> String {
    match body.get("error") {
        Some(Value::Object(inner)) => inner
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Some(Value::String(message)) => message.clone(),
        _ => body.to_string(),
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory `RecordStore` for tests. Understands the two query shapes the
    /// app issues: a `NOT({Field})` filter and a single-field sort.
    #[derive(Default)]
    pub struct MemoryStore {
        tables: Mutex<HashMap<String, Vec<Record>>>,
        next_id: Mutex<u32>,
        fail_creates: Mutex<u32>,
        fail_updates: Mutex<u32>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a record directly, bypassing the failure knobs.
        pub fn insert(&self, table: &str, fields: Map<String, Value>) -> String {
            let id = self.fresh_id();
            self.tables
                .lock()
                .unwrap()
                .entry(table.to_string())
                .or_default()
                .push(Record {
                    id: id.clone(),
                    created_time: None,
                    fields,
                });
            id
        }

        pub fn records(&self, table: &str) -> Vec<Record> {
            self.tables
                .lock()
                .unwrap()
                .get(table)
                .cloned()
                .unwrap_or_default()
        }

        pub fn fail_next_creates(&self, n: u32) {
            *self.fail_creates.lock().unwrap() = n;
        }

        pub fn fail_next_updates(&self, n: u32) {
            *self.fail_updates.lock().unwrap() = n;
        }

        fn fresh_id(&self) -> String {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("rec{:06}", *next)
        }

        fn take_failure(counter: &Mutex<u32>) -> bool {
            let mut n = counter.lock().unwrap();
            if *n > 0 {
                *n -= 1;
                true
            } else {
                false
            }
        }
    }

    fn not_formula_field(formula: &str) -> Option<&str> {
        formula.strip_prefix("NOT({")?.strip_suffix("})")
    }

    fn truthy(value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64() != Some(0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn list_records(
            &self,
            table: &str,
            query: ListQuery,
        ) -> Result<Vec<Record>, StoreError> {
            let mut rows = self.records(table);
            if let Some(formula) = &query.filter_by_formula {
                if let Some(field) = not_formula_field(formula) {
                    rows.retain(|r| !truthy(r.fields.get(field)));
                }
            }
            if let Some((field, direction)) = &query.sort {
                rows.sort_by(|a, b| {
                    let left = a.fields.get(field).and_then(Value::as_str).unwrap_or("");
                    let right = b.fields.get(field).and_then(Value::as_str).unwrap_or("");
                    match direction {
                        SortDirection::Asc => left.cmp(right),
                        SortDirection::Desc => right.cmp(left),
                    }
                });
            }
            Ok(rows)
        }

        async fn create_record(
            &self,
            table: &str,
            fields: Map<String, Value>,
        ) -> Result<Record, StoreError> {
            if Self::take_failure(&self.fail_creates) {
                return Err(StoreError::Api {
                    status: 422,
                    message: "create rejected".into(),
                });
            }
            let id = self.insert(table, fields);
            Ok(self
                .records(table)
                .into_iter()
                .find(|r| r.id == id)
                .expect("just inserted"))
        }

        async fn update_records(
            &self,
            table: &str,
            updates: Vec<RecordUpdate>,
        ) -> Result<(), StoreError> {
            if Self::take_failure(&self.fail_updates) {
                return Err(StoreError::Api {
                    status: 422,
                    message: "update rejected".into(),
                });
            }
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.entry(table.to_string()).or_default();
            for update in updates {
                let Some(row) = rows.iter_mut().find(|r| r.id == update.id) else {
                    return Err(StoreError::Api {
                        status: 404,
                        message: format!("record {} not found", update.id),
                    });
                };
                for (key, value) in update.fields {
                    row.fields.insert(key, value);
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_the_nested_message() {
        let body = json!({ "error": { "type": "INVALID_REQUEST", "message": "boom" } });
        assert_eq!(error_message(&body), "boom");
    }

    #[test]
    fn error_message_accepts_a_bare_string() {
        let body = json!({ "error": "NOT_FOUND" });
        assert_eq!(error_message(&body), "NOT_FOUND");
    }

    #[test]
    fn error_message_falls_back_to_the_body() {
        let body = json!({ "error": { "type": "INVALID_REQUEST" } });
        assert_eq!(error_message(&body), body.to_string());
        let body = json!({ "unexpected": true });
        assert_eq!(error_message(&body), body.to_string());
    }

    #[test]
    fn table_url_escapes_table_names() {
        let store = AirtableStore::new("https://api.airtable.com/v0", "appXYZ", "key").unwrap();
        assert_eq!(
            store.table_url("My Signups").as_str(),
            "https://api.airtable.com/v0/appXYZ/My%20Signups"
        );
    }

    #[test]
    fn table_url_tolerates_trailing_slash() {
        let store = AirtableStore::new("https://api.airtable.com/v0/", "appXYZ", "key").unwrap();
        assert_eq!(
            store.table_url("Groups").as_str(),
            "https://api.airtable.com/v0/appXYZ/Groups"
        );
    }

    #[test]
    fn record_maps_created_time() {
        let record: Record = serde_json::from_value(json!({
            "id": "rec1",
            "createdTime": "2025-06-01T00:00:00.000Z",
            "fields": { "Email": "a@b.c" }
        }))
        .unwrap();
        assert_eq!(record.created_time.as_deref(), Some("2025-06-01T00:00:00.000Z"));
        assert_eq!(record.fields["Email"], "a@b.c");
    }

    #[tokio::test]
    async fn memory_store_filters_and_sorts() {
        use super::memory::MemoryStore;

        let store = MemoryStore::new();
        let mut fields = serde_json::Map::new();
        fields.insert("Grouped".into(), Value::Bool(true));
        fields.insert("CreatedAt".into(), Value::String("2025-01-02".into()));
        store.insert("T", fields);

        let mut fields = serde_json::Map::new();
        fields.insert("CreatedAt".into(), Value::String("2025-01-03".into()));
        store.insert("T", fields);

        let mut fields = serde_json::Map::new();
        fields.insert("Grouped".into(), Value::Bool(false));
        fields.insert("CreatedAt".into(), Value::String("2025-01-01".into()));
        store.insert("T", fields);

        let ungrouped = store
            .list_records("T", ListQuery::filter("NOT({Grouped})"))
            .await
            .unwrap();
        assert_eq!(ungrouped.len(), 2);

        let newest_first = store
            .list_records("T", ListQuery::sorted_by("CreatedAt", SortDirection::Desc))
            .await
            .unwrap();
        let stamps: Vec<_> = newest_first
            .iter()
            .map(|r| r.fields["CreatedAt"].as_str().unwrap())
            .collect();
        assert_eq!(stamps, ["2025-01-03", "2025-01-02", "2025-01-01"]);

        let oldest_first = store
            .list_records("T", ListQuery::sorted_by("CreatedAt", SortDirection::Asc))
            .await
            .unwrap();
        assert_eq!(
            oldest_first[0].fields["CreatedAt"].as_str().unwrap(),
            "2025-01-01"
        );
    }
}
