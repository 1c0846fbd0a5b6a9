use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::store::{AirtableStore, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    store: Option<Arc<dyn RecordStore>>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = match (&config.store.api_key, &config.store.base_id) {
            (Some(key), Some(base)) => Some(Arc::new(AirtableStore::new(
                &config.store.api_url,
                base,
                key,
            )?) as Arc<dyn RecordStore>),
            _ => None,
        };
        Ok(Self { config, store })
    }

    /// The store client, or the fixed credentials error every endpoint
    /// reports while the Airtable env vars are unset.
    pub fn store(&self) -> Result<&dyn RecordStore, ApiError> {
        self.store.as_deref().ok_or(ApiError::MissingCredentials)
    }
}

#[cfg(test)]
impl AppState {
    pub fn fake(store: Arc<dyn RecordStore>) -> Self {
        Self::fake_with(store, crate::config::GroupingPolicy::BestEffort, 6)
    }

    pub fn fake_with(
        store: Arc<dyn RecordStore>,
        grouping_policy: crate::config::GroupingPolicy,
        group_size: usize,
    ) -> Self {
        let config = Arc::new(AppConfig {
            store: crate::config::StoreConfig {
                api_key: Some("key".into()),
                base_id: Some("base".into()),
                api_url: "https://store.test/v0".into(),
                signups_table: "Signups".into(),
                groups_table: "Groups".into(),
            },
            group_size,
            grouping_policy,
        });
        Self {
            config,
            store: Some(store),
        }
    }

    pub fn fake_unconfigured() -> Self {
        let config = Arc::new(AppConfig {
            store: crate::config::StoreConfig {
                api_key: None,
                base_id: None,
                api_url: "https://store.test/v0".into(),
                signups_table: "Signups".into(),
                groups_table: "Groups".into(),
            },
            group_size: 6,
            grouping_policy: crate::config::GroupingPolicy::BestEffort,
        });
        Self {
            config,
            store: None,
        }
    }
}
