use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// API key and base id are optional on purpose: the service starts
    /// without them and every request answers with the credentials error
    /// until they are provided.
    pub api_key: Option<String>,
    pub base_id: Option<String>,
    pub api_url: String,
    pub signups_table: String,
    pub groups_table: String,
}

/// What to do when the store rejects a group create mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingPolicy {
    /// Skip the rejected group, log it, report a skipped count.
    BestEffort,
    /// Abort the whole run on the first rejected create.
    FailFast,
}

impl FromStr for GroupingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best-effort" => Ok(Self::BestEffort),
            "fail-fast" => Ok(Self::FailFast),
            other => anyhow::bail!(
                "unknown GROUPING_POLICY {other:?} (expected \"best-effort\" or \"fail-fast\")"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub group_size: usize,
    pub grouping_policy: GroupingPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = StoreConfig {
            api_key: env_nonempty("AIRTABLE_API_KEY"),
            base_id: env_nonempty("AIRTABLE_BASE_ID"),
            api_url: std::env::var("AIRTABLE_API_URL")
                .unwrap_or_else(|_| "https://api.airtable.com/v0".into()),
            signups_table: std::env::var("AIRTABLE_TABLE_NAME")
                .unwrap_or_else(|_| "Signups".into()),
            groups_table: std::env::var("AIRTABLE_GROUPS_TABLE")
                .unwrap_or_else(|_| "Groups".into()),
        };
        let group_size = std::env::var("GROUP_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(6);
        let grouping_policy = match std::env::var("GROUPING_POLICY") {
            Ok(v) => v.parse()?,
            Err(_) => GroupingPolicy::BestEffort,
        };
        Ok(Self {
            store,
            group_size,
            grouping_policy,
        })
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
