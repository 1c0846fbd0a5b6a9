use serde::{Deserialize, Serialize};

/// Collector payload as the marketing site posts it. Every field is optional
/// free text; `sections` arrives either as an array of labels or a single
/// comma-joined string.
#[derive(Debug, Default, Deserialize)]
pub struct SignupPayload {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_preference: Option<String>,
    pub section_other: Option<String>,
    pub sections: Option<Sections>,
    pub timestamp: Option<String>,
    pub coffee_personality: Option<String>,
    pub lull_response: Option<String>,
    pub unknown_social: Option<String>,
    pub enjoy_gatherings: Option<String>,
    pub background_soundtrack: Option<String>,
    pub wild_order_reaction: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Sections {
    Many(Vec<String>),
    One(String),
}

impl Sections {
    pub fn joined(&self) -> String {
        match self {
            Sections::Many(parts) => parts.join(", "),
            Sections::One(value) => value.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignupCreated {
    pub ok: bool,
    pub id: String,
}
