use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `users` row joined with whatever provides its name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub enabled: bool,
    pub domain_id: String,
    pub default_project_id: Option<String>,
    pub extra: Value,
    pub created_at: DateTime<Utc>,
    pub last_active_at: Option<NaiveDate>,
    pub name: Option<String>,
}

/// The user representation handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub name: Option<String>,
    pub domain_id: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Extra keys that never leave the store.
const HIDDEN_EXTRA_KEYS: &[&str] = &["password", "tenants", "groups", "domains"];

/// Keys owned by the view itself; an extra attribute must not shadow them.
pub(crate) const RESERVED_KEYS: &[&str] = &[
    "id",
    "name",
    "domain_id",
    "enabled",
    "default_project_id",
    "created_at",
    "last_active_at",
];

pub fn filter_user(row: UserRow) -> UserView {
    let mut extra = match row.extra {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    extra.retain(|key, _| {
        !HIDDEN_EXTRA_KEYS.contains(&key.as_str()) && !RESERVED_KEYS.contains(&key.as_str())
    });

    UserView {
        id: row.id,
        name: row.name,
        domain_id: row.domain_id,
        enabled: row.enabled,
        default_project_id: row.default_project_id,
        extra,
    }
}
