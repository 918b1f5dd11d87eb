use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::user::RESERVED_KEYS;

/// Loose user attributes for a user that has no local credentials.
///
/// `name` ends up on the `nonlocal_user` row; `password` belongs to local
/// users and is dropped. Anything not named here is kept as an extra
/// user attribute, except keys that shadow real user columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNonLocalUser {
    /// Caller-chosen user id, so a later lookup by that id finds the user.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub default_project_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewNonLocalUser {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            password: None,
            domain_id: None,
            default_project_id: None,
            extra: Map::new(),
        }
    }

    /// Splits into the user-level part and the non-local record name.
    pub fn split(self) -> (UserAttrs, String) {
        let NewNonLocalUser {
            id,
            name,
            password: _,
            domain_id,
            default_project_id,
            mut extra,
        } = self;
        extra.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
        (
            UserAttrs {
                id,
                domain_id,
                default_project_id,
                extra,
            },
            name,
        )
    }
}

/// User-level attributes left after `NewNonLocalUser::split`.
#[derive(Debug, Clone, Default)]
pub struct UserAttrs {
    pub id: Option<String>,
    pub domain_id: Option<String>,
    pub default_project_id: Option<String>,
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_drops_password_and_keeps_extra_attributes() {
        let attrs: NewNonLocalUser = serde_json::from_value(json!({
            "name": "alice",
            "password": "hunter2",
            "domain_id": "corp",
            "email": "alice@example.com",
        }))
        .unwrap();

        let (user, name) = attrs.split();
        assert_eq!(name, "alice");
        assert_eq!(user.domain_id.as_deref(), Some("corp"));
        assert_eq!(user.extra.get("email"), Some(&json!("alice@example.com")));
        assert!(!user.extra.contains_key("password"));
        assert!(!user.extra.contains_key("name"));
    }

    #[test]
    fn split_keeps_caller_id_and_drops_column_shadows() {
        let attrs: NewNonLocalUser = serde_json::from_value(json!({
            "id": "ldap-mapped-id",
            "name": "alice",
            "enabled": false,
            "created_at": "2001-01-01T00:00:00Z",
            "last_active_at": "2001-01-01",
            "locale": "en",
        }))
        .unwrap();

        let (user, _) = attrs.split();
        assert_eq!(user.id.as_deref(), Some("ldap-mapped-id"));
        assert_eq!(user.extra.len(), 1);
        assert_eq!(user.extra["locale"], "en");
    }

    #[test]
    fn name_is_required() {
        let parsed = serde_json::from_value::<NewNonLocalUser>(json!({ "domain_id": "corp" }));
        assert!(parsed.is_err());
    }
}
