use serde::{Deserialize, Serialize};

/// Attributes of a federated identity seen for the first time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFederatedUser {
    pub idp_id: String,
    pub protocol_id: String,
    pub unique_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Falls back to the configured default domain.
    #[serde(default)]
    pub domain_id: Option<String>,
}
