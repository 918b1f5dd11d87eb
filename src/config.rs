#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub log_level: String,
    pub identity: IdentityConfig,
    pub security_compliance: SecurityComplianceConfig,
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Domain assigned to users created without an explicit one.
    pub default_domain_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct SecurityComplianceConfig {
    /// Accounts inactive for this many days get disabled elsewhere. When
    /// unset, last-active dates are not recorded at all.
    pub disable_user_account_days_inactive: Option<u32>,
}

impl SecurityComplianceConfig {
    pub fn tracks_inactivity(&self) -> bool {
        self.disable_user_account_days_inactive.is_some()
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            default_domain_id: "default".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let max_connections: u32 = env_or("SHADOW_USERS_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| format!("Invalid SHADOW_USERS_MAX_CONNECTIONS: {e}"))?;

        let log_level = env_or("SHADOW_USERS_LOG_LEVEL", "info");

        let default_domain_id = env_or("SHADOW_USERS_DEFAULT_DOMAIN_ID", "default");
        if default_domain_id.trim().is_empty() {
            return Err("SHADOW_USERS_DEFAULT_DOMAIN_ID must not be empty".to_string());
        }

        let disable_user_account_days_inactive =
            parse_days_inactive(std::env::var("SHADOW_USERS_DISABLE_DAYS_INACTIVE").ok())?;

        Ok(Config {
            database_url,
            max_connections,
            log_level,
            identity: IdentityConfig { default_domain_id },
            security_compliance: SecurityComplianceConfig {
                disable_user_account_days_inactive,
            },
        })
    }
}

fn parse_days_inactive(raw: Option<String>) -> Result<Option<u32>, String> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            let days: u32 = value
                .parse()
                .map_err(|e| format!("Invalid SHADOW_USERS_DISABLE_DAYS_INACTIVE: {e}"))?;
            if days == 0 {
                return Err("SHADOW_USERS_DISABLE_DAYS_INACTIVE must be at least 1".to_string());
            }
            Ok(Some(days))
        }
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_inactive_unset_disables_tracking() {
        assert_eq!(parse_days_inactive(None).unwrap(), None);
        assert_eq!(parse_days_inactive(Some("  ".to_string())).unwrap(), None);
    }

    #[test]
    fn days_inactive_parses_positive_values() {
        assert_eq!(parse_days_inactive(Some("90".to_string())).unwrap(), Some(90));
    }

    #[test]
    fn days_inactive_rejects_zero_and_garbage() {
        assert!(parse_days_inactive(Some("0".to_string())).is_err());
        assert!(parse_days_inactive(Some("soon".to_string())).is_err());
    }
}
