use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use shadow_users::ShadowUsers;
use shadow_users::config::{Config, IdentityConfig, SecurityComplianceConfig};

/// A store bound to its own throwaway database.
pub struct TestStore {
    pub store: ShadowUsers,
    pub pool: PgPool,
    pub config: Config,
    pub db_name: String,
}

impl TestStore {
    /// Same database, different inactivity policy.
    pub fn with_days_inactive(&self, days: Option<u32>) -> ShadowUsers {
        let mut config = self.config.clone();
        config.security_compliance.disable_user_account_days_inactive = days;
        ShadowUsers::new(self.pool.clone(), &config)
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a store with a fresh temporary database.
pub async fn spawn_store() -> TestStore {
    let _ = dotenvy::dotenv();
    shadow_users::init_tracing("warn");

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let db_name = format!("shadow_users_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let config = Config {
        database_url: test_url,
        max_connections: 5,
        log_level: "warn".to_string(),
        identity: IdentityConfig::default(),
        security_compliance: SecurityComplianceConfig::default(),
    };

    let pool = shadow_users::connect(&config)
        .await
        .expect("Failed to prepare test database");

    TestStore {
        store: ShadowUsers::new(pool.clone(), &config),
        pool,
        config,
        db_name,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(test: TestStore) {
    let db_name = test.db_name.clone();
    drop(test.store);
    test.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
