pub mod config;
pub mod conflicts;
pub mod db;
pub mod error;
pub mod hints;
pub mod models;
pub mod session;
pub mod shadow_users;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

pub use crate::config::Config;
pub use crate::error::StoreError;
pub use crate::hints::Hints;
pub use crate::shadow_users::ShadowUsers;

/// Installs the global tracing subscriber. `RUST_LOG` wins over
/// `log_level`. Returns false if a subscriber was already installed.
pub fn init_tracing(log_level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .try_init()
        .is_ok()
}

/// Connects to the configured database and applies the bundled schema.
pub async fn connect(config: &Config) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::Database(e.into()))?;

    tracing::info!("Shadow user store connected");
    Ok(pool)
}
