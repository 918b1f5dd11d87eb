use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::{Config, SecurityComplianceConfig};
use crate::conflicts::{ConflictType, handle_conflicts};
use crate::db;
use crate::error::StoreError;
use crate::hints::Hints;
use crate::models::{NewFederatedUser, NewNonLocalUser, UserView, filter_user};
use crate::session::Sessions;

/// Persists users that have no local credentials: federated identities
/// and non-local users.
#[derive(Clone)]
pub struct ShadowUsers {
    sessions: Sessions,
    default_domain_id: String,
    security: SecurityComplianceConfig,
}

impl ShadowUsers {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            sessions: Sessions::new(pool),
            default_domain_id: config.identity.default_domain_id.clone(),
            security: config.security_compliance.clone(),
        }
    }

    pub async fn create_federated_user(
        &self,
        federated: NewFederatedUser,
    ) -> Result<UserView, StoreError> {
        handle_conflicts(ConflictType::FederatedUser, async {
            let user_id = new_user_id();
            let domain_id = federated
                .domain_id
                .as_deref()
                .unwrap_or(&self.default_domain_id);

            let mut session = self.sessions.session_for_write().await?;
            db::users::create(
                &mut *session,
                &user_id,
                domain_id,
                None,
                &Value::Object(Default::default()),
                Utc::now(),
            )
            .await?;
            db::federated_users::create(&mut *session, &user_id, &federated).await?;

            let row = db::users::find_by_id(&mut *session, &user_id)
                .await?
                .ok_or_else(|| StoreError::user_not_found(&user_id))?;
            session.commit().await?;

            tracing::info!(
                user_id = %user_id,
                idp_id = %federated.idp_id,
                protocol_id = %federated.protocol_id,
                "Created federated user"
            );
            Ok::<_, StoreError>(filter_user(row))
        })
        .await
    }

    pub async fn get_federated_users(&self, hints: Hints) -> Result<Vec<UserView>, StoreError> {
        let (predicates, hints) = hints.split_federated();

        let mut session = self.sessions.session_for_read().await?;
        let rows = db::users::list_federated(&mut *session, &predicates, &hints).await?;
        session.close().await?;

        Ok(rows.into_iter().map(filter_user).collect())
    }

    pub async fn get_federated_user(
        &self,
        idp_id: &str,
        protocol_id: &str,
        unique_id: &str,
    ) -> Result<UserView, StoreError> {
        let mut session = self.sessions.session_for_read().await?;
        let mut rows =
            db::users::find_by_federated_key(&mut *session, idp_id, protocol_id, unique_id)
                .await?;
        session.close().await?;

        match rows.len() {
            0 => Err(StoreError::user_not_found(unique_id)),
            1 => Ok(filter_user(rows.remove(0))),
            n => {
                tracing::error!(
                    idp_id,
                    protocol_id,
                    unique_id,
                    matches = n,
                    "Federated identity resolves to more than one user"
                );
                Err(StoreError::IntegrityViolation(format!(
                    "{n} users share federated identity ({idp_id}, {protocol_id}, {unique_id})"
                )))
            }
        }
    }

    /// Records today as the user's last active date when inactivity
    /// tracking is configured. An unknown user is ignored.
    pub async fn set_last_active_at(&self, user_id: &str) -> Result<(), StoreError> {
        if !self.security.tracks_inactivity() {
            return Ok(());
        }

        let mut session = self.sessions.session_for_write().await?;
        let updated =
            db::users::set_last_active_at(&mut *session, user_id, Utc::now().date_naive()).await?;
        session.commit().await?;

        if updated == 0 {
            tracing::debug!("Skipped last active date for unknown user {user_id}");
        }
        Ok(())
    }

    /// Returns the number of rows changed; zero when the identity is unknown
    /// or already carries `display_name`.
    pub async fn update_federated_user_display_name(
        &self,
        idp_id: &str,
        protocol_id: &str,
        unique_id: &str,
        display_name: &str,
    ) -> Result<u64, StoreError> {
        handle_conflicts(ConflictType::FederatedUser, async {
            let mut session = self.sessions.session_for_write().await?;
            let updated = db::federated_users::update_display_name(
                &mut *session,
                idp_id,
                protocol_id,
                unique_id,
                display_name,
            )
            .await?;
            session.commit().await?;
            Ok::<_, StoreError>(updated)
        })
        .await
    }

    pub async fn create_nonlocal_user(
        &self,
        attrs: NewNonLocalUser,
    ) -> Result<UserView, StoreError> {
        handle_conflicts(ConflictType::NonLocalUser, async {
            let (user, name) = attrs.split();
            let user_id = user.id.unwrap_or_else(new_user_id);
            let domain_id = user.domain_id.unwrap_or_else(|| self.default_domain_id.clone());

            let mut session = self.sessions.session_for_write().await?;
            db::users::create(
                &mut *session,
                &user_id,
                &domain_id,
                user.default_project_id.as_deref(),
                &Value::Object(user.extra),
                Utc::now(),
            )
            .await?;
            db::nonlocal_users::create(&mut *session, &domain_id, &name, &user_id).await?;

            let row = db::users::find_by_id(&mut *session, &user_id)
                .await?
                .ok_or_else(|| StoreError::user_not_found(&user_id))?;
            session.commit().await?;

            tracing::info!(user_id = %user_id, domain_id = %domain_id, "Created non-local user {name}");
            Ok::<_, StoreError>(filter_user(row))
        })
        .await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserView, StoreError> {
        let mut session = self.sessions.session_for_read().await?;
        let row = db::users::find_by_id(&mut *session, user_id).await?;
        session.close().await?;

        row.map(filter_user)
            .ok_or_else(|| StoreError::user_not_found(user_id))
    }
}

fn new_user_id() -> String {
    Uuid::now_v7().simple().to_string()
}
