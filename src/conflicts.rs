use std::future::Future;

use crate::error::StoreError;

/// Record category reported with a uniqueness conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictType {
    FederatedUser,
    NonLocalUser,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::FederatedUser => "federated_user",
            ConflictType::NonLocalUser => "nonlocal_user",
        }
    }
}

impl std::fmt::Display for ConflictType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewrites a unique-constraint violation into `StoreError::Conflict`.
pub fn classify(kind: ConflictType, err: StoreError) -> StoreError {
    match err {
        StoreError::Database(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
            let detail = match db_err.constraint() {
                Some(constraint) => format!("Duplicate entry violates {constraint}"),
                None => format!("Duplicate entry: {}", db_err.message()),
            };
            tracing::debug!("Unique violation storing {kind}: {}", db_err.message());
            StoreError::Conflict { kind, detail }
        }
        other => other,
    }
}

/// Runs a write and classifies any uniqueness violation it ends with.
pub async fn handle_conflicts<T, F>(kind: ConflictType, write: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    write.await.map_err(|err| classify(kind, err))
}
