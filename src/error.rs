use crate::conflicts::ConflictType;

#[derive(Debug)]
pub enum StoreError {
    NotFound { entity: &'static str, id: String },
    Conflict { kind: ConflictType, detail: String },
    /// More than one row matched a key the schema declares unique.
    IntegrityViolation(String),
    InvalidHint(String),
    Database(sqlx::Error),
}

impl StoreError {
    pub fn user_not_found(id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: "user",
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn conflict_type(&self) -> Option<ConflictType> {
        match self {
            StoreError::Conflict { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound { entity, id } => write!(f, "Could not find {entity}: {id}"),
            StoreError::Conflict { kind, detail } => {
                write!(f, "Conflict occurred attempting to store {kind} - {detail}")
            }
            StoreError::IntegrityViolation(msg) => write!(f, "Integrity violation: {msg}"),
            StoreError::InvalidHint(msg) => write!(f, "Invalid query hint: {msg}"),
            StoreError::Database(err) => write!(f, "Database Error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}
