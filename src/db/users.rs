use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};

use crate::error::StoreError;
use crate::hints::{self, FederatedPredicate, Hints};
use crate::models::UserRow;

macro_rules! name_expr {
    () => {
        "COALESCE(lu.name, nlu.name, \
         (SELECT f.display_name FROM federated_user f WHERE f.user_id = u.id ORDER BY f.id LIMIT 1))"
    };
}

macro_rules! select_user {
    () => {
        concat!(
            "SELECT u.id, u.enabled, u.domain_id, u.default_project_id, u.extra, \
             u.created_at, u.last_active_at, ",
            name_expr!(),
            " AS name FROM users u \
             LEFT OUTER JOIN local_user lu ON lu.user_id = u.id \
             LEFT OUTER JOIN nonlocal_user nlu ON nlu.user_id = u.id"
        )
    };
}

/// Display name of a user: local name, then non-local name, then the
/// display name of its first federated identity.
pub const NAME_EXPR: &str = name_expr!();

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: &str,
    domain_id: &str,
    default_project_id: Option<&str>,
    extra: &Value,
    created_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, enabled, domain_id, default_project_id, extra, created_at)
         VALUES ($1, true, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(domain_id)
    .bind(default_project_id)
    .bind(extra)
    .bind(created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(concat!(select_user!(), " WHERE u.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Every user joined to the given federated identity. The schema allows at
/// most one, callers check.
pub async fn find_by_federated_key<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    idp_id: &str,
    protocol_id: &str,
    unique_id: &str,
) -> Result<Vec<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(concat!(
        select_user!(),
        " JOIN federated_user fu ON fu.user_id = u.id
         WHERE fu.idp_id = $1 AND fu.protocol_id = $2 AND fu.unique_id = $3"
    ))
    .bind(idp_id)
    .bind(protocol_id)
    .bind(unique_id)
    .fetch_all(executor)
    .await
}

/// Users owning at least one federated identity matching all `predicates`,
/// narrowed further by the generic `hints`.
pub async fn list_federated<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    predicates: &[FederatedPredicate],
    hints: &Hints,
) -> Result<Vec<UserRow>, StoreError> {
    let mut query = QueryBuilder::<Postgres>::new(select_user!());
    query.push(" WHERE EXISTS (SELECT 1 FROM federated_user fu WHERE fu.user_id = u.id");
    for predicate in predicates {
        query
            .push(" AND ")
            .push(predicate.attr.column())
            .push(" = ")
            .push_bind(predicate.value.clone());
    }
    query.push(")");

    hints::apply(hints, &mut query)?;

    let rows = query.build_query_as::<UserRow>().fetch_all(executor).await?;
    Ok(rows)
}

pub async fn set_last_active_at<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: &str,
    date: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET last_active_at = $2 WHERE id = $1")
        .bind(id)
        .bind(date)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn last_active_at<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: &str,
) -> Result<Option<NaiveDate>, sqlx::Error> {
    let row: Option<(Option<NaiveDate>,)> =
        sqlx::query_as("SELECT last_active_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
    Ok(row.and_then(|r| r.0))
}
