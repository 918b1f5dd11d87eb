use crate::models::NewFederatedUser;

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: &str,
    federated: &NewFederatedUser,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO federated_user (user_id, idp_id, protocol_id, unique_id, display_name)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(&federated.idp_id)
    .bind(&federated.protocol_id)
    .bind(&federated.unique_id)
    .bind(&federated.display_name)
    .execute(executor)
    .await?;
    Ok(())
}

/// Only touches the row when the stored name actually differs.
pub async fn update_display_name<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    idp_id: &str,
    protocol_id: &str,
    unique_id: &str,
    display_name: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE federated_user SET display_name = $4
         WHERE idp_id = $1 AND protocol_id = $2 AND unique_id = $3
           AND display_name IS DISTINCT FROM $4",
    )
    .bind(idp_id)
    .bind(protocol_id)
    .bind(unique_id)
    .bind(display_name)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
