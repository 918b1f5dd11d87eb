pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    domain_id: &str,
    name: &str,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO nonlocal_user (domain_id, name, user_id) VALUES ($1, $2, $3)")
        .bind(domain_id)
        .bind(name)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}
