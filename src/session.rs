//! Transactional scopes handed to store operations.
//!
//! Both scopes wrap a `sqlx::Transaction`. Dropping a scope without
//! committing rolls the transaction back, so the connection goes back to the
//! pool on every exit path.

use std::ops::{Deref, DerefMut};

use sqlx::{PgConnection, PgPool, Postgres, Transaction};

#[derive(Clone)]
pub struct Sessions {
    pool: PgPool,
}

impl Sessions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn session_for_read(&self) -> Result<ReadSession, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(ReadSession { tx })
    }

    pub async fn session_for_write(&self) -> Result<WriteSession, sqlx::Error> {
        let tx = self.pool.begin().await?;
        Ok(WriteSession { tx })
    }
}

pub struct ReadSession {
    tx: Transaction<'static, Postgres>,
}

impl ReadSession {
    /// Ends the read transaction. Nothing was written, so rolling back and
    /// committing are equivalent.
    pub async fn close(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}

impl Deref for ReadSession {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

impl DerefMut for ReadSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tx
    }
}

pub struct WriteSession {
    tx: Transaction<'static, Postgres>,
}

impl WriteSession {
    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

impl Deref for WriteSession {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

impl DerefMut for WriteSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tx
    }
}
