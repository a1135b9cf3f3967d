//! Database connection management

use sqlx::{PgPool, Postgres, Transaction, migrate::MigrateError, query};

/// SQL used to bound statement run time for the current transaction.
pub const SET_STATEMENT_TIMEOUT_SQL: &str = "SELECT set_config('statement_timeout', $1, true)";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
    statement_timeout_ms: Option<u64>,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout_ms: None,
        }
    }

    /// Apply a statement timeout to every transaction; `0` leaves the server default.
    #[must_use]
    pub fn with_statement_timeout(mut self, timeout_ms: u64) -> Self {
        self.statement_timeout_ms = (timeout_ms > 0).then_some(timeout_ms);
        self
    }

    /// Begin a transaction with the configured statement timeout applied.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or setting the timeout fails.
    pub async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(timeout_ms) = self.statement_timeout_ms {
            query(SET_STATEMENT_TIMEOUT_SQL)
                .bind(timeout_ms.to_string())
                .execute(&mut *tx)
                .await?;
        }

        Ok(tx)
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
