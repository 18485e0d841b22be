use std::time::Duration;

use async_trait::async_trait;
use lazy_regex::regex_is_match;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::{Result, StoreError, SubscriptionStore};
use crate::{config::DbConfig, model::Record};

/// Postgres backed store. The table name is only known at runtime so it is validated
/// once and then quoted into every statement.
#[derive(Clone, Debug)]
pub struct PgStore {
    db: PgPool,
    table: Option<String>,
}

impl PgStore {
    /// Creates a lazily connecting pool, an unreachable database fails the requests instead of the startup.
    pub fn init(db_config: &DbConfig, table: Option<String>) -> Result<Self> {
        info!("{:<20} - Initializing the DB pool", "init_db");
        if let Some(table) = &table {
            validate_table_name(table)?;
        }

        let max_cons = if cfg!(test) { 1 } else { 5 };
        let db = PgPoolOptions::new()
            .max_connections(max_cons)
            .acquire_timeout(Duration::from_secs(2))
            .connect_lazy_with(db_config.connection_options());

        Ok(Self { db, table })
    }

    fn table(&self) -> Result<&str> {
        self.table.as_deref().ok_or(StoreError::MissingTable)
    }

    pub async fn ensure_table(&self) -> Result<()> {
        let table = self.table()?;

        sqlx::query(&format!(
            r#"CREATE TABLE IF NOT EXISTS "{table}" (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                subscription_date TIMESTAMPTZ NOT NULL
            )"#
        ))
        .execute(&self.db)
        .await?;
        sqlx::query(&format!(
            r#"CREATE INDEX IF NOT EXISTS "{table}_email_idx" ON "{table}" (email, subscription_date)"#
        ))
        .execute(&self.db)
        .await?;
        info!("{:<20} - Table {table} is ready", "ensure_table");

        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn put(&self, record: &Record) -> Result<()> {
        let table = self.table()?;

        sqlx::query(&format!(
            r#"INSERT INTO "{table}" (id, email, subscription_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING"#
        ))
        .bind(&record.id)
        .bind(&record.email)
        .bind(record.subscription_date)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn query(&self, email: &str) -> Result<Vec<Record>> {
        let table = self.table()?;

        let records = sqlx::query_as::<_, Record>(&format!(
            r#"SELECT email, subscription_date, id FROM "{table}"
            WHERE email = $1
            ORDER BY subscription_date, id"#
        ))
        .bind(email)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }
}

/// Accepts plain unquoted Postgres identifiers, short enough to leave room for the index suffix.
fn validate_table_name(table: &str) -> Result<()> {
    if regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_]{0,48}$", table) {
        Ok(())
    } else {
        Err(StoreError::InvalidTable(table.to_string()))
    }
}
