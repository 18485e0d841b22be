//! The key-value store behind both handlers.
//! Records are partitioned by email: `put` always inserts, `query` returns every record of one email.

mod memory;
mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    config::{AppConfig, StoreBackend},
    model::Record,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Writes a record. A record with the same id is left as is, it can only carry the same data.
    async fn put(&self, record: &Record) -> Result<()>;

    /// All records whose partition key equals `email`, oldest subscription first.
    async fn query(&self, email: &str) -> Result<Vec<Record>>;
}

/// Builds the store selected in the configuration.
/// With `create_table` set the Postgres table is created if it does not exist yet.
/// A missing table name is only warned about, the requests fail instead.
pub async fn init_store(config: &AppConfig) -> Result<Box<dyn SubscriptionStore>> {
    let store_config = &config.store_config;
    let table = store_config.table().map(str::to_string);
    info!(
        "{:<20} - {} backend, table: {table:?}",
        "init_store",
        store_config.backend.as_ref()
    );

    let store: Box<dyn SubscriptionStore> = match store_config.backend {
        StoreBackend::Postgres => {
            let store = PgStore::init(&config.db_config, table)?;
            if store_config.create_table && store_config.table().is_some() {
                store.ensure_table().await?;
            }
            Box::new(store)
        }
        StoreBackend::Memory => Box::new(MemStore::new(table)),
    };
    if store_config.table().is_none() {
        warn!("{:<20} - No table configured, every store call will fail", "init_store");
    }

    Ok(store)
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no table name configured")]
    MissingTable,
    #[error("invalid table name: {0}")]
    InvalidTable(String),

    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
