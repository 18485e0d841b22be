use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Result, StoreError, SubscriptionStore};
use crate::model::Record;

/// Process local store, records grouped by email. Cheaply cloneable, clones share the records.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    table: Option<String>,
    partitions: Arc<RwLock<HashMap<String, Vec<Record>>>>,
}

impl MemStore {
    pub fn new(table: Option<String>) -> Self {
        Self {
            table,
            partitions: Arc::default(),
        }
    }

    fn check_table(&self) -> Result<()> {
        match self.table {
            Some(_) => Ok(()),
            None => Err(StoreError::MissingTable),
        }
    }

    /// Number of records across all emails.
    pub async fn len(&self) -> usize {
        self.partitions.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SubscriptionStore for MemStore {
    async fn put(&self, record: &Record) -> Result<()> {
        self.check_table()?;

        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(record.email.clone()).or_default();
        if !partition.iter().any(|r| r.id == record.id) {
            partition.push(record.clone());
        }

        Ok(())
    }

    async fn query(&self, email: &str) -> Result<Vec<Record>> {
        self.check_table()?;

        let mut records = self
            .partitions
            .read()
            .await
            .get(email)
            .cloned()
            .unwrap_or_default();
        records.sort_by(|a, b| {
            a.subscription_date
                .cmp(&b.subscription_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(records)
    }
}
