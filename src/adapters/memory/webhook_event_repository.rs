//! In-memory WebhookEventRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::billing::Processor;
use crate::domain::foundation::DomainError;
use crate::ports::{WebhookEventRecord, WebhookEventRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemoryWebhookEventRepository {
    records: Arc<RwLock<HashMap<(Processor, String), WebhookEventRecord>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryWebhookEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn get(&self, processor: Processor, event_id: &str) -> Option<WebhookEventRecord> {
        self.records
            .read()
            .await
            .get(&(processor, event_id.to_string()))
            .cloned()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::unavailable("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
    async fn find(
        &self,
        processor: Processor,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        self.check_available()?;
        Ok(self.get(processor, event_id).await)
    }

    async fn record(&self, record: WebhookEventRecord) -> Result<(), DomainError> {
        self.check_available()?;
        self.records
            .write()
            .await
            .insert((record.processor, record.event_id.clone()), record);
        Ok(())
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.processed_at >= cutoff);
        Ok((before - records.len()) as u64)
    }
}
