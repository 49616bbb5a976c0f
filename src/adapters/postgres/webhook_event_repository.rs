//! PostgreSQL implementation of WebhookEventRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::billing::Processor;
use crate::domain::foundation::DomainError;
use crate::ports::{EventOutcome, WebhookEventRecord, WebhookEventRepository};

use super::errors::map_sqlx_error;

pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    processor: String,
    event_id: String,
    event_type: String,
    outcome: String,
    detail: Option<String>,
    processed_at: DateTime<Utc>,
}

impl TryFrom<WebhookEventRow> for WebhookEventRecord {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        let processor = Processor::parse(&row.processor).ok_or_else(|| {
            DomainError::database(format!("Invalid processor value: {}", row.processor))
        })?;
        let outcome = EventOutcome::parse(&row.outcome).ok_or_else(|| {
            DomainError::database(format!("Invalid outcome value: {}", row.outcome))
        })?;

        Ok(WebhookEventRecord {
            processor,
            event_id: row.event_id,
            event_type: row.event_type,
            outcome,
            detail: row.detail,
            processed_at: row.processed_at,
        })
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn find(
        &self,
        processor: Processor,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT processor, event_id, event_type, outcome, detail, processed_at
            FROM webhook_events
            WHERE processor = $1 AND event_id = $2
            "#,
        )
        .bind(processor.as_str())
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find webhook event", e))?;

        row.map(WebhookEventRecord::try_from).transpose()
    }

    async fn record(&self, record: WebhookEventRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO webhook_events (processor, event_id, event_type, outcome, detail, processed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (processor, event_id) DO UPDATE SET
                event_type = EXCLUDED.event_type,
                outcome = EXCLUDED.outcome,
                detail = EXCLUDED.detail,
                processed_at = EXCLUDED.processed_at
            "#,
        )
        .bind(record.processor.as_str())
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.outcome.as_str())
        .bind(&record.detail)
        .bind(record.processed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to record webhook event", e))?;

        Ok(())
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM webhook_events WHERE processed_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to prune webhook events", e))?;

        Ok(result.rows_affected())
    }
}
