//! Event repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{DripMetadata, EventType, NewEvent};

use crate::entities::{EventEntity, EventTypeDb};
use crate::metrics::QueryTimer;

/// Repository for the append-only event log.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an event.
    pub async fn append(&self, event: &NewEvent) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new("append_event");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            INSERT INTO events (event_type, lead_id, metadata)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(EventTypeDb::from(event.event_type))
        .bind(event.lead_id)
        .bind(&event.metadata)
        .fetch_one(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// Insert one `drip_scheduled` event per step, all or nothing.
    pub async fn schedule_drip(
        &self,
        lead_id: Uuid,
        steps: &[DripMetadata],
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("schedule_drip");
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for step in steps {
            let metadata = serde_json::to_value(step)
                .map_err(|e| sqlx::Error::Protocol(format!("drip metadata: {}", e)))?;
            sqlx::query(
                r#"
                INSERT INTO events (event_type, lead_id, metadata)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(EventTypeDb::DripScheduled)
            .bind(lead_id)
            .bind(metadata)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        timer.record();
        Ok(inserted)
    }

    /// Recent events, newest first.
    pub async fn list_recent(
        &self,
        event_type: Option<EventType>,
        limit: i64,
    ) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_events");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT * FROM events
            WHERE ($1::event_type IS NULL OR event_type = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(event_type.map(EventTypeDb::from))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// Unsent, unabandoned drip events whose `send_at` has passed. Events
    /// with fewer failed attempts come first so a failing step cannot hold
    /// back the rest of the batch.
    pub async fn find_due_drips(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_due_drips");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT * FROM events
            WHERE event_type = 'drip_scheduled'
              AND (metadata->>'sent') = 'false'
              AND COALESCE((metadata->>'failed')::boolean, false) = false
              AND (metadata->>'send_at')::timestamptz <= $1
            ORDER BY COALESCE((metadata->>'attempts')::int, 0) ASC,
                     (metadata->>'send_at')::timestamptz ASC,
                     created_at ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// Flip `sent` to true on a drip event. Returns false if it was already sent.
    pub async fn mark_drip_sent(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_drip_sent");
        let result = sqlx::query(
            r#"
            UPDATE events
            SET metadata = jsonb_set(metadata, '{sent}', 'true'::jsonb)
            WHERE id = $1
              AND event_type = 'drip_scheduled'
              AND (metadata->>'sent') = 'false'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Record a failed send on an unsent drip event. `give_up` stops any
    /// further retries. Returns false if the event was already sent.
    pub async fn record_drip_failure(
        &self,
        id: Uuid,
        attempts: u32,
        give_up: bool,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("record_drip_failure");
        let result = sqlx::query(
            r#"
            UPDATE events
            SET metadata = metadata
                || jsonb_build_object('attempts', $2::int4, 'failed', $3::boolean)
            WHERE id = $1
              AND event_type = 'drip_scheduled'
              AND (metadata->>'sent') = 'false'
            "#,
        )
        .bind(id)
        .bind(attempts as i32)
        .bind(give_up)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
