//! Lead repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{LeadStatus, LeadSubmission};
use domain::services::LeadMerge;

use crate::entities::{LeadEntity, LeadStatusDb};
use crate::metrics::QueryTimer;

/// Repository for lead-related database operations.
#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a lead by its normalized email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<LeadEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_lead_by_email");
        let result = sqlx::query_as::<_, LeadEntity>(
            r#"
            SELECT * FROM leads WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeadEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_lead_by_id");
        let result = sqlx::query_as::<_, LeadEntity>(
            r#"
            SELECT * FROM leads WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// Insert a new lead with status `new`.
    /// Fails with a unique violation when the email already exists.
    pub async fn create(
        &self,
        submission: &LeadSubmission,
        tags: &[String],
    ) -> Result<LeadEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_lead");
        let result = sqlx::query_as::<_, LeadEntity>(
            r#"
            INSERT INTO leads (name, email, phone, source, tool_result, status, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.source)
        .bind(&submission.tool_result)
        .bind(LeadStatusDb::New)
        .bind(tags)
        .fetch_one(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// Apply a repeated submission to an existing lead.
    pub async fn apply_merge(
        &self,
        id: Uuid,
        merge: &LeadMerge,
    ) -> Result<Option<LeadEntity>, sqlx::Error> {
        let timer = QueryTimer::new("merge_lead");
        let result = sqlx::query_as::<_, LeadEntity>(
            r#"
            UPDATE leads SET
                name = $2,
                phone = $3,
                source = $4,
                tool_result = $5,
                tags = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&merge.name)
        .bind(&merge.phone)
        .bind(&merge.source)
        .bind(&merge.tool_result)
        .bind(&merge.tags)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// Admin update of status and/or tags. None values are preserved.
    pub async fn update_admin_fields(
        &self,
        id: Uuid,
        status: Option<LeadStatus>,
        tags: Option<&[String]>,
    ) -> Result<Option<LeadEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_lead");
        let result = sqlx::query_as::<_, LeadEntity>(
            r#"
            UPDATE leads SET
                status = COALESCE($2, status),
                tags = COALESCE($3, tags),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.map(LeadStatusDb::from))
        .bind(tags)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// List leads newest first, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<LeadStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeadEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_leads");
        let result = sqlx::query_as::<_, LeadEntity>(
            r#"
            SELECT * FROM leads
            WHERE ($1::lead_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status.map(LeadStatusDb::from))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    pub async fn count(&self, status: Option<LeadStatus>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_leads");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM leads
            WHERE ($1::lead_status IS NULL OR status = $1)
            "#,
        )
        .bind(status.map(LeadStatusDb::from))
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0)
    }
}
