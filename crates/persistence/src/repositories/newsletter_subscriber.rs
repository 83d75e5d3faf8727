//! Newsletter subscriber repository.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::SubscriberStatus;

use crate::entities::{SubscriberEntity, SubscriberStatusDb};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct NewsletterSubscriberRepository {
    pool: PgPool,
}

impl NewsletterSubscriberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<SubscriberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_subscriber_by_email");
        let result = sqlx::query_as::<_, SubscriberEntity>(
            r#"
            SELECT * FROM newsletter_subscribers WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// Insert an active subscriber. Fails with a unique violation on duplicates.
    pub async fn create(&self, email: &str) -> Result<SubscriberEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_subscriber");
        let result = sqlx::query_as::<_, SubscriberEntity>(
            r#"
            INSERT INTO newsletter_subscribers (email, status)
            VALUES ($1, 'active')
            RETURNING *
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    pub async fn reactivate(&self, id: Uuid) -> Result<Option<SubscriberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("reactivate_subscriber");
        let result = sqlx::query_as::<_, SubscriberEntity>(
            r#"
            UPDATE newsletter_subscribers
            SET status = 'active', unsubscribed_at = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// Mark an active subscriber as unsubscribed.
    /// Returns false when there was no active row for the email.
    pub async fn unsubscribe(&self, email: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("unsubscribe_subscriber");
        let result = sqlx::query(
            r#"
            UPDATE newsletter_subscribers
            SET status = 'unsubscribed', unsubscribed_at = NOW(), updated_at = NOW()
            WHERE email = $1 AND status = 'active'
            "#,
        )
        .bind(email)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(
        &self,
        status: Option<SubscriberStatus>,
    ) -> Result<Vec<SubscriberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_subscribers");
        let result = sqlx::query_as::<_, SubscriberEntity>(
            r#"
            SELECT * FROM newsletter_subscribers
            WHERE ($1::subscriber_status IS NULL OR status = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(status.map(SubscriberStatusDb::from))
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        result
    }
}
