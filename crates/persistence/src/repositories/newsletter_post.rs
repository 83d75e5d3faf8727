//! Newsletter post repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::NewsletterPostEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct NewsletterPostRepository {
    pool: PgPool,
}

impl NewsletterPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        subject: &str,
        content_html: &str,
    ) -> Result<NewsletterPostEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_newsletter_post");
        let result = sqlx::query_as::<_, NewsletterPostEntity>(
            r#"
            INSERT INTO newsletter_posts (subject, content_html)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(subject)
        .bind(content_html)
        .fetch_one(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<NewsletterPostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_newsletter_post");
        let result = sqlx::query_as::<_, NewsletterPostEntity>(
            r#"
            SELECT * FROM newsletter_posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    pub async fn list(&self) -> Result<Vec<NewsletterPostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_newsletter_posts");
        let result = sqlx::query_as::<_, NewsletterPostEntity>(
            r#"
            SELECT * FROM newsletter_posts ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// Edit a draft. Returns None when the post is missing or already sent.
    pub async fn update_draft(
        &self,
        id: Uuid,
        subject: &str,
        content_html: &str,
    ) -> Result<Option<NewsletterPostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_newsletter_post");
        let result = sqlx::query_as::<_, NewsletterPostEntity>(
            r#"
            UPDATE newsletter_posts
            SET subject = $2, content_html = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'draft'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(subject)
        .bind(content_html)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result
    }

    /// Delete a draft. Returns the number of rows deleted (0 or 1).
    pub async fn delete_draft(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_newsletter_post");
        let result = sqlx::query(
            r#"
            DELETE FROM newsletter_posts WHERE id = $1 AND status = 'draft'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Record the outcome of a send and flip the post to `sent`. `None` if it
    /// was not a draft.
    pub async fn mark_sent(
        &self,
        id: Uuid,
        sent_count: i32,
        failed_count: i32,
    ) -> Result<Option<NewsletterPostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("mark_newsletter_post_sent");
        let result = sqlx::query_as::<_, NewsletterPostEntity>(
            r#"
            UPDATE newsletter_posts
            SET status = 'sent', sent_count = $2, failed_count = $3,
                sent_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'draft'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(sent_count)
        .bind(failed_count)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result
    }
}
