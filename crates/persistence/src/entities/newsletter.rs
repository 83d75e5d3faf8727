//! Newsletter subscriber and post entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{NewsletterPost, NewsletterSubscriber, PostStatus, SubscriberStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "subscriber_status", rename_all = "snake_case")]
pub enum SubscriberStatusDb {
    Active,
    Unsubscribed,
}

impl From<SubscriberStatusDb> for SubscriberStatus {
    fn from(db: SubscriberStatusDb) -> Self {
        match db {
            SubscriberStatusDb::Active => SubscriberStatus::Active,
            SubscriberStatusDb::Unsubscribed => SubscriberStatus::Unsubscribed,
        }
    }
}

impl From<SubscriberStatus> for SubscriberStatusDb {
    fn from(status: SubscriberStatus) -> Self {
        match status {
            SubscriberStatus::Active => SubscriberStatusDb::Active,
            SubscriberStatus::Unsubscribed => SubscriberStatusDb::Unsubscribed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "newsletter_post_status", rename_all = "snake_case")]
pub enum PostStatusDb {
    Draft,
    Sent,
}

impl From<PostStatusDb> for PostStatus {
    fn from(db: PostStatusDb) -> Self {
        match db {
            PostStatusDb::Draft => PostStatus::Draft,
            PostStatusDb::Sent => PostStatus::Sent,
        }
    }
}

/// Database row mapping for the newsletter_subscribers table.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriberEntity {
    pub id: Uuid,
    pub email: String,
    pub status: SubscriberStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl From<SubscriberEntity> for NewsletterSubscriber {
    fn from(entity: SubscriberEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            unsubscribed_at: entity.unsubscribed_at,
        }
    }
}

/// Database row mapping for the newsletter_posts table.
#[derive(Debug, Clone, FromRow)]
pub struct NewsletterPostEntity {
    pub id: Uuid,
    pub subject: String,
    pub content_html: String,
    pub status: PostStatusDb,
    pub sent_count: i32,
    pub failed_count: i32,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NewsletterPostEntity> for NewsletterPost {
    fn from(entity: NewsletterPostEntity) -> Self {
        Self {
            id: entity.id,
            subject: entity.subject,
            content_html: entity.content_html,
            status: entity.status.into(),
            sent_count: entity.sent_count,
            failed_count: entity.failed_count,
            sent_at: entity.sent_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
