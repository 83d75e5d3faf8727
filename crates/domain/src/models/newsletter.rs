//! Newsletter subscriber and post models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberStatus {
    Active,
    Unsubscribed,
}

impl std::fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriberStatus::Active => write!(f, "active"),
            SubscriberStatus::Unsubscribed => write!(f, "unsubscribed"),
        }
    }
}

/// A newsletter subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterSubscriber {
    pub id: Uuid,
    pub email: String,
    pub status: SubscriberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Sent,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostStatus::Draft => write!(f, "draft"),
            PostStatus::Sent => write!(f, "sent"),
        }
    }
}

/// A newsletter issue. Editable while it is a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterPost {
    pub id: Uuid,
    pub subject: String,
    pub content_html: String,
    pub status: PostStatus,
    pub sent_count: i32,
    pub failed_count: i32,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewsletterPost {
    pub fn is_draft(&self) -> bool {
        self.status == PostStatus::Draft
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(custom(function = "shared::validation::validate_email"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub ok: bool,
    pub already_subscribed: bool,
    pub resubscribed: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UnsubscribeRequest {
    #[validate(custom(function = "shared::validation::validate_email"))]
    pub email: String,

    #[validate(length(equal = 64, message = "Invalid unsubscribe token"))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsubscribeResponse {
    pub ok: bool,
    pub was_subscribed: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListSubscribersQuery {
    pub status: Option<SubscriberStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListSubscribersResponse {
    pub ok: bool,
    pub subscribers: Vec<NewsletterSubscriber>,
    pub total: usize,
}

/// Request payload for creating or editing a draft.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewsletterPostRequest {
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: String,

    #[validate(length(min = 1, max = 200_000, message = "Content must be 1-200000 characters"))]
    pub content_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsletterPostResponse {
    pub ok: bool,
    pub post: NewsletterPost,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListNewsletterPostsResponse {
    pub ok: bool,
    pub posts: Vec<NewsletterPost>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendNewsletterResponse {
    pub ok: bool,
    pub sent: u32,
    pub failed: u32,
}

/// What a subscribe request does given the existing row for that email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeAction {
    Insert,
    AlreadyActive,
    Reactivate(Uuid),
}

impl SubscribeAction {
    pub fn plan(existing: Option<&NewsletterSubscriber>) -> Self {
        match existing {
            None => SubscribeAction::Insert,
            Some(sub) if sub.status == SubscriberStatus::Active => SubscribeAction::AlreadyActive,
            Some(sub) => SubscribeAction::Reactivate(sub.id),
        }
    }

    pub fn response(&self) -> SubscribeResponse {
        SubscribeResponse {
            ok: true,
            already_subscribed: matches!(self, SubscribeAction::AlreadyActive),
            resubscribed: matches!(self, SubscribeAction::Reactivate(_)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscriber(status: SubscriberStatus) -> NewsletterSubscriber {
        NewsletterSubscriber {
            id: Uuid::new_v4(),
            email: "reader@example.com".to_string(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            unsubscribed_at: None,
        }
    }

    #[test]
    fn test_plan_new_subscriber() {
        let action = SubscribeAction::plan(None);
        assert_eq!(action, SubscribeAction::Insert);
        let response = action.response();
        assert!(response.ok);
        assert!(!response.already_subscribed);
        assert!(!response.resubscribed);
    }

    #[test]
    fn test_plan_duplicate_active() {
        let existing = subscriber(SubscriberStatus::Active);
        let action = SubscribeAction::plan(Some(&existing));
        assert_eq!(action, SubscribeAction::AlreadyActive);
        assert!(action.response().already_subscribed);
    }

    #[test]
    fn test_plan_resubscribe() {
        let existing = subscriber(SubscriberStatus::Unsubscribed);
        let action = SubscribeAction::plan(Some(&existing));
        assert_eq!(action, SubscribeAction::Reactivate(existing.id));
        let response = action.response();
        assert!(response.resubscribed);
        assert!(!response.already_subscribed);
    }

    #[test]
    fn test_unsubscribe_request_validation() {
        let ok = UnsubscribeRequest {
            email: "reader@example.com".to_string(),
            token: "a".repeat(64),
        };
        assert!(ok.validate().is_ok());

        let short = UnsubscribeRequest {
            email: "reader@example.com".to_string(),
            token: "abc".to_string(),
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_post_request_validation() {
        let empty = NewsletterPostRequest {
            subject: String::new(),
            content_html: "<p>Hi</p>".to_string(),
        };
        assert!(empty.validate().is_err());
    }
}
