//! Newsletter subscription and issue sending.

use domain::models::newsletter::{
    SendNewsletterResponse, SubscribeAction, SubscribeResponse, UnsubscribeResponse,
};
use domain::models::{EventType, NewEvent, NewsletterSubscriber, SubscriberStatus};
use persistence::db::is_unique_violation;
use persistence::repositories::{
    EventRepository, NewsletterPostRepository, NewsletterSubscriberRepository,
};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::metrics::record_email;
use crate::services::email::EmailService;
use crate::services::templates;

pub struct NewsletterService<'a> {
    subscribers: NewsletterSubscriberRepository,
    posts: NewsletterPostRepository,
    events: EventRepository,
    email: &'a EmailService,
    config: &'a Config,
}

impl<'a> NewsletterService<'a> {
    pub fn new(pool: PgPool, email: &'a EmailService, config: &'a Config) -> Self {
        Self {
            subscribers: NewsletterSubscriberRepository::new(pool.clone()),
            posts: NewsletterPostRepository::new(pool.clone()),
            events: EventRepository::new(pool),
            email,
            config,
        }
    }

    /// Subscribes `email` (already normalized). Idempotent for active subscribers.
    pub async fn subscribe(&self, email: &str) -> Result<SubscribeResponse, ApiError> {
        let existing: Option<NewsletterSubscriber> =
            self.subscribers.find_by_email(email).await?.map(Into::into);
        let action = SubscribeAction::plan(existing.as_ref());

        match action {
            SubscribeAction::AlreadyActive => return Ok(action.response()),
            SubscribeAction::Insert => {
                if let Err(e) = self.subscribers.create(email).await {
                    if is_unique_violation(&e) {
                        return Ok(SubscribeAction::AlreadyActive.response());
                    }
                    return Err(e.into());
                }
            }
            SubscribeAction::Reactivate(id) => {
                self.subscribers
                    .reactivate(id)
                    .await?
                    .ok_or_else(|| ApiError::NotFound("Subscriber not found".into()))?;
            }
        }

        let response = action.response();
        self.append_event(
            NewEvent::new(EventType::NewsletterSubscribed)
                .with_metadata(json!({ "email": email, "resubscribed": response.resubscribed })),
        )
        .await;
        info!(email = %email, resubscribed = response.resubscribed, "Newsletter subscription");
        Ok(response)
    }

    /// Unsubscribes `email` when `token` is the HMAC issued for it.
    pub async fn unsubscribe(&self, email: &str, token: &str) -> Result<UnsubscribeResponse, ApiError> {
        if !shared::crypto::verify_unsubscribe_token(
            &self.config.newsletter.unsubscribe_secret,
            email,
            token,
        ) {
            return Err(ApiError::Validation("Invalid unsubscribe token".into()));
        }

        let was_subscribed = self.subscribers.unsubscribe(email).await?;
        if was_subscribed {
            self.append_event(
                NewEvent::new(EventType::NewsletterUnsubscribed).with_metadata(json!({ "email": email })),
            )
            .await;
            info!(email = %email, "Newsletter unsubscribe");
        }

        Ok(UnsubscribeResponse {
            ok: true,
            was_subscribed,
        })
    }

    /// Emails a draft to every active subscriber, one at a time, then marks it sent.
    pub async fn send_post(&self, id: Uuid) -> Result<SendNewsletterResponse, ApiError> {
        if !self.email.is_configured() {
            return Err(ApiError::NotConfigured("Email is not configured".into()));
        }

        let post: domain::models::NewsletterPost = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Newsletter post not found".into()))?
            .into();
        if !post.is_draft() {
            return Err(ApiError::Conflict("Newsletter post was already sent".into()));
        }

        let recipients = self.subscribers.list(Some(SubscriberStatus::Active)).await?;
        let secret = &self.config.newsletter.unsubscribe_secret;
        let (mut sent, mut failed) = (0u32, 0u32);

        for subscriber in &recipients {
            let token = shared::crypto::unsubscribe_token(secret, &subscriber.email);
            let link = self.config.unsubscribe_link(&subscriber.email, &token);
            let message = templates::newsletter_issue(&self.config.site, &post, &subscriber.email, &link);

            match self.email.send(&message).await {
                Ok(()) => {
                    sent += 1;
                    record_email("newsletter", true);
                }
                Err(e) => {
                    failed += 1;
                    record_email("newsletter", false);
                    warn!(post_id = %id, subscriber_id = %subscriber.id, error = %e, "Newsletter delivery failed");
                }
            }
        }

        self.posts
            .mark_sent(id, sent as i32, failed as i32)
            .await?
            .ok_or_else(|| ApiError::Conflict("Newsletter post was sent concurrently".into()))?;

        self.append_event(
            NewEvent::new(EventType::NewsletterSent)
                .with_metadata(json!({ "post_id": id, "sent": sent, "failed": failed })),
        )
        .await;
        info!(post_id = %id, sent, failed, "Newsletter sent");

        Ok(SendNewsletterResponse {
            ok: true,
            sent,
            failed,
        })
    }

    async fn append_event(&self, event: NewEvent) {
        if let Err(e) = self.events.append(&event).await {
            warn!(event_type = %event.event_type, error = %e, "Failed to append event");
        }
    }
}
