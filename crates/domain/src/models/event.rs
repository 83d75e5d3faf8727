//! Event log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Kind of an event row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    LeadCreated,
    LeadUpdated,
    ToolUsed,
    ContactSubmitted,
    DripScheduled,
    DripSent,
    NewsletterSubscribed,
    NewsletterUnsubscribed,
    NewsletterSent,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::LeadCreated => "lead_created",
            EventType::LeadUpdated => "lead_updated",
            EventType::ToolUsed => "tool_used",
            EventType::ContactSubmitted => "contact_submitted",
            EventType::DripScheduled => "drip_scheduled",
            EventType::DripSent => "drip_sent",
            EventType::NewsletterSubscribed => "newsletter_subscribed",
            EventType::NewsletterUnsubscribed => "newsletter_unsubscribed",
            EventType::NewsletterSent => "newsletter_sent",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead_created" => Ok(EventType::LeadCreated),
            "lead_updated" => Ok(EventType::LeadUpdated),
            "tool_used" => Ok(EventType::ToolUsed),
            "contact_submitted" => Ok(EventType::ContactSubmitted),
            "drip_scheduled" => Ok(EventType::DripScheduled),
            "drip_sent" => Ok(EventType::DripSent),
            "newsletter_subscribed" => Ok(EventType::NewsletterSubscribed),
            "newsletter_unsubscribed" => Ok(EventType::NewsletterUnsubscribed),
            "newsletter_sent" => Ok(EventType::NewsletterSent),
            other => Err(format!("Unknown event type: {}", other)),
        }
    }
}

/// An append-only event row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub event_type: EventType,
    pub lead_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Metadata carried by a `drip_scheduled` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DripMetadata {
    pub step: u32,
    pub send_at: DateTime<Utc>,
    #[serde(default)]
    pub sent: bool,
    /// Failed send attempts so far.
    #[serde(default)]
    pub attempts: u32,
    /// Set once the step has failed too often and will not be retried.
    #[serde(default)]
    pub failed: bool,
}

impl DripMetadata {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.sent && !self.failed && self.send_at <= now
    }
}

/// A new event to append.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_type: EventType,
    pub lead_id: Option<Uuid>,
    pub metadata: serde_json::Value,
}

impl NewEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            lead_id: None,
            metadata: serde_json::json!({}),
        }
    }

    pub fn for_lead(event_type: EventType, lead_id: Uuid) -> Self {
        Self {
            event_type,
            lead_id: Some(lead_id),
            metadata: serde_json::json!({}),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

fn default_limit() -> i64 {
    100
}

/// Query parameters for listing events.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListEventsQuery {
    pub event_type: Option<EventType>,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEventsResponse {
    pub ok: bool,
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_event_type_roundtrip() {
        let all = [
            EventType::LeadCreated,
            EventType::LeadUpdated,
            EventType::ToolUsed,
            EventType::ContactSubmitted,
            EventType::DripScheduled,
            EventType::DripSent,
            EventType::NewsletterSubscribed,
            EventType::NewsletterUnsubscribed,
            EventType::NewsletterSent,
        ];
        for event_type in all {
            assert_eq!(event_type.as_str().parse::<EventType>().unwrap(), event_type);
            let json = serde_json::to_value(event_type).unwrap();
            assert_eq!(json, event_type.as_str());
        }
    }

    #[test]
    fn test_drip_metadata_due() {
        let now = Utc::now();
        let meta = DripMetadata {
            step: 1,
            send_at: now - Duration::minutes(1),
            sent: false,
            attempts: 0,
            failed: false,
        };
        assert!(meta.is_due(now));
        assert!(!DripMetadata { sent: true, ..meta.clone() }.is_due(now));
        assert!(!DripMetadata { failed: true, ..meta.clone() }.is_due(now));
        assert!(!DripMetadata {
            send_at: now + Duration::hours(1),
            ..meta
        }
        .is_due(now));
    }

    #[test]
    fn test_drip_metadata_sent_defaults_false() {
        let meta: DripMetadata =
            serde_json::from_str(r#"{"step":2,"send_at":"2024-03-01T10:00:00Z"}"#).unwrap();
        assert_eq!(meta.step, 2);
        assert!(!meta.sent);
        assert_eq!(meta.attempts, 0);
        assert!(!meta.failed);
    }

    #[test]
    fn test_new_event_builder() {
        let lead_id = Uuid::new_v4();
        let event = NewEvent::for_lead(EventType::ToolUsed, lead_id)
            .with_metadata(serde_json::json!({ "tool": "loan" }));
        assert_eq!(event.lead_id, Some(lead_id));
        assert_eq!(event.metadata["tool"], "loan");
        assert!(NewEvent::new(EventType::NewsletterSent).lead_id.is_none());
    }
}
