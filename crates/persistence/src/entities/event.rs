//! Event entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{Event, EventType};

/// Database enum for event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
pub enum EventTypeDb {
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

impl From<EventTypeDb> for EventType {
    fn from(db: EventTypeDb) -> Self {
        match db {
            EventTypeDb::LeadCreated => EventType::LeadCreated,
            EventTypeDb::LeadUpdated => EventType::LeadUpdated,
            EventTypeDb::ToolUsed => EventType::ToolUsed,
            EventTypeDb::ContactSubmitted => EventType::ContactSubmitted,
            EventTypeDb::DripScheduled => EventType::DripScheduled,
            EventTypeDb::DripSent => EventType::DripSent,
            EventTypeDb::NewsletterSubscribed => EventType::NewsletterSubscribed,
            EventTypeDb::NewsletterUnsubscribed => EventType::NewsletterUnsubscribed,
            EventTypeDb::NewsletterSent => EventType::NewsletterSent,
        }
    }
}

impl From<EventType> for EventTypeDb {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::LeadCreated => EventTypeDb::LeadCreated,
            EventType::LeadUpdated => EventTypeDb::LeadUpdated,
            EventType::ToolUsed => EventTypeDb::ToolUsed,
            EventType::ContactSubmitted => EventTypeDb::ContactSubmitted,
            EventType::DripScheduled => EventTypeDb::DripScheduled,
            EventType::DripSent => EventTypeDb::DripSent,
            EventType::NewsletterSubscribed => EventTypeDb::NewsletterSubscribed,
            EventType::NewsletterUnsubscribed => EventTypeDb::NewsletterUnsubscribed,
            EventType::NewsletterSent => EventTypeDb::NewsletterSent,
        }
    }
}

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub event_type: EventTypeDb,
    pub lead_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<EventEntity> for Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: entity.id,
            event_type: entity.event_type.into(),
            lead_id: entity.lead_id,
            metadata: entity.metadata,
            created_at: entity.created_at,
        }
    }
}
