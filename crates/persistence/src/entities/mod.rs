//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod event;
pub mod lead;
pub mod newsletter;

pub use event::{EventEntity, EventTypeDb};
pub use lead::{LeadEntity, LeadStatusDb};
pub use newsletter::{NewsletterPostEntity, PostStatusDb, SubscriberEntity, SubscriberStatusDb};
