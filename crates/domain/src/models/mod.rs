//! Domain models for the advisory site.

pub mod ai;
pub mod blog;
pub mod event;
pub mod lead;
pub mod newsletter;

pub use blog::{BlogPost, BlogStatus, Frontmatter, FrontmatterError};
pub use event::{DripMetadata, Event, EventType, NewEvent};
pub use lead::{Lead, LeadStatus, LeadSubmission};
pub use newsletter::{NewsletterPost, NewsletterSubscriber, PostStatus, SubscriberStatus};
