//! Repository implementations for database operations.

pub mod event;
pub mod lead;
pub mod newsletter_post;
pub mod newsletter_subscriber;

pub use event::EventRepository;
pub use lead::LeadRepository;
pub use newsletter_post::NewsletterPostRepository;
pub use newsletter_subscriber::NewsletterSubscriberRepository;
