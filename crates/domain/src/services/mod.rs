//! Domain services for the advisory site.
//!
//! Services contain business rules that operate on domain models without I/O.

pub mod drip;
pub mod lead_merge;
pub mod summary;

pub use drip::{DripContext, DripEmail, DripStep, DRIP_SEQUENCE};
pub use lead_merge::{initial_tags, merge, LeadMerge};
pub use summary::{build_messages, ChatMessage};
