//! Application services: integrations with outside systems and the
//! workflows that span several repositories.

pub mod ai;
pub mod drip_dispatch;
pub mod email;
pub mod lead_intake;
pub mod newsletter;
pub mod session;
pub mod templates;

pub use ai::{AiClient, AiError};
pub use drip_dispatch::{DripDispatcher, DripRunSummary};
pub use email::{EmailError, EmailMessage, EmailService};
pub use lead_intake::{IntakeOutcome, LeadIntakeService};
pub use newsletter::NewsletterService;
pub use session::{AdminPrincipal, AdminSessions};
