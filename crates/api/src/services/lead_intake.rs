//! Lead capture from the tool result form and the contact form.
//!
//! Check-then-insert by normalized email. A concurrent insert that wins the
//! race surfaces as a unique violation and is handled as a repeat submission.
//! Events and emails after the lead write are best-effort: failures are logged
//! and never turn an accepted submission into an error.

use domain::models::{EventType, Lead, LeadSubmission, NewEvent};
use domain::services::{drip, initial_tags, merge};
use persistence::db::is_unique_violation;
use persistence::repositories::{EventRepository, LeadRepository};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SiteConfig;
use crate::error::ApiError;
use crate::middleware::metrics::{record_email, record_lead_captured};
use crate::services::email::EmailService;
use crate::services::templates;

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub lead_id: Uuid,
    pub updated: bool,
    pub email_sent: bool,
}

pub struct LeadIntakeService {
    leads: LeadRepository,
    events: EventRepository,
    email: EmailService,
    site: SiteConfig,
}

impl LeadIntakeService {
    pub fn new(pool: PgPool, email: EmailService, site: SiteConfig) -> Self {
        Self {
            leads: LeadRepository::new(pool.clone()),
            events: EventRepository::new(pool),
            email,
            site,
        }
    }

    pub async fn submit(&self, submission: LeadSubmission) -> Result<IntakeOutcome, ApiError> {
        let (lead, updated) = match self.leads.find_by_email(&submission.email).await? {
            Some(existing) => (self.update_existing(existing.into(), &submission).await?, true),
            None => match self.create_new(&submission).await {
                Ok(lead) => (lead, false),
                Err(e) if is_unique_violation(&e) => {
                    info!(email = %submission.email, "Lead inserted concurrently, updating instead");
                    let existing = self
                        .leads
                        .find_by_email(&submission.email)
                        .await?
                        .ok_or_else(|| ApiError::Internal("Lead vanished after conflict".into()))?;
                    (self.update_existing(existing.into(), &submission).await?, true)
                }
                Err(e) => return Err(e.into()),
            },
        };

        let activity = match submission.tool {
            Some(_) => EventType::ToolUsed,
            None => EventType::ContactSubmitted,
        };
        self.append_event(
            NewEvent::for_lead(activity, lead.id).with_metadata(json!({ "source": submission.source })),
        )
        .await;

        record_lead_captured(&submission.source, updated);
        info!(lead_id = %lead.id, source = %submission.source, updated, "Lead captured");

        let email_sent = self.send_emails(lead.id, &submission, updated).await;

        Ok(IntakeOutcome {
            lead_id: lead.id,
            updated,
            email_sent,
        })
    }

    async fn create_new(&self, submission: &LeadSubmission) -> Result<Lead, sqlx::Error> {
        let lead: Lead = self
            .leads
            .create(submission, &initial_tags(submission))
            .await?
            .into();

        self.append_event(
            NewEvent::for_lead(EventType::LeadCreated, lead.id)
                .with_metadata(json!({ "source": submission.source })),
        )
        .await;

        let steps = drip::schedule(lead.created_at);
        if let Err(e) = self.events.schedule_drip(lead.id, &steps).await {
            warn!(lead_id = %lead.id, error = %e, "Failed to schedule drip sequence");
        }

        Ok(lead)
    }

    async fn update_existing(
        &self,
        existing: Lead,
        submission: &LeadSubmission,
    ) -> Result<Lead, ApiError> {
        let merged = merge(&existing, submission);
        let lead: Lead = self
            .leads
            .apply_merge(existing.id, &merged)
            .await?
            .ok_or_else(|| ApiError::NotFound("Lead not found".into()))?
            .into();

        self.append_event(
            NewEvent::for_lead(EventType::LeadUpdated, lead.id)
                .with_metadata(json!({ "source": submission.source })),
        )
        .await;

        Ok(lead)
    }

    async fn append_event(&self, event: NewEvent) {
        if let Err(e) = self.events.append(&event).await {
            warn!(
                event_type = %event.event_type,
                lead_id = ?event.lead_id,
                error = %e,
                "Failed to append event"
            );
        }
    }

    /// Advisor notification plus confirmation to the lead. True only if the
    /// confirmation reached the provider.
    async fn send_emails(&self, lead_id: Uuid, submission: &LeadSubmission, updated: bool) -> bool {
        if !self.email.is_configured() {
            return false;
        }

        if let Some(message) = templates::advisor_notification(&self.site, lead_id, submission, updated) {
            let result = self.email.send(&message).await;
            record_email("advisor_notification", result.is_ok());
            if let Err(e) = result {
                warn!(lead_id = %lead_id, error = %e, "Advisor notification failed");
            }
        }

        let confirmation = templates::lead_confirmation(&self.site, submission);
        let result = self.email.send(&confirmation).await;
        record_email("lead_confirmation", result.is_ok());
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(lead_id = %lead_id, error = %e, "Lead confirmation failed");
                false
            }
        }
    }
}
