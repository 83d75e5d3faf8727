//! Sends drip emails whose time has come.
//!
//! Shared by `POST /api/admin/drip/process` and the background job. Runs are
//! serialized within the process so the two never send the same step twice.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::models::{DripMetadata, Event, EventType, Lead, NewEvent};
use domain::services::drip;
use persistence::repositories::{EventRepository, LeadRepository};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::SiteConfig;
use crate::error::ApiError;
use crate::middleware::metrics::{record_drip_dispatch, record_email};
use crate::services::email::EmailService;
use crate::services::templates;

/// Counts for one dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DripRunSummary {
    pub processed: u32,
    pub sent: u32,
    pub failed: u32,
    pub skipped: u32,
}

/// Decision for one due event, before any email is sent.
#[derive(Debug, Clone)]
enum DripAction {
    Send { lead: Lead, step: u32, attempts: u32 },
    Skip(&'static str),
}

fn plan(metadata: Option<DripMetadata>, lead: Option<Lead>) -> DripAction {
    let Some(metadata) = metadata else {
        return DripAction::Skip("invalid metadata");
    };
    let Some(lead) = lead else {
        return DripAction::Skip("lead missing");
    };
    if !lead.status.accepts_drip() {
        return DripAction::Skip("lead no longer in funnel");
    }
    DripAction::Send {
        lead,
        step: metadata.step,
        attempts: metadata.attempts,
    }
}

#[derive(Clone)]
pub struct DripDispatcher {
    leads: LeadRepository,
    events: EventRepository,
    email: EmailService,
    site: SiteConfig,
    batch_size: i64,
    run_lock: Arc<Mutex<()>>,
}

impl DripDispatcher {
    pub fn new(pool: PgPool, email: EmailService, site: SiteConfig, batch_size: i64) -> Self {
        Self {
            leads: LeadRepository::new(pool.clone()),
            events: EventRepository::new(pool),
            email,
            site,
            batch_size,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Processes one batch of due drip events.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<DripRunSummary, ApiError> {
        if !self.email.is_configured() {
            return Err(ApiError::NotConfigured("Email is not configured".into()));
        }

        let _guard = self.run_lock.lock().await;
        let due = self.events.find_due_drips(now, self.batch_size).await?;
        let mut summary = DripRunSummary::default();

        for entity in due {
            let event: Event = entity.into();
            summary.processed += 1;

            let metadata = serde_json::from_value::<DripMetadata>(event.metadata.clone()).ok();
            let lead = match event.lead_id {
                Some(id) => self.leads.find_by_id(id).await?.map(Lead::from),
                None => None,
            };

            let (lead, step, attempts) = match plan(metadata, lead) {
                DripAction::Send {
                    lead,
                    step,
                    attempts,
                } => (lead, step, attempts),
                DripAction::Skip(reason) => {
                    self.events.mark_drip_sent(event.id).await?;
                    summary.skipped += 1;
                    info!(event_id = %event.id, reason, "Drip step skipped");
                    continue;
                }
            };

            let Some(message) = templates::drip_message(&self.site, &lead, step) else {
                self.events.mark_drip_sent(event.id).await?;
                summary.skipped += 1;
                warn!(event_id = %event.id, step, "Drip step not in sequence, skipped");
                continue;
            };

            let result = self.email.send(&message).await;
            record_email("drip", result.is_ok());
            if let Err(e) = result {
                summary.failed += 1;
                let attempts = attempts + 1;
                let give_up = drip::exhausted(attempts);
                self.events
                    .record_drip_failure(event.id, attempts, give_up)
                    .await?;
                if give_up {
                    warn!(event_id = %event.id, lead_id = %lead.id, step, attempts, error = %e, "Drip email failed, giving up");
                } else {
                    warn!(event_id = %event.id, lead_id = %lead.id, step, attempts, error = %e, "Drip email failed, will retry");
                }
                continue;
            }

            self.events.mark_drip_sent(event.id).await?;
            let sent_event = NewEvent::for_lead(EventType::DripSent, lead.id)
                .with_metadata(json!({ "step": step, "drip_event_id": event.id }));
            if let Err(e) = self.events.append(&sent_event).await {
                warn!(lead_id = %lead.id, error = %e, "Failed to record drip_sent event");
            }
            summary.sent += 1;
        }

        record_drip_dispatch(summary.sent, summary.failed, summary.skipped);
        if summary.processed > 0 {
            info!(
                processed = summary.processed,
                sent = summary.sent,
                failed = summary.failed,
                skipped = summary.skipped,
                "Drip dispatch finished"
            );
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::LeadStatus;
    use uuid::Uuid;

    fn lead(status: LeadStatus) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            phone: None,
            source: "loan".to_string(),
            tool_result: json!({}),
            status,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn metadata(step: u32) -> Option<DripMetadata> {
        Some(DripMetadata {
            step,
            send_at: Utc::now(),
            sent: false,
            attempts: 1,
            failed: false,
        })
    }

    #[test]
    fn test_plan_sends_for_open_lead() {
        let action = plan(metadata(2), Some(lead(LeadStatus::Qualified)));
        assert!(matches!(
            action,
            DripAction::Send {
                step: 2,
                attempts: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_plan_skips_closed_and_converted() {
        assert!(matches!(
            plan(metadata(1), Some(lead(LeadStatus::Converted))),
            DripAction::Skip("lead no longer in funnel")
        ));
        assert!(matches!(
            plan(metadata(1), Some(lead(LeadStatus::Closed))),
            DripAction::Skip("lead no longer in funnel")
        ));
    }

    #[test]
    fn test_plan_skips_missing_lead_or_metadata() {
        assert!(matches!(
            plan(metadata(1), None),
            DripAction::Skip("lead missing")
        ));
        assert!(matches!(
            plan(None, Some(lead(LeadStatus::New))),
            DripAction::Skip("invalid metadata")
        ));
    }
}
