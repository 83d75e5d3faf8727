//! Periodic drip email dispatch.

use chrono::Utc;

use super::scheduler::{Job, JobFrequency};
use crate::error::ApiError;
use crate::services::drip_dispatch::DripDispatcher;

pub struct DripDispatchJob {
    dispatcher: DripDispatcher,
    interval_minutes: u64,
}

impl DripDispatchJob {
    pub fn new(dispatcher: DripDispatcher, interval_minutes: u64) -> Self {
        Self {
            dispatcher,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for DripDispatchJob {
    fn name(&self) -> &'static str {
        "drip_dispatch"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        match self.dispatcher.run(Utc::now()).await {
            Ok(_) => Ok(()),
            // Email switched off: nothing to do, not a failure.
            Err(ApiError::NotConfigured(_)) => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }
}
