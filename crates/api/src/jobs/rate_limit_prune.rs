//! Drops idle per-IP rate limiter entries so the keyed map stays small.

use std::sync::Arc;

use tracing::debug;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::rate_limit::RateLimiterState;

pub struct RateLimitPruneJob {
    limiter: Arc<RateLimiterState>,
}

impl RateLimitPruneJob {
    pub fn new(limiter: Arc<RateLimiterState>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Job for RateLimitPruneJob {
    fn name(&self) -> &'static str {
        "rate_limit_prune"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(5)
    }

    async fn execute(&self) -> Result<(), String> {
        let remaining = self.limiter.prune();
        debug!(remaining, "Rate limiter pruned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prune_runs() {
        let limiter = Arc::new(RateLimiterState::new(10, false).unwrap());
        let job = RateLimitPruneJob::new(limiter);
        assert_eq!(job.frequency(), JobFrequency::Minutes(5));
        assert!(job.execute().await.is_ok());
    }
}
