//! Periodic removal of expired cache entries.
//!
//! Reads never depend on this job. It only bounds how long dead rows
//! occupy storage when nobody reads them again.

use std::sync::Arc;

use relief_core::ports::KeyValueCache;
use tokio_cron_scheduler::JobSchedulerError;

use super::Scheduler;

/// Register the purge job on `schedule`.
pub async fn register_purge_job(
    scheduler: &Scheduler,
    schedule: &str,
    cache: Arc<dyn KeyValueCache>,
) -> Result<uuid::Uuid, JobSchedulerError> {
    scheduler
        .add_cron(schedule, move || {
            let cache = cache.clone();
            async move { run_purge(cache.as_ref()).await }
        })
        .await
}

async fn run_purge(cache: &dyn KeyValueCache) {
    match cache.purge_expired().await {
        Ok(0) => tracing::debug!(backend = cache.backend(), "No expired cache entries"),
        Ok(removed) => {
            tracing::info!(backend = cache.backend(), removed, "Purged expired cache entries")
        }
        Err(e) => tracing::warn!(backend = cache.backend(), error = %e, "Cache purge failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use relief_core::domain::{CacheKey, Ttl};
    use relief_core::ports::ManualClock;
    use relief_infra::InMemoryCache;
    use serde_json::json;

    use super::*;

    #[actix_rt::test]
    async fn test_run_purge_removes_expired() {
        let clock = Arc::new(ManualClock::default());
        let cache = InMemoryCache::with_clock(clock.clone());
        cache
            .set(&CacheKey::new("old").unwrap(), &json!(1), Ttl::minutes(1).unwrap())
            .await
            .unwrap();
        cache
            .set(&CacheKey::new("fresh").unwrap(), &json!(2), Ttl::minutes(60).unwrap())
            .await
            .unwrap();

        clock.advance(chrono::Duration::minutes(5));
        run_purge(&cache).await;

        assert_eq!(cache.len().await, 1);
    }
}
