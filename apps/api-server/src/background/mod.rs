//! Background expiry sweep using tokio-cron-scheduler.
//!
//! Posts whose `expires_at` has passed already read as expired through
//! the derived flag; the sweeper settles the stored column so database
//! queries and the API agree without recomputation.

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use mealboard_core::ports::PostRepository;

use crate::config::SweeperConfig;

/// Start the hourly expiry sweep. Returns the running scheduler so the
/// caller can hold it for the life of the server, or `None` when
/// sweeping is disabled.
pub async fn start_sweeper(
    config: &SweeperConfig,
    posts: Arc<dyn PostRepository>,
) -> Result<Option<JobScheduler>, JobSchedulerError> {
    if !config.enabled {
        tracing::info!("Expiry sweeper disabled");
        return Ok(None);
    }

    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(config.schedule.as_str(), move |_uuid, _lock| {
        let posts = posts.clone();
        Box::pin(async move {
            match posts.expire_elapsed(Utc::now()).await {
                Ok(0) => tracing::debug!("Expiry sweep found nothing to settle"),
                Ok(settled) => tracing::info!(settled, "Expiry sweep settled posts"),
                Err(e) => tracing::error!(error = %e, "Expiry sweep failed"),
            }
        })
    })?;

    let job_id = scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(schedule = %config.schedule, job_id = %job_id, "Expiry sweeper started");

    Ok(Some(scheduler))
}
