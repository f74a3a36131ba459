use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use property_finder::config::{Config, load_search_urls};
use property_finder::finder::PropertyFinder;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting property finder");

    let config = Config::from_env()?;
    let search_urls = load_search_urls(&config.urls_file).await?;
    if search_urls.is_empty() {
        error!("No search URLs in {}", config.urls_file.display());
        return Ok(ExitCode::FAILURE);
    }
    info!("Loaded {} search URLs", search_urls.len());

    let finder = PropertyFinder::from_config(&config, search_urls).await?;

    let Some(schedule) = config.schedule.clone() else {
        let report = finder.run_pass().await;
        info!(
            "Pass finished: {} processed, {} failed, {} unsupported",
            report.processed,
            report.failed.len(),
            report.unsupported.len()
        );
        return Ok(if report.is_clean() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    };

    // Run once immediately, then on every tick
    let report = finder.run_pass().await;
    if !report.is_clean() {
        warn!("Initial pass finished with problems: {:?}", report);
    }

    let sched = JobScheduler::new().await?;

    let job_finder = finder.clone();
    sched
        .add(
            Job::new_async(schedule.as_str(), move |_uuid, _l| {
                let finder = job_finder.clone();
                Box::pin(async move {
                    let report = finder.run_pass().await;
                    if !report.is_clean() {
                        warn!("Scheduled pass finished with problems: {:?}", report);
                    }
                })
            })
            .with_context(|| format!("Invalid SCHEDULE expression {schedule:?}"))?,
        )
        .await?;

    info!("Scheduler started ({})", schedule);
    sched.start().await?;

    // Keep the program running
    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(30)).await;
    }
}
