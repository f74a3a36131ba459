use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::database::{CsvSink, Database};
use crate::error::FetchError;
use crate::fetcher::HttpFetcher;
use crate::history::{FileHistoryStore, NoveltyTracker};
use crate::models::{AdLink, DetailRecord};
use crate::notify;
use crate::politeness::{Pacer, RetryPolicy};
use crate::query;
use crate::scrapers::AdapterRegistry;
use crate::traits::{Fetcher, HistoryStore, Notifier, RecordSink, SiteAdapter};

/// External services a pass talks to
pub struct Collaborators {
    pub fetcher: Arc<dyn Fetcher>,
    pub history: Box<dyn HistoryStore>,
    pub notifier: Arc<dyn Notifier>,
    pub sinks: Vec<Arc<dyn RecordSink>>,
}

/// Outcome of one pass over the configured search URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Search URLs whose results page was fetched and handled
    pub processed: usize,
    /// Search URLs that exhausted their retries
    pub failed: Vec<String>,
    /// Search URLs no adapter handles
    pub unsupported: Vec<String>,
    pub new_ads: usize,
    pub notifications_sent: usize,
    pub records_stored: usize,
}

impl PassReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.unsupported.is_empty()
    }
}

#[derive(Clone)]
pub struct PropertyFinder {
    fetcher: Arc<dyn Fetcher>,
    registry: Arc<AdapterRegistry>,
    tracker: Arc<Mutex<NoveltyTracker>>,
    notifier: Arc<dyn Notifier>,
    sinks: Vec<Arc<dyn RecordSink>>,
    pacer: Arc<Pacer>,
    retry: RetryPolicy,
    search_urls: Arc<Vec<String>>,
    refresh_seen_details: bool,
}

impl PropertyFinder {
    pub async fn new(
        config: &Config,
        search_urls: Vec<String>,
        collaborators: Collaborators,
    ) -> Self {
        let tracker = NoveltyTracker::load(collaborators.history).await;
        let registry = AdapterRegistry::with_known_sites();
        info!("Registered adapters: {}", registry.list_sites().join(", "));

        Self {
            fetcher: collaborators.fetcher,
            registry: Arc::new(registry),
            tracker: Arc::new(Mutex::new(tracker)),
            notifier: collaborators.notifier,
            sinks: collaborators.sinks,
            pacer: Arc::new(Pacer::new(config.politeness_delay)),
            retry: config.retry_policy(),
            search_urls: Arc::new(search_urls),
            refresh_seen_details: config.refresh_seen_details,
        }
    }

    /// Wire up the production collaborators: HTTP fetcher, history file,
    /// SQLite archive (plus CSV export when configured) and notifier.
    pub async fn from_config(config: &Config, search_urls: Vec<String>) -> Result<Self> {
        let database = Database::connect(&config.database_url).await?;

        let mut sinks: Vec<Arc<dyn RecordSink>> = vec![Arc::new(database)];
        if let Some(path) = &config.csv_export_path {
            sinks.push(Arc::new(CsvSink::new(path)));
        }

        let collaborators = Collaborators {
            fetcher: Arc::new(HttpFetcher::new(config)?),
            history: Box::new(FileHistoryStore::new(&config.history_file)),
            notifier: notify::from_config(config)?,
            sinks,
        };

        Ok(Self::new(config, search_urls, collaborators).await)
    }

    /// Process every configured search URL once, in order
    pub async fn run_pass(&self) -> PassReport {
        let mut report = PassReport::default();

        for search_url in self.search_urls.iter() {
            let adapter = match self.registry.select_adapter(search_url) {
                Ok(adapter) => adapter,
                Err(e) => {
                    warn!("Skipping search URL: {}", e);
                    report.unsupported.push(search_url.clone());
                    continue;
                }
            };

            info!("Processing {} ({})", search_url, adapter.site().name());
            match self.collect_ads(adapter, search_url).await {
                Ok(ads) => {
                    self.process_ads(adapter, search_url, ads, &mut report).await;
                    report.processed += 1;
                }
                Err(e) => {
                    error!("Giving up on {}: {}", search_url, e);
                    report.failed.push(search_url.clone());
                }
            }
        }

        if report.new_ads > 0 {
            info!(
                "Found {} new ads, sent {} notifications",
                report.new_ads, report.notifications_sent
            );
        } else {
            info!("No new ads found");
        }

        report
    }

    /// Fetch the results page and extract its ads, retrying the whole cycle
    async fn collect_ads(
        &self,
        adapter: &dyn SiteAdapter,
        search_url: &str,
    ) -> Result<Vec<AdLink>, FetchError> {
        let fetcher = &*self.fetcher;
        let pacer = &*self.pacer;

        self.retry
            .run(search_url, move || async move {
                pacer.wait().await;
                let html = fetcher.fetch(search_url).await?;
                Ok::<_, FetchError>(adapter.extract_ad_links(&html))
            })
            .await
    }

    async fn process_ads(
        &self,
        adapter: &dyn SiteAdapter,
        search_url: &str,
        ads: Vec<AdLink>,
        report: &mut PassReport,
    ) {
        // Held until the new ads are marked seen
        let mut tracker = self.tracker.lock().await;

        let (seen, unseen) = tracker.classify(ads);
        info!(
            "{}: {} new ads, {} already seen",
            search_url,
            unseen.len(),
            seen.len()
        );
        report.new_ads += unseen.len();

        let mut to_fetch: Vec<&AdLink> = unseen.iter().collect();
        if self.refresh_seen_details {
            to_fetch.extend(&seen);
        }
        let records = self.fetch_details(adapter, &to_fetch).await;

        let summary = query::describe(search_url);
        for ad in &unseen {
            let details = records.iter().find(|record| record.url == ad.url);
            let message = notify::format_message(&ad.url, &summary, details);

            self.pacer.wait().await;
            match self.notifier.send(&message).await {
                Ok(()) => report.notifications_sent += 1,
                Err(e) => error!("Failed to send notification for {}: {:#}", ad.url, e),
            }
        }

        let unseen_urls: Vec<String> = unseen.into_iter().map(|ad| ad.url).collect();
        if let Err(e) = tracker.mark_seen(&unseen_urls).await {
            error!("Failed to record {} ads as seen: {:#}", unseen_urls.len(), e);
        }
        drop(tracker);

        report.records_stored += self.persist(&records).await;
    }

    async fn fetch_details(&self, adapter: &dyn SiteAdapter, ads: &[&AdLink]) -> Vec<DetailRecord> {
        let mut records = Vec::with_capacity(ads.len());

        for ad in ads {
            self.pacer.wait().await;
            match self.fetcher.fetch(&ad.url).await {
                Ok(html) => records.push(adapter.extract_ad_details(&ad.url, &html)),
                Err(e) => warn!("Skipping ad details: {}", e),
            }
        }

        records
    }

    /// Hand the records to every sink. Returns how many were stored by at
    /// least one sink.
    async fn persist(&self, records: &[DetailRecord]) -> usize {
        if records.is_empty() {
            return 0;
        }

        let mut stored = false;
        for sink in &self.sinks {
            match sink.append(records).await {
                Ok(()) => {
                    info!("Stored {} records in {}", records.len(), sink.name());
                    stored = true;
                }
                Err(e) => error!("Failed to store records in {}: {:#}", sink.name(), e),
            }
        }

        if stored { records.len() } else { 0 }
    }
}
