//! Traits and interfaces for site-agnostic scraping

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use url::Url;

use crate::error::FetchError;
use crate::models::{AdLink, DetailRecord, Site};
use crate::scrapers::extract::{LinkStrategy, Page, Strategy};

/// Configuration for a site adapter
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Which site this adapter handles
    pub site: Site,
    /// Base URL relative links are resolved against
    pub base_url: String,
    /// Link queries for search pages, most specific first
    pub link_strategies: Vec<LinkStrategy>,
    /// Extraction chains for ad pages
    pub fields: FieldStrategies,
}

/// Ordered extraction strategies per detail field
#[derive(Debug, Clone, Default)]
pub struct FieldStrategies {
    pub price: Vec<Strategy>,
    pub expenses: Vec<Strategy>,
    pub neighbourhood: Vec<Strategy>,
    pub surface: Vec<Strategy>,
    pub rooms: Vec<Strategy>,
}

/// Trait for site-specific ad extraction.
///
/// Adapters are stateless: both operations are pure functions of their
/// input and never fail. Markup that does not match degrades to an empty
/// link list or to `None` fields.
pub trait SiteAdapter: Send + Sync {
    /// Get the configuration for this adapter
    fn config(&self) -> &SiteConfig;

    fn site(&self) -> Site {
        self.config().site
    }

    /// Extract the ads listed on a search-results page.
    ///
    /// The first link strategy yielding at least one valid URL wins. The
    /// result is deduplicated by normalized URL, keeping the first
    /// occurrence in document order.
    fn extract_ad_links(&self, html: &str) -> Vec<AdLink> {
        let page = Page::parse(html);

        let urls = self
            .config()
            .link_strategies
            .iter()
            .map(|strategy| {
                page.links(strategy)
                    .iter()
                    .filter_map(|href| self.normalize_link(href))
                    .collect::<Vec<_>>()
            })
            .find(|urls| !urls.is_empty())
            .unwrap_or_default();

        let mut seen = HashSet::new();
        urls.into_iter()
            .filter(|url| seen.insert(url.clone()))
            .map(AdLink::new)
            .collect()
    }

    /// Extract the details of a single ad page
    fn extract_ad_details(&self, url: &str, html: &str) -> DetailRecord {
        let page = Page::parse(html);
        let fields = &self.config().fields;

        DetailRecord {
            url: url.to_string(),
            price: page.first(&fields.price),
            expenses: page.first(&fields.expenses),
            neighbourhood: page.first(&fields.neighbourhood),
            surface: page.first(&fields.surface),
            rooms: page.first(&fields.rooms),
        }
    }

    /// Resolve a raw link against the site's base URL and strip the query
    /// and fragment, which only carry tracking state on supported sites.
    fn normalize_link(&self, href: &str) -> Option<String> {
        let base = Url::parse(&self.config().base_url).ok()?;
        let mut url = base.join(href.trim()).ok()?;

        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        url.set_query(None);
        url.set_fragment(None);
        Some(url.to_string())
    }
}

/// Fetches raw page bodies
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Durable append-only log of seen ad URLs
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self) -> Result<HashSet<String>>;

    async fn append(&self, urls: &[String]) -> Result<()>;
}

/// Delivers notification text to the operator
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

/// Archives extracted ad details. Re-appending a url replaces its record.
#[async_trait]
pub trait RecordSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn append(&self, records: &[DetailRecord]) -> Result<()>;
}
