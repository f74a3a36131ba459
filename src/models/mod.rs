//! Data models for scraped ads and notification payloads

use serde::{Deserialize, Serialize};

/// Listing sites with a registered adapter, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Facebook,
    Zonaprop,
    Argenprop,
    MercadoLibre,
}

impl Site {
    pub const ALL: [Site; 4] = [
        Site::Facebook,
        Site::Zonaprop,
        Site::Argenprop,
        Site::MercadoLibre,
    ];

    /// Display name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Site::Facebook => "Facebook Marketplace",
            Site::Zonaprop => "Zonaprop",
            Site::Argenprop => "Argenprop",
            Site::MercadoLibre => "MercadoLibre",
        }
    }

    /// Hostname fragments that identify this site
    pub fn hostnames(self) -> &'static [&'static str] {
        match self {
            Site::Facebook => &["facebook.com"],
            Site::Zonaprop => &["zonaprop.com.ar"],
            Site::Argenprop => &["argenprop.com"],
            Site::MercadoLibre => &["mercadolibre.com.ar"],
        }
    }

    pub fn matches_host(self, host: &str) -> bool {
        self.hostnames().iter().any(|fragment| host.contains(fragment))
    }

    /// First site, in registration order, whose hostname set matches `host`
    pub fn for_host(host: &str) -> Option<Site> {
        Self::ALL.into_iter().find(|site| site.matches_host(host))
    }
}

/// A single ad found on a search-results page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdLink {
    pub url: String,
}

impl AdLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Best-effort details extracted from an ad page.
///
/// Field order matches the archived column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub url: String,
    pub price: Option<String>,
    pub expenses: Option<String>,
    pub neighbourhood: Option<String>,
    pub surface: Option<String>,
    pub rooms: Option<String>,
}

impl DetailRecord {
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Whether at least one detail field was extracted
    pub fn has_details(&self) -> bool {
        [
            &self.price,
            &self.expenses,
            &self.neighbourhood,
            &self.surface,
            &self.rooms,
        ]
        .iter()
        .any(|field| field.is_some())
    }
}

/// Human-readable decomposition of a search URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub zone: Option<String>,
    pub price_range: Option<String>,
    pub min_surface: Option<String>,
}

/// Telegram `sendMessage` payload
#[derive(Debug, Serialize)]
pub struct TelegramMessage {
    pub chat_id: String,
    pub text: String,
    pub disable_web_page_preview: bool,
}

/// Discord webhook message payload
#[derive(Debug, Serialize)]
pub struct DiscordMessage {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_for_host() {
        assert_eq!(Site::for_host("www.zonaprop.com.ar"), Some(Site::Zonaprop));
        assert_eq!(
            Site::for_host("inmuebles.mercadolibre.com.ar"),
            Some(Site::MercadoLibre)
        );
        assert_eq!(Site::for_host("www.facebook.com"), Some(Site::Facebook));
        assert_eq!(Site::for_host("www.example.com"), None);
    }

    #[test]
    fn test_has_details() {
        let mut record = DetailRecord::empty("https://www.argenprop.com/x--1");
        assert!(!record.has_details());

        record.rooms = Some("3".to_string());
        assert!(record.has_details());
    }
}
