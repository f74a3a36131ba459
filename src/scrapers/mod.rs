//! Site adapters and hostname-based dispatch

pub mod argenprop;
pub mod extract;
pub mod facebook;
pub mod mercadolibre;
pub mod zonaprop;

use tracing::debug;
use url::Url;

use crate::error::UnsupportedSiteError;
use crate::traits::SiteAdapter;

pub use argenprop::ArgenpropAdapter;
pub use facebook::FacebookAdapter;
pub use mercadolibre::MercadoLibreAdapter;
pub use zonaprop::ZonapropAdapter;

/// Registry of site adapters, matched by hostname in registration order
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn SiteAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Registry holding every supported site
    pub fn with_known_sites() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(FacebookAdapter::new()));
        registry.register(Box::new(ZonapropAdapter::new()));
        registry.register(Box::new(ArgenpropAdapter::new()));
        registry.register(Box::new(MercadoLibreAdapter::new()));
        registry
    }

    pub fn register(&mut self, adapter: Box<dyn SiteAdapter>) {
        self.adapters.push(adapter);
    }

    /// Select the adapter whose hostname set matches the URL's host
    pub fn select_adapter(&self, url: &str) -> Result<&dyn SiteAdapter, UnsupportedSiteError> {
        let unsupported = || UnsupportedSiteError {
            url: url.to_string(),
        };

        let parsed = Url::parse(url.trim()).map_err(|_| unsupported())?;
        let host = parsed.host_str().ok_or_else(unsupported)?;

        let adapter = self
            .adapters
            .iter()
            .find(|adapter| adapter.site().matches_host(host))
            .ok_or_else(unsupported)?;

        debug!("Selected {} adapter for {}", adapter.site().name(), url);
        Ok(&**adapter)
    }

    pub fn list_sites(&self) -> Vec<&'static str> {
        self.adapters
            .iter()
            .map(|adapter| adapter.site().name())
            .collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_known_sites()
    }
}
