//! MercadoLibre specific adapter

use crate::models::Site;
use crate::scrapers::extract::{
    EXPENSES_TEXT, JsonLdKey, LinkStrategy, ROOMS_TEXT, SURFACE_TEXT, Strategy,
};
use crate::traits::{FieldStrategies, SiteAdapter, SiteConfig};

const LISTING_MARKERS: &[&str] = &["/MLA-"];

/// Adapter for the mercadolibre.com.ar real-estate verticals
pub struct MercadoLibreAdapter {
    config: SiteConfig,
}

impl MercadoLibreAdapter {
    pub fn new() -> Self {
        let config = SiteConfig {
            site: Site::MercadoLibre,
            base_url: "https://departamento.mercadolibre.com.ar".to_string(),
            link_strategies: vec![
                LinkStrategy::Attribute {
                    selector: ".ui-search-result a[href], .andes-card a[href], li.ui-search-layout__item a.ui-search-link",
                    attr: "href",
                    markers: LISTING_MARKERS,
                },
                LinkStrategy::Attribute {
                    selector: "a[href]",
                    attr: "href",
                    markers: LISTING_MARKERS,
                },
                LinkStrategy::RawPattern(
                    r#"(https?://[a-z]+\.mercadolibre\.com\.ar/MLA-\d+[^"'\s\\?#]*)"#,
                ),
            ],
            fields: FieldStrategies {
                price: vec![
                    Strategy::JsonLd(JsonLdKey::OfferPrice),
                    Strategy::RawPattern(r#""price"\s*:\s*(\d+)"#),
                    Strategy::Selector(
                        r#".andes-money-amount__fraction, .price-tag-fraction, .ui-pdp-price__second-line, .price-tag, span[class*="price"]"#,
                    ),
                ],
                expenses: vec![
                    Strategy::JsonLd(JsonLdKey::Expenses),
                    Strategy::RawPattern(r#""Expensas"\s*[:,]\s*"?\$?\s?(\d[\d.]*)"#),
                    Strategy::TextNode(EXPENSES_TEXT),
                ],
                neighbourhood: vec![
                    Strategy::JsonLd(JsonLdKey::StreetAddress),
                    Strategy::RawPattern(r#""addressLine"\s*:\s*"([^"]+)""#),
                    Strategy::Selector(
                        r#".ui-vip-location__subtitle, .ui-pdp-media__title, .breadcrumb, [data-testid="address"]"#,
                    ),
                ],
                surface: vec![
                    Strategy::JsonLd(JsonLdKey::FloorSize),
                    Strategy::RawPattern(r#""Superficie total"\s*[:,]\s*"?(\d+\s?m²)"#),
                    Strategy::Labeled(r"(?i)superficie"),
                    Strategy::TextNode(SURFACE_TEXT),
                ],
                rooms: vec![
                    Strategy::JsonLd(JsonLdKey::NumberOfRooms),
                    Strategy::RawPattern(r#""Ambientes"\s*[:,]\s*"?(\d+)"#),
                    Strategy::Labeled(r"(?i)ambientes"),
                    Strategy::TextNode(ROOMS_TEXT),
                ],
            },
        };

        Self { config }
    }
}

impl Default for MercadoLibreAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for MercadoLibreAdapter {
    fn config(&self) -> &SiteConfig {
        &self.config
    }
}
