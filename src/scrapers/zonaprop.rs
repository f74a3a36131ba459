//! Zonaprop specific adapter

use crate::models::Site;
use crate::scrapers::extract::{
    EXPENSES_TEXT, JsonLdKey, LinkStrategy, PRICE_TEXT, ROOMS_TEXT, SURFACE_TEXT, Strategy,
};
use crate::traits::{FieldStrategies, SiteAdapter, SiteConfig};

const POSTING_MARKERS: &[&str] = &["/propiedades/"];

/// Adapter for zonaprop.com.ar
pub struct ZonapropAdapter {
    config: SiteConfig,
}

impl ZonapropAdapter {
    pub fn new() -> Self {
        let config = SiteConfig {
            site: Site::Zonaprop,
            base_url: "https://www.zonaprop.com.ar".to_string(),
            link_strategies: vec![
                LinkStrategy::Attribute {
                    selector: ".posting-card a[href], .aviso-row a[href], a.go-to-posting",
                    attr: "href",
                    markers: POSTING_MARKERS,
                },
                // Cards rendered client-side keep the target in a data attribute
                LinkStrategy::Attribute {
                    selector: "[data-to-posting]",
                    attr: "data-to-posting",
                    markers: POSTING_MARKERS,
                },
                LinkStrategy::Attribute {
                    selector: "a[href]",
                    attr: "href",
                    markers: POSTING_MARKERS,
                },
                LinkStrategy::RawPattern(r"(/propiedades/[A-Za-z0-9_\-]+\.html)"),
            ],
            fields: FieldStrategies {
                price: vec![
                    Strategy::JsonLd(JsonLdKey::OfferPrice),
                    Strategy::Selector(
                        r#".price-value, .price__fraction, .posting-price, .price, [data-qa="POSTING_CARD_PRICE"]"#,
                    ),
                    Strategy::TextNode(PRICE_TEXT),
                ],
                expenses: vec![
                    Strategy::JsonLd(JsonLdKey::Expenses),
                    Strategy::TextNode(EXPENSES_TEXT),
                ],
                neighbourhood: vec![
                    Strategy::JsonLd(JsonLdKey::StreetAddress),
                    Strategy::Selector(
                        r#".title-location, .posting-location, .location, [data-qa="POSTING_CARD_LOCATION"]"#,
                    ),
                ],
                surface: vec![
                    Strategy::JsonLd(JsonLdKey::FloorSize),
                    Strategy::TextNode(SURFACE_TEXT),
                ],
                rooms: vec![
                    Strategy::JsonLd(JsonLdKey::NumberOfRooms),
                    Strategy::TextNode(ROOMS_TEXT),
                ],
            },
        };

        Self { config }
    }
}

impl Default for ZonapropAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for ZonapropAdapter {
    fn config(&self) -> &SiteConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdLink;

    #[test]
    fn test_relative_links_deduplicated() {
        let html = r#"
            <div class="posting-card"><a href="/propiedades/a-111.html">A</a></div>
            <div class="posting-card"><a href="/propiedades/b-222.html">B</a></div>
            <div class="posting-card"><a href="/propiedades/a-111.html">A again</a></div>
        "#;

        let links = ZonapropAdapter::new().extract_ad_links(html);

        assert_eq!(
            links,
            vec![
                AdLink::new("https://www.zonaprop.com.ar/propiedades/a-111.html"),
                AdLink::new("https://www.zonaprop.com.ar/propiedades/b-222.html"),
            ]
        );
    }

    #[test]
    fn test_tracking_parameters_stripped() {
        let html = r#"
            <div class="posting-card">
                <a href="https://www.zonaprop.com.ar/propiedades/c-333.html?utm_source=feed#gallery">C</a>
            </div>
        "#;

        let links = ZonapropAdapter::new().extract_ad_links(html);

        assert_eq!(
            links,
            vec![AdLink::new(
                "https://www.zonaprop.com.ar/propiedades/c-333.html"
            )]
        );
    }

    #[test]
    fn test_data_attribute_fallback() {
        let html = r#"
            <div data-to-posting="/propiedades/depto-palermo-49000001.html"></div>
            <a href="/ayuda">Ayuda</a>
        "#;

        let links = ZonapropAdapter::new().extract_ad_links(html);

        assert_eq!(
            links,
            vec![AdLink::new(
                "https://www.zonaprop.com.ar/propiedades/depto-palermo-49000001.html"
            )]
        );
    }

    #[test]
    fn test_script_fallback() {
        let html = r#"<script>window.__PRELOADED_STATE__ = {"url":"/propiedades/ph-boedo-48706499.html"};</script>"#;

        let links = ZonapropAdapter::new().extract_ad_links(html);

        assert_eq!(
            links,
            vec![AdLink::new(
                "https://www.zonaprop.com.ar/propiedades/ph-boedo-48706499.html"
            )]
        );
    }

    #[test]
    fn test_empty_and_garbage_pages() {
        let adapter = ZonapropAdapter::new();

        assert!(adapter.extract_ad_links("").is_empty());
        assert!(adapter.extract_ad_links("<<<not html at all").is_empty());
    }

    #[test]
    fn test_structured_price_without_surface() {
        let url = "https://www.zonaprop.com.ar/propiedades/a-111.html";
        let html = r#"
            <script type="application/ld+json">{"offers": {"price": 55000}}</script>
            <h1>Departamento en alquiler</h1>
        "#;

        let record = ZonapropAdapter::new().extract_ad_details(url, html);

        assert_eq!(record.url, url);
        assert_eq!(record.price.as_deref(), Some("55000"));
        assert_eq!(record.surface, None);
        assert_eq!(record.rooms, None);
    }

    #[test]
    fn test_selector_and_text_fallbacks() {
        let html = r#"
            <div class="price-value">$ 450.000</div>
            <h2 class="title-location">Av. Cabildo 2000, Belgrano</h2>
            <ul>
                <li>65 m² tot.</li>
                <li>3 amb.</li>
                <li>Expensas $ 80.000</li>
            </ul>
        "#;

        let record = ZonapropAdapter::new().extract_ad_details("u", html);

        assert_eq!(record.price.as_deref(), Some("$ 450.000"));
        assert_eq!(
            record.neighbourhood.as_deref(),
            Some("Av. Cabildo 2000, Belgrano")
        );
        assert_eq!(record.surface.as_deref(), Some("65 m²"));
        assert_eq!(record.rooms.as_deref(), Some("3"));
        assert_eq!(record.expenses.as_deref(), Some("80.000"));
    }
}
