//! Facebook Marketplace specific adapter
//!
//! Marketplace renders most of its feed client-side, so ad identifiers are
//! usually only present inside inline JSON. Every link form is reduced to
//! the numeric item id and rebuilt as a canonical item URL.

use regex::Regex;

use crate::models::Site;
use crate::scrapers::extract::{
    EXPENSES_TEXT, JsonLdKey, LinkStrategy, ROOMS_TEXT, SURFACE_TEXT, Strategy,
};
use crate::traits::{FieldStrategies, SiteAdapter, SiteConfig};

const ITEM_MARKERS: &[&str] = &["/marketplace/item/"];

/// Adapter for facebook.com/marketplace
pub struct FacebookAdapter {
    config: SiteConfig,
}

impl FacebookAdapter {
    pub fn new() -> Self {
        let config = SiteConfig {
            site: Site::Facebook,
            base_url: "https://www.facebook.com".to_string(),
            link_strategies: vec![
                LinkStrategy::Attribute {
                    selector: r#"[data-testid="marketplace-item"] a[href]"#,
                    attr: "href",
                    markers: ITEM_MARKERS,
                },
                LinkStrategy::Attribute {
                    selector: "a[href]",
                    attr: "href",
                    markers: ITEM_MARKERS,
                },
                LinkStrategy::RawPattern(r#""GroupCommerceProductItem","id":"(\d+)""#),
                LinkStrategy::RawPattern(r"\\?/marketplace\\?/item\\?/(\d+)"),
            ],
            fields: FieldStrategies {
                price: vec![
                    Strategy::JsonLd(JsonLdKey::OfferPrice),
                    Strategy::RawPattern(r#""formatted_price":\{"text":"([^"]+)""#),
                ],
                expenses: vec![Strategy::TextNode(EXPENSES_TEXT)],
                neighbourhood: vec![
                    Strategy::JsonLd(JsonLdKey::StreetAddress),
                    Strategy::RawPattern(r#""location_text":\{"text":"([^"]+)""#),
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

    fn item_id(href: &str) -> Option<String> {
        let trimmed = href.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Some(trimmed.to_string());
        }

        let pattern = Regex::new(r"/marketplace/item/(\d+)").ok()?;
        let captures = pattern.captures(trimmed)?;
        Some(captures.get(1)?.as_str().to_string())
    }
}

impl Default for FacebookAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for FacebookAdapter {
    fn config(&self) -> &SiteConfig {
        &self.config
    }

    fn normalize_link(&self, href: &str) -> Option<String> {
        let id = Self::item_id(href)?;
        Some(format!("{}/marketplace/item/{id}/", self.config.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdLink;

    #[test]
    fn test_anchor_forms_collapse_to_item_id() {
        let html = r#"
            <div data-testid="marketplace-item"><a href="/marketplace/item/433974314851567/?ref=search">A</a></div>
            <div data-testid="marketplace-item"><a href="https://www.facebook.com/marketplace/item/433974314851567">A again</a></div>
            <div data-testid="marketplace-item"><a href="/marketplace/item/500000000000001/">B</a></div>
        "#;

        let links = FacebookAdapter::new().extract_ad_links(html);

        assert_eq!(
            links,
            vec![
                AdLink::new("https://www.facebook.com/marketplace/item/433974314851567/"),
                AdLink::new("https://www.facebook.com/marketplace/item/500000000000001/"),
            ]
        );
    }

    #[test]
    fn test_inline_json_ids() {
        let html = r#"
            <script>{"__typename":"GroupCommerceProductItem","id":"111","primary_listing_photo":{}}
            {"__typename":"GroupCommerceProductItem","id":"222","primary_listing_photo":{}}</script>
        "#;

        let links = FacebookAdapter::new().extract_ad_links(html);

        assert_eq!(
            links,
            vec![
                AdLink::new("https://www.facebook.com/marketplace/item/111/"),
                AdLink::new("https://www.facebook.com/marketplace/item/222/"),
            ]
        );
    }

    #[test]
    fn test_non_item_links_ignored() {
        let html = r#"<a href="/marketplace/buenosaires/propertyrentals">Rentals</a>"#;

        assert!(FacebookAdapter::new().extract_ad_links(html).is_empty());
    }

    #[test]
    fn test_details_from_inline_json() {
        let html = r#"
            <script>{"formatted_price":{"text":"$80.000"},"location_text":{"text":"Palermo, Buenos Aires"}}</script>
            <span>2 ambientes</span>
        "#;

        let record = FacebookAdapter::new().extract_ad_details("u", html);

        assert_eq!(record.price.as_deref(), Some("$80.000"));
        assert_eq!(record.neighbourhood.as_deref(), Some("Palermo, Buenos Aires"));
        assert_eq!(record.rooms.as_deref(), Some("2"));
        assert_eq!(record.surface, None);
    }
}
