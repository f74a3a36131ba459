//! Argenprop specific adapter

use crate::models::Site;
use crate::scrapers::extract::{
    EXPENSES_TEXT, JsonLdKey, LinkStrategy, PRICE_TEXT, ROOMS_TEXT, SURFACE_TEXT, Strategy,
};
use crate::traits::{FieldStrategies, SiteAdapter, SiteConfig};

/// Path fragments of property detail pages
const PROPERTY_MARKERS: &[&str] = &["/propiedad-", "/departamento-", "/casa-", "/ph-", "/local-"];

/// Adapter for argenprop.com
pub struct ArgenpropAdapter {
    config: SiteConfig,
}

impl ArgenpropAdapter {
    pub fn new() -> Self {
        let config = SiteConfig {
            site: Site::Argenprop,
            base_url: "https://www.argenprop.com".to_string(),
            link_strategies: vec![
                LinkStrategy::Attribute {
                    selector: "a.card__title-link, a.property-title, a.go-to-posting, div.listing__items div.listing__item a",
                    attr: "href",
                    markers: PROPERTY_MARKERS,
                },
                LinkStrategy::Attribute {
                    selector: "a[href]",
                    attr: "href",
                    markers: PROPERTY_MARKERS,
                },
            ],
            fields: FieldStrategies {
                price: vec![
                    Strategy::JsonLd(JsonLdKey::OfferPrice),
                    Strategy::Selector(
                        r#".listing__price, .titlebar__price, .price, .property-price, [data-qa="price"]"#,
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
                        r#".listing__location, .titlebar__address, .location, .property-location, [data-qa="location"]"#,
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

impl Default for ArgenpropAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for ArgenpropAdapter {
    fn config(&self) -> &SiteConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdLink;

    #[test]
    fn test_card_links() {
        let html = r#"
            <div class="listing__items">
                <div class="listing__item">
                    <a href="/departamento-en-alquiler-en-las-canitas-3-ambientes--11177163">Las Cañitas</a>
                </div>
                <div class="listing__item">
                    <a href="/ph-en-alquiler-en-villa-crespo-2-ambientes--12000001?from=list">Villa Crespo</a>
                </div>
            </div>
            <a href="/departamento-en-alquiler-en-nunez--13000000">Not a card</a>
        "#;

        let links = ArgenpropAdapter::new().extract_ad_links(html);

        assert_eq!(
            links,
            vec![
                AdLink::new(
                    "https://www.argenprop.com/departamento-en-alquiler-en-las-canitas-3-ambientes--11177163"
                ),
                AdLink::new(
                    "https://www.argenprop.com/ph-en-alquiler-en-villa-crespo-2-ambientes--12000001"
                ),
            ]
        );
    }

    #[test]
    fn test_permissive_fallback_filters_markers() {
        let html = r#"
            <a href="/contacto">Contacto</a>
            <a href="https://www.argenprop.com/casa-en-venta-en-olivos--9000001">Olivos</a>
            <a href="/casa-en-venta-en-olivos--9000001">Olivos again</a>
        "#;

        let links = ArgenpropAdapter::new().extract_ad_links(html);

        assert_eq!(
            links,
            vec![AdLink::new(
                "https://www.argenprop.com/casa-en-venta-en-olivos--9000001"
            )]
        );
    }

    #[test]
    fn test_details_from_json_ld() {
        let html = r#"
            <script type="application/ld+json">
            [{"@type": "BreadcrumbList"},
             {"@type": "Apartment",
              "offers": [{"price": "350000", "priceCurrency": "ARS"}],
              "address": {"streetAddress": "Las Cañitas"},
              "floorSize": {"value": 62, "unitCode": "MTK"},
              "numberOfRooms": 3,
              "additionalProperty": [{"name": "Expensas", "value": "45000"}]}]
            </script>
        "#;

        let record = ArgenpropAdapter::new().extract_ad_details("u", html);

        assert_eq!(record.price.as_deref(), Some("350000"));
        assert_eq!(record.neighbourhood.as_deref(), Some("Las Cañitas"));
        assert_eq!(record.surface.as_deref(), Some("62 m²"));
        assert_eq!(record.rooms.as_deref(), Some("3"));
        assert_eq!(record.expenses.as_deref(), Some("45000"));
    }

    #[test]
    fn test_fields_degrade_independently() {
        let html = r#"<p class="titlebar__address">Núñez, Capital Federal</p>"#;

        let record = ArgenpropAdapter::new().extract_ad_details("u", html);

        assert_eq!(record.neighbourhood.as_deref(), Some("Núñez, Capital Federal"));
        assert_eq!(record.price, None);
        assert_eq!(record.surface, None);
        assert_eq!(record.rooms, None);
        assert_eq!(record.expenses, None);
    }
}
