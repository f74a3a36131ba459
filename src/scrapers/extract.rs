//! Extraction strategies shared by every site adapter.
//!
//! A field is described by an ordered list of [`Strategy`] values, tried in
//! order until one yields a non-empty string. Strategies never fail: an
//! invalid selector or pattern, or markup that does not match, simply
//! yields `None` and the next strategy runs.

use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Surface with unit anywhere in a text node ("50 m²", "42,5 m2")
pub const SURFACE_TEXT: &str = r"(?i)\d+(?:[.,]\d+)?\s?m(?:²|2)";
/// Room count written as "3 amb." / "3 ambientes"
pub const ROOMS_TEXT: &str = r"(?i)(\d+)\s*amb";
/// Amount next to the word "expensas", on either side
pub const EXPENSES_TEXT: &str = r"(?i)expensas.*?\$\s?(\d[\d.]*)|\$\s?(\d[\d.]*).*?expensas";
/// A text node holding nothing but an amount
pub const PRICE_TEXT: &str = r"^\s*(?:USD|U\$S|\$)\s?\d[\d.,]*\s*$";

/// Keys read from schema.org JSON-LD blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLdKey {
    /// `offers.price` (first offer when `offers` is a list)
    OfferPrice,
    /// `address.streetAddress`
    StreetAddress,
    /// `numberOfRooms`
    NumberOfRooms,
    /// `floorSize.value`, rendered as `"<value> m²"`
    FloorSize,
    /// `value` of the first `additionalProperty` named like "expensa"
    Expenses,
}

impl JsonLdKey {
    fn read(self, object: &Value) -> Option<String> {
        match self {
            JsonLdKey::OfferPrice => {
                let offer = match object.get("offers")? {
                    Value::Array(offers) => offers.first()?,
                    offer => offer,
                };
                scalar(offer.get("price")?)
            }
            JsonLdKey::StreetAddress => scalar(object.get("address")?.get("streetAddress")?),
            JsonLdKey::NumberOfRooms => scalar(object.get("numberOfRooms")?),
            JsonLdKey::FloorSize => {
                let value = scalar(object.get("floorSize")?.get("value")?)?;
                Some(format!("{value} m²"))
            }
            JsonLdKey::Expenses => object
                .get("additionalProperty")?
                .as_array()?
                .iter()
                .filter(|property| {
                    property
                        .get("name")
                        .and_then(Value::as_str)
                        .is_some_and(|name| name.to_lowercase().contains("expensa"))
                })
                .find_map(|property| property.get("value").and_then(scalar)),
        }
    }
}

/// One way of extracting a detail field from an ad page
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Value from an embedded `application/ld+json` block
    JsonLd(JsonLdKey),
    /// Text of the first element matching a CSS selector list
    Selector(&'static str),
    /// Text of the first `td`/`dd` cell after a `th`/`dt`/`td` label matching the pattern
    Labeled(&'static str),
    /// Pattern searched over the raw page source, scripts included
    RawPattern(&'static str),
    /// Pattern searched over visible text nodes
    TextNode(&'static str),
}

/// One way of finding ad links on a search-results page
#[derive(Debug, Clone)]
pub enum LinkStrategy {
    /// An attribute of every element matching `selector`, kept when it
    /// contains one of `markers` (or always, when `markers` is empty)
    Attribute {
        selector: &'static str,
        attr: &'static str,
        markers: &'static [&'static str],
    },
    /// Every match of a pattern over the raw page source
    RawPattern(&'static str),
}

/// A parsed page, ready for strategy evaluation
pub struct Page<'a> {
    raw: &'a str,
    document: Html,
    json_ld: Vec<Value>,
}

impl<'a> Page<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let document = Html::parse_document(raw);
        let json_ld = collect_json_ld(&document);

        Self {
            raw,
            document,
            json_ld,
        }
    }

    /// Run a chain of strategies, returning the first non-empty value
    pub fn first(&self, chain: &[Strategy]) -> Option<String> {
        chain.iter().find_map(|strategy| self.extract(strategy))
    }

    pub fn extract(&self, strategy: &Strategy) -> Option<String> {
        match strategy {
            Strategy::JsonLd(key) => self.json_ld.iter().find_map(|object| key.read(object)),
            Strategy::Selector(css) => {
                let selector = Selector::parse(css).ok()?;
                self.document
                    .select(&selector)
                    .find_map(|element| non_empty(&element_text(element)))
            }
            Strategy::Labeled(label) => self.labeled_value(label),
            Strategy::RawPattern(pattern) => {
                let regex = Regex::new(pattern).ok()?;
                non_empty(capture_or_match(&regex.captures(self.raw)?))
            }
            Strategy::TextNode(pattern) => {
                let regex = Regex::new(pattern).ok()?;
                self.text_nodes().find_map(|text| {
                    let captures = regex.captures(text)?;
                    non_empty(capture_or_match(&captures))
                })
            }
        }
    }

    /// Raw link values found by a link strategy, in document order
    pub fn links(&self, strategy: &LinkStrategy) -> Vec<String> {
        match strategy {
            LinkStrategy::Attribute {
                selector,
                attr,
                markers,
            } => {
                let Ok(selector) = Selector::parse(selector) else {
                    return Vec::new();
                };
                self.document
                    .select(&selector)
                    .filter_map(|element| element.value().attr(attr))
                    .filter(|value| {
                        markers.is_empty() || markers.iter().any(|marker| value.contains(marker))
                    })
                    .map(str::to_string)
                    .collect()
            }
            LinkStrategy::RawPattern(pattern) => {
                let Ok(regex) = Regex::new(pattern) else {
                    return Vec::new();
                };
                regex
                    .captures_iter(self.raw)
                    .map(|captures| capture_or_match(&captures).to_string())
                    .collect()
            }
        }
    }

    fn labeled_value(&self, label: &str) -> Option<String> {
        let pattern = Regex::new(label).ok()?;
        let cells = Selector::parse("th, dt, td, dd").ok()?;

        let mut armed = false;
        for cell in self.document.select(&cells) {
            let name = cell.value().name();
            let text = element_text(cell);

            if armed && matches!(name, "td" | "dd") {
                if !text.is_empty() {
                    return Some(text);
                }
                // The label's own value cell is empty
                armed = false;
                continue;
            }
            if name != "dd" && pattern.is_match(&text) {
                armed = true;
            }
        }

        None
    }

    fn text_nodes(&self) -> impl Iterator<Item = &str> {
        self.document.root_element().descendants().filter_map(|node| {
            let text = node.value().as_text()?;
            if let Some(parent) = node.parent().and_then(|parent| parent.value().as_element())
                && matches!(parent.name(), "script" | "style" | "noscript" | "template")
            {
                return None;
            }
            Some(&**text)
        })
    }
}

fn collect_json_ld(document: &Html) -> Vec<Value> {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };

    let mut objects = Vec::new();
    for script in document.select(&selector) {
        let body = script.text().collect::<String>();
        if let Ok(value) = serde_json::from_str::<Value>(body.trim()) {
            flatten_json_ld(value, &mut objects);
        }
    }
    objects
}

fn flatten_json_ld(value: Value, objects: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_json_ld(item, objects);
            }
        }
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_json_ld(graph, objects);
            }
            objects.push(Value::Object(map));
        }
        _ => {}
    }
}

/// Strings and numbers as text; `QuantitativeValue` objects by their `value`
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_empty(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(_) => value.get("value").and_then(scalar),
        _ => None,
    }
}

/// First participating capture group, or the whole match for group-less patterns
fn capture_or_match<'h>(captures: &Captures<'h>) -> &'h str {
    captures
        .iter()
        .skip(1)
        .flatten()
        .next()
        .or_else(|| captures.get(0))
        .map_or("", |m| m.as_str())
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
