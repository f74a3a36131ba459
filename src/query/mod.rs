//! Human-readable summaries of search URLs, used in notifications when no
//! ad details are available.

use regex::{Captures, Regex};
use url::Url;

use crate::models::{SearchSummary, Site};

/// Decompose a search URL into zone, price range and minimum surface.
///
/// Each field is independently optional; unrecognized URLs produce an
/// empty summary.
pub fn describe(search_url: &str) -> SearchSummary {
    let Ok(url) = Url::parse(search_url.trim()) else {
        return SearchSummary::default();
    };
    let Some(site) = url.host_str().and_then(Site::for_host) else {
        return SearchSummary::default();
    };

    match site {
        Site::Zonaprop => describe_zonaprop(&url),
        Site::Argenprop => describe_argenprop(&url),
        Site::MercadoLibre => describe_mercadolibre(&url),
        Site::Facebook => describe_facebook(&url),
    }
}

// /departamentos-alquiler-capital-federal-mas-50-m2-35000-80000-pesos-orden-antiguedad-ascendente.html
fn describe_zonaprop(url: &Url) -> SearchSummary {
    let path = url.path().to_lowercase();

    SearchSummary {
        zone: captures(r"(?:alquiler|venta)-([a-z\-]+)-mas", &path)
            .map(|c| title_case(&c[1].replace('-', " "))),
        price_range: captures(r"(\d+)-(\d+)-pesos", &path).map(|c| price_range(&c)),
        min_surface: captures(r"mas-(\d+)-m2", &path).map(|c| c[1].to_string()),
    }
}

// /casas-o-departamentos/alquiler/belgrano-o-colegiales-o-palermo/pesos-300000-1700000
fn describe_argenprop(url: &Url) -> SearchSummary {
    let path = url.path().to_lowercase();

    SearchSummary {
        zone: captures(r"(?:alquiler|venta)/([^/]+)", &path)
            .map(|c| title_case(&c[1].replace("-o-", ", ").replace('-', " "))),
        price_range: captures(r"pesos-(\d+)-(\d+)", &path).map(|c| price_range(&c)),
        min_surface: None,
    }
}

// /departamentos/alquiler/capital-federal/_PriceRange_45000ARS-80000ARS_TOTAL*AREA_50-*#applied_filter_id%3D...
fn describe_mercadolibre(url: &Url) -> SearchSummary {
    let raw = format!(
        "{}?{}#{}",
        url.path(),
        url.query().unwrap_or_default(),
        url.fragment().unwrap_or_default()
    );
    let decoded = urlencoding::decode(&raw).map_or(raw.clone(), |text| text.into_owned());
    let path = url.path().to_lowercase();

    SearchSummary {
        zone: captures(r"/([^/_]+)/_", &path).map(|c| title_case(&c[1].replace('-', " "))),
        price_range: captures(r"(\d+)ARS-(\d+)ARS", &decoded).map(|c| price_range(&c)),
        min_surface: captures(r"AREA_(\d+)-", &decoded).map(|c| c[1].to_string()),
    }
}

// /marketplace/buenosaires/propertyrentals?minPrice=30000&maxPrice=80000&minAreaSize=50
fn describe_facebook(url: &Url) -> SearchSummary {
    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    };

    let price_range = match (param("minPrice"), param("maxPrice")) {
        (Some(min), Some(max)) => Some(format!("${min} - ${max}")),
        _ => None,
    };

    SearchSummary {
        zone: captures(r"/marketplace/([^/]+)/", url.path()).map(|c| title_case(&c[1])),
        price_range,
        min_surface: param("minAreaSize"),
    }
}

fn captures<'h>(pattern: &str, text: &'h str) -> Option<Captures<'h>> {
    Regex::new(pattern).ok()?.captures(text)
}

fn price_range(captures: &Captures<'_>) -> String {
    format!("${} - ${}", &captures[1], &captures[2])
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
