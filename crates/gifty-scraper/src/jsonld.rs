//! schema.org JSON-LD Product extraction.

use scraper::{Html, Selector};
use serde_json::Value;

/// Fields lifted from the first JSON-LD Product block on a page. Each field
/// overrides its HTML-derived counterpart only when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct LdProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    /// First entry when the block carries an image array.
    pub image: Option<String>,
    pub price: Option<String>,
    pub price_currency: Option<String>,
    pub rating_value: Option<String>,
    pub review_count: Option<String>,
}

/// Scans every `<script type="application/ld+json">` block and returns the
/// first object whose `@type` is or includes `"Product"`.
///
/// Individual blocks that fail to parse are skipped; top-level arrays and
/// `@graph` containers are expanded.
pub(crate) fn first_product(document: &Html) -> Option<LdProduct> {
    let selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector");

    for script in document.select(&selector) {
        let text = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(text.trim()) else {
            continue;
        };

        let mut candidates: Vec<Value> = match value {
            Value::Array(items) => items,
            other => vec![other],
        };

        // Some sites wrap structured data in a top-level {"@graph": [...]}.
        let mut expanded = Vec::new();
        for item in &candidates {
            if let Some(graph) = item.get("@graph").and_then(Value::as_array) {
                expanded.extend(graph.iter().cloned());
            }
        }
        candidates.extend(expanded);

        for item in candidates {
            if is_product(&item) {
                return Some(product_from_value(&item));
            }
        }
    }

    None
}

/// `@type` may be a plain string or an array of strings.
fn is_product(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(s)) => s == "Product",
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s == "Product"),
        _ => false,
    }
}

fn product_from_value(item: &Value) -> LdProduct {
    let offers = item.get("offers").map(|offers| match offers {
        // Multi-offer listings: the first offer is the storefront default.
        Value::Array(list) => list.first().cloned().unwrap_or(Value::Null),
        single => single.clone(),
    });
    let aggregate = item.get("aggregateRating");

    LdProduct {
        name: string_field(item.get("name")),
        description: string_field(item.get("description")),
        image: image_field(item.get("image")),
        price: offers
            .as_ref()
            .and_then(|offer| scalar_field(offer.get("price"))),
        price_currency: offers
            .as_ref()
            .and_then(|offer| scalar_field(offer.get("priceCurrency"))),
        rating_value: aggregate.and_then(|ar| scalar_field(ar.get("ratingValue"))),
        review_count: aggregate.and_then(|ar| scalar_field(ar.get("reviewCount"))),
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `image` may be a single URL or an array of URLs.
fn image_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .find_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Numbers and stringified numbers both occur in the wild.
fn scalar_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
