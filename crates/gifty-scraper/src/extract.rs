//! The merchant-generic product extractor.
//!
//! One pipeline for all merchants: JSON-LD scan, HTML baseline from the
//! merchant's profile, field-level JSON-LD override, then normalization.
//! Unparseable fields degrade to absent/empty; extraction itself cannot
//! fail.

use gifty_core::{GiftProduct, Merchant};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::domains::{add_amazon_affiliate_tag, extract_country_from_url};
use crate::jsonld;
use crate::merchants::{
    profile, CountRule, CountryRule, DescriptionRule, LinkRule, PriceSweep, RatingRule, Source,
};
use crate::normalize::{
    absolute_image_url, format_price, parse_rating_text, parse_rating_value,
    parse_review_count_text, parse_review_count_value,
};

/// Extracts a normalized product record from a fetched merchant page.
///
/// `request_url` must already have passed the merchant's URL predicate;
/// it becomes the product link (Amazon substitutes the canonical link and
/// injects `affiliate_tag`).
#[must_use]
pub fn extract_product(
    html: &str,
    request_url: &str,
    merchant: Merchant,
    affiliate_tag: &str,
) -> GiftProduct {
    let profile = profile(merchant);
    let document = Html::parse_document(html);
    let ld = jsonld::first_product(&document);

    let mut name = read_first(&document, profile.name_sources).unwrap_or_default();
    let mut description = read_description(&document, &profile.description);
    let mut image = read_first(&document, profile.image_sources).unwrap_or_default();
    let mut price_raw = read_first(&document, profile.price_sources).unwrap_or_default();
    let mut currency = read_first(&document, profile.currency_sources);

    // JSON-LD wins field by field, only where the block carries the field.
    if let Some(ld) = &ld {
        if let Some(value) = &ld.name {
            name.clone_from(value);
        }
        if let Some(value) = &ld.description {
            description.clone_from(value);
        }
        if let Some(value) = &ld.image {
            image.clone_from(value);
        }
        if let Some(value) = &ld.price {
            price_raw.clone_from(value);
        }
        if let Some(value) = &ld.price_currency {
            currency = Some(value.clone());
        }
    }

    if price_raw.is_empty() {
        if let Some(sweep) = &profile.price_fallback {
            price_raw = sweep_price(&document, sweep).unwrap_or_default();
        }
    }

    let html_rating = match &profile.rating {
        RatingRule::None => None,
        RatingRule::OutOfFive(sources) => {
            read_first(&document, sources).and_then(|text| parse_rating_text(&text))
        }
        RatingRule::Numeric(sources) => {
            read_first(&document, sources).and_then(|value| parse_rating_value(&value))
        }
    };
    let rating = match ld.as_ref().and_then(|ld| ld.rating_value.as_deref()) {
        Some(value) => parse_rating_value(value),
        None => html_rating,
    };

    let html_count = match &profile.count {
        CountRule::None => None,
        CountRule::VisibleText(sources) => {
            read_first(&document, sources).and_then(|text| parse_review_count_text(&text))
        }
        CountRule::Numeric(sources) => {
            read_first(&document, sources).and_then(|value| parse_review_count_value(&value))
        }
    };
    let ratings_count = match ld.as_ref().and_then(|ld| ld.review_count.as_deref()) {
        Some(value) => parse_review_count_value(value),
        None => html_count,
    };

    let product_link = match profile.link {
        LinkRule::RequestUrl => request_url.to_string(),
        LinkRule::CanonicalAffiliate => {
            let canonical = read_first(
                &document,
                &[Source::Attr(r#"link[rel="canonical"]"#, "href")],
            )
            .unwrap_or_else(|| request_url.to_string());
            add_amazon_affiliate_tag(&canonical, affiliate_tag)
        }
    };

    let country = match profile.country {
        CountryRule::Fixed(code) => code.to_string(),
        CountryRule::HostDerived { allowed, fallback } => {
            let derived = extract_country_from_url(request_url, fallback);
            if allowed.contains(&derived) {
                derived.to_string()
            } else {
                fallback.to_string()
            }
        }
    };

    GiftProduct {
        name,
        price: format_price(&price_raw, currency.as_deref()),
        image_url: absolute_image_url(&image),
        product_link,
        description,
        rating,
        ratings_count,
        country,
    }
}

/// First non-empty value among the profile's sources.
fn read_first(document: &Html, sources: &[Source]) -> Option<String> {
    sources
        .iter()
        .find_map(|source| read_source(document, source))
}

fn read_source(document: &Html, source: &Source) -> Option<String> {
    let value = match source {
        Source::Text(selector) => element(document, selector).map(|el| clean_text(&collect_text(el))),
        Source::Attr(selector, attr) => element(document, selector)
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string()),
    };
    value.filter(|v| !v.is_empty())
}

fn element<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).expect("valid selector");
    document.select(&selector).next()
}

fn collect_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Collapses runs of whitespace; DOM text nodes arrive heavily indented.
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn read_description(document: &Html, rule: &DescriptionRule) -> String {
    match rule {
        DescriptionRule::Sources(sources) => read_first(document, sources).unwrap_or_default(),
        DescriptionRule::BulletList {
            selector,
            separator,
        } => {
            let selector = Selector::parse(selector).expect("valid selector");
            let bullets: Vec<String> = document
                .select(&selector)
                .map(|el| clean_text(&collect_text(el)))
                .filter(|text| !text.is_empty())
                .collect();
            bullets.join(separator)
        }
    }
}

/// Last-resort price sweep: extra meta sources first, then visible price
/// texts with euro-bearing candidates preferred.
fn sweep_price(document: &Html, sweep: &PriceSweep) -> Option<String> {
    if let Some(value) = read_first(document, sweep.meta) {
        return Some(value);
    }

    let euro_amount = Regex::new(r"€\s*\d").expect("valid regex");
    let mut candidates = Vec::new();
    for selector in sweep.text_selectors {
        let selector = Selector::parse(selector).expect("valid selector");
        for el in document.select(&selector) {
            let text = clean_text(&collect_text(el));
            if !text.is_empty() {
                candidates.push(text);
            }
        }
    }

    candidates
        .iter()
        .find(|text| euro_amount.is_match(text))
        .or_else(|| candidates.first())
        .cloned()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
