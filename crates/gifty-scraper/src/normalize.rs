//! Shared field normalizers used by every merchant extractor.
//!
//! Unparseable input never produces an error here: each routine degrades to
//! `None` (or passes raw text through) so a single bad field cannot abort
//! an extraction.

use regex::Regex;

/// A bare amount: digits with at most one decimal separator, comma or dot.
fn plain_amount_regex() -> Regex {
    Regex::new(r"^\d+(?:[.,]\d+)?$").expect("valid regex")
}

/// Normalizes a raw price string into the display form stored on products.
///
/// Purely-numeric input is reformatted with a dot decimal and a currency
/// prefix: `"€ "` when the raw text carried a euro sign or the resolved
/// currency code is EUR, else the literal currency code, else nothing.
/// Anything that is not a bare amount (symbols, words, grouped thousands)
/// passes through unchanged, which also makes the function idempotent on
/// its own output.
#[must_use]
pub fn format_price(raw: &str, currency: Option<&str>) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !plain_amount_regex().is_match(trimmed) {
        return trimmed.to_string();
    }

    let amount = trimmed.replace(',', ".");
    let currency = currency.map(str::trim).filter(|code| !code.is_empty());
    let euro = raw.contains('€') || currency.is_some_and(|code| code.eq_ignore_ascii_case("EUR"));

    if euro {
        format!("€ {amount}")
    } else if let Some(code) = currency {
        format!("{code} {amount}")
    } else {
        amount
    }
}

/// Parses a star rating out of free text like `"4.2 out of 5 stars"` or the
/// French `"4,2 sur 5"`. Values above 5 are discarded, never clamped.
#[must_use]
pub fn parse_rating_text(text: &str) -> Option<f64> {
    let pattern =
        Regex::new(r"([0-9]+(?:[.,][0-9]+)?)\s+(?:out of|sur)\s+5").expect("valid regex");
    let captured = pattern.captures(text)?;
    parse_rating_number(&captured[1])
}

/// Parses a bare numeric rating value (JSON-LD `ratingValue` or an
/// `itemprop` content attribute). Values above 5 are discarded.
#[must_use]
pub fn parse_rating_value(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if !plain_amount_regex().is_match(trimmed) {
        return None;
    }
    parse_rating_number(trimmed)
}

fn parse_rating_number(number: &str) -> Option<f64> {
    let rating = number.replace(',', ".").parse::<f64>().ok()?;
    (rating <= 5.0).then_some(rating)
}

/// Parses a review count out of visible page text.
///
/// A grouped number (`"1,860"`, `"1.860"`, `"1 860"`) wins outright. When
/// only a bare digit run is present, an even-length run whose first half
/// repeated equals the whole is collapsed: hidden + visible duplicate text
/// nodes render counts like `"18601860"`. The collapse is a heuristic and
/// is knowingly lossy for genuinely self-repeating counts.
#[must_use]
pub fn parse_review_count_text(text: &str) -> Option<u64> {
    // \s is Unicode-aware and covers the non-breaking spaces merchants use
    // as thousands separators.
    let grouped = Regex::new(r"[0-9]{1,3}(?:[.,\s][0-9]{3})+").expect("valid regex");
    if let Some(matched) = grouped.find(text) {
        return parse_digits(matched.as_str());
    }

    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    if digits.len() % 2 == 0 {
        let (half, rest) = digits.split_at(digits.len() / 2);
        if half == rest {
            return half.parse().ok();
        }
    }
    digits.parse().ok()
}

/// Parses a review count out of a structured value (meta `content`
/// attribute or JSON-LD `reviewCount`): strips non-digits, no doubling
/// collapse. The duplication artifact only appears in visible text.
#[must_use]
pub fn parse_review_count_value(value: &str) -> Option<u64> {
    parse_digits(value)
}

fn parse_digits(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Resolves a scraped image URL to an absolute one: protocol-relative
/// `//host/path` becomes `https://host/path`, everything else is kept.
#[must_use]
pub fn absolute_image_url(image_url: &str) -> String {
    if let Some(rest) = image_url.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        image_url.to_string()
    }
}
