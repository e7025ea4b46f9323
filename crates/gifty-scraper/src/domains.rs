//! Merchant URL predicates, affiliate-tag injection, and hostname→country
//! mapping.
//!
//! All predicates answer `false` for unparseable URLs; nothing here touches
//! the network.

use gifty_core::Merchant;
use url::Url;

fn host_of(input_url: &str) -> Option<String> {
    let url = Url::parse(input_url).ok()?;
    url.host_str().map(str::to_lowercase)
}

/// Matches any `amazon.<tld>` storefront host (with or without subdomains).
#[must_use]
pub fn is_amazon_url(input_url: &str) -> bool {
    host_of(input_url).is_some_and(|host| host_has_brand_label(&host, "amazon"))
}

/// Matches `bol.com` and the `s-bol.com` short-link domain.
#[must_use]
pub fn is_bol_url(input_url: &str) -> bool {
    host_of(input_url)
        .is_some_and(|host| host_matches_suffix(&host, "bol.com") || host_matches_suffix(&host, "s-bol.com"))
}

/// Matches any `zalando.<tld>` host and the `zln.do` short-link domain.
#[must_use]
pub fn is_zalando_url(input_url: &str) -> bool {
    host_of(input_url).is_some_and(|host| {
        host_has_brand_label(&host, "zalando") || host_matches_suffix(&host, "zln.do")
    })
}

/// True when `brand` appears as a non-final hostname label, i.e. the host
/// is `brand.<tld>` or `<sub>.brand.<tld>`, but not `<sub>.brand` alone.
fn host_has_brand_label(host: &str, brand: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    labels.len() >= 2 && labels[..labels.len() - 1].contains(&brand)
}

/// Matches `etsy.com` hosts.
#[must_use]
pub fn is_etsy_url(input_url: &str) -> bool {
    host_of(input_url).is_some_and(|host| host_matches_suffix(&host, "etsy.com"))
}

/// True when `host` equals `suffix` or ends with `.suffix`.
fn host_matches_suffix(host: &str, suffix: &str) -> bool {
    host == suffix
        || host
            .strip_suffix(suffix)
            .is_some_and(|rest| rest.ends_with('.'))
}

/// Returns the predicate result for the given merchant.
#[must_use]
pub fn matches_merchant(merchant: Merchant, input_url: &str) -> bool {
    match merchant {
        Merchant::Amazon => is_amazon_url(input_url),
        Merchant::Bolcom => is_bol_url(input_url),
        Merchant::Zalando => is_zalando_url(input_url),
        Merchant::Etsy => is_etsy_url(input_url),
    }
}

/// Detects which supported merchant (if any) a URL belongs to.
#[must_use]
pub fn detect_merchant(input_url: &str) -> Option<Merchant> {
    Merchant::ALL
        .into_iter()
        .find(|&merchant| matches_merchant(merchant, input_url))
}

/// Sets (or overwrites) the `tag` query parameter on Amazon product links.
///
/// Non-Amazon and unparseable URLs are returned unchanged; every other query
/// parameter is preserved.
#[must_use]
pub fn add_amazon_affiliate_tag(input_url: &str, tag: &str) -> String {
    if !is_amazon_url(input_url) {
        return input_url.to_string();
    }
    let Ok(mut url) = Url::parse(input_url) else {
        return input_url.to_string();
    };

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "tag")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut().clear();
    for (key, value) in &retained {
        url.query_pairs_mut().append_pair(key, value);
    }
    url.query_pairs_mut().append_pair("tag", tag);

    url.to_string()
}

/// Maps known merchant hostnames to a country code; unknown hosts return
/// the caller-supplied fallback.
#[must_use]
pub fn extract_country_from_url<'a>(input_url: &str, fallback: &'a str) -> &'a str {
    let Some(host) = host_of(input_url) else {
        return fallback;
    };

    if host_matches_suffix(&host, "bol.com") {
        return "BE";
    }
    if host_matches_suffix(&host, "etsy.com") {
        return "US";
    }

    const ZALANDO_TLDS: [(&str, &str); 9] = [
        ("zalando.de", "DE"),
        ("zalando.nl", "NL"),
        ("zalando.fr", "FR"),
        ("zalando.it", "IT"),
        ("zalando.es", "ES"),
        ("zalando.co.uk", "UK"),
        ("zalando.pl", "PL"),
        ("zalando.se", "SE"),
        ("zalando.be", "BE"),
    ];
    for (suffix, country) in ZALANDO_TLDS {
        if host_matches_suffix(&host, suffix) {
            return country;
        }
    }

    fallback
}

/// Maps an `amazon.<tld>` hostname to its marketplace country, for
/// diagnostics. Unknown hosts return `None`.
#[must_use]
pub fn amazon_country(input_url: &str) -> Option<&'static str> {
    const AMAZON_TLDS: [(&str, &str); 19] = [
        ("amazon.com.au", "AU"),
        ("amazon.com.br", "BR"),
        ("amazon.com.mx", "MX"),
        ("amazon.com.tr", "TR"),
        ("amazon.co.uk", "UK"),
        ("amazon.co.jp", "JP"),
        ("amazon.com", "US"),
        ("amazon.de", "DE"),
        ("amazon.fr", "FR"),
        ("amazon.ca", "CA"),
        ("amazon.it", "IT"),
        ("amazon.es", "ES"),
        ("amazon.nl", "NL"),
        ("amazon.se", "SE"),
        ("amazon.pl", "PL"),
        ("amazon.ae", "AE"),
        ("amazon.sa", "SA"),
        ("amazon.sg", "SG"),
        ("amazon.in", "IN"),
    ];

    let host = host_of(input_url)?;
    AMAZON_TLDS
        .into_iter()
        .find(|(suffix, _)| host_matches_suffix(&host, suffix))
        .map(|(_, country)| country)
}
