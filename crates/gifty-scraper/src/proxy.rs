//! Scrape-proxy provider selection and request building.
//!
//! A provider is chosen per fetch call from environment-style settings, in a
//! fixed priority order. Building the provider request is pure: no network
//! I/O happens here.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::ScrapeError;

/// Characters escaped when substituting the target URL into a template.
/// Mirrors `encodeURIComponent`: everything but alphanumerics and `-_.~`.
const TEMPLATE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Raw proxy configuration values, re-read from the environment on every
/// fetch call. The chain is never cached across calls.
#[derive(Debug, Clone, Default)]
pub struct ProxySettings {
    /// URL template with a `{URL}` placeholder, or a base URL that takes a
    /// `url` query parameter.
    pub direct_url_template: Option<String>,
    /// Optional key sent as `x-api-key` alongside the direct template.
    pub direct_api_key: Option<String>,
    pub scraperapi_key: Option<String>,
    pub zenrows_key: Option<String>,
    pub scrapingbee_key: Option<String>,
    pub crawlbase_token: Option<String>,
}

impl ProxySettings {
    /// Reads the provider settings from the process environment. Empty
    /// values count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        let read = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        Self {
            direct_url_template: read("GIFTY_SCRAPE_API_URL"),
            direct_api_key: read("GIFTY_SCRAPE_API_KEY"),
            scraperapi_key: read("GIFTY_SCRAPERAPI_KEY"),
            zenrows_key: read("GIFTY_ZENROWS_KEY"),
            scrapingbee_key: read("GIFTY_SCRAPINGBEE_KEY"),
            crawlbase_token: read("GIFTY_CRAWLBASE_TOKEN"),
        }
    }

    /// Returns the first fully-configured provider in priority order:
    /// direct template > ScraperAPI > ZenRows > ScrapingBee > Crawlbase.
    /// `None` means "fetch directly".
    #[must_use]
    pub fn select_provider(&self) -> Option<ProxyProvider> {
        if let Some(template) = &self.direct_url_template {
            return Some(ProxyProvider::DirectTemplate {
                template: template.clone(),
                api_key: self.direct_api_key.clone(),
            });
        }
        if let Some(key) = &self.scraperapi_key {
            return Some(ProxyProvider::ScraperApi {
                api_key: key.clone(),
            });
        }
        if let Some(key) = &self.zenrows_key {
            return Some(ProxyProvider::ZenRows {
                api_key: key.clone(),
            });
        }
        if let Some(key) = &self.scrapingbee_key {
            return Some(ProxyProvider::ScrapingBee {
                api_key: key.clone(),
            });
        }
        if let Some(token) = &self.crawlbase_token {
            return Some(ProxyProvider::Crawlbase {
                token: token.clone(),
            });
        }
        None
    }
}

/// One configured scrape-proxy backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyProvider {
    DirectTemplate {
        template: String,
        api_key: Option<String>,
    },
    ScraperApi { api_key: String },
    ZenRows { api_key: String },
    ScrapingBee { api_key: String },
    Crawlbase { token: String },
}

impl ProxyProvider {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            ProxyProvider::DirectTemplate { .. } => "direct-template",
            ProxyProvider::ScraperApi { .. } => "scraperapi",
            ProxyProvider::ZenRows { .. } => "zenrows",
            ProxyProvider::ScrapingBee { .. } => "scrapingbee",
            ProxyProvider::Crawlbase { .. } => "crawlbase",
        }
    }
}

/// A ready-to-send proxy request: the relay URL plus any extra headers.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
}

/// Country hint passed to the relay, derived from the target's TLD:
/// `.be` hosts scrape from Belgium, everything else from France.
#[must_use]
pub fn country_hint(target_url: &str) -> &'static str {
    let is_be = Url::parse(target_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .is_some_and(|host| host == "be" || host.ends_with(".be"));
    if is_be {
        "be"
    } else {
        "fr"
    }
}

/// Builds the provider-specific relay URL and headers for `target_url`.
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidProxyUrl`] when the provider's base URL or
/// template does not parse; nothing else can fail.
pub fn build_proxy_request(
    target_url: &str,
    provider: &ProxyProvider,
) -> Result<ProxyRequest, ScrapeError> {
    match provider {
        ProxyProvider::DirectTemplate { template, api_key } => {
            let encoded = utf8_percent_encode(target_url, TEMPLATE_ESCAPE).to_string();
            let url = if template.contains("{URL}") {
                template.replace("{URL}", &encoded)
            } else {
                let sep = if template.contains('?') { '&' } else { '?' };
                format!("{template}{sep}url={encoded}")
            };
            // Validate the final URL so a bad template fails here, not at
            // send time.
            Url::parse(&url).map_err(|e| ScrapeError::InvalidProxyUrl {
                provider: provider.name(),
                reason: e.to_string(),
            })?;
            let headers = api_key
                .as_ref()
                .map(|key| vec![("x-api-key", key.clone())])
                .unwrap_or_default();
            Ok(ProxyRequest { url, headers })
        }
        ProxyProvider::ScraperApi { api_key } => keyed_api_request(
            provider.name(),
            "https://api.scraperapi.com/",
            &[
                ("api_key", api_key),
                ("url", target_url),
                ("country_code", country_hint(target_url)),
            ],
        ),
        ProxyProvider::ZenRows { api_key } => keyed_api_request(
            provider.name(),
            "https://api.zenrows.com/v1/",
            &[
                ("apikey", api_key),
                ("url", target_url),
                ("proxy_country", country_hint(target_url)),
            ],
        ),
        ProxyProvider::ScrapingBee { api_key } => keyed_api_request(
            provider.name(),
            "https://app.scrapingbee.com/api/v1/",
            &[
                ("api_key", api_key),
                ("url", target_url),
                ("country_code", country_hint(target_url)),
            ],
        ),
        ProxyProvider::Crawlbase { token } => keyed_api_request(
            provider.name(),
            "https://api.crawlbase.com/",
            &[
                ("token", token),
                ("url", target_url),
                ("country", &country_hint(target_url).to_uppercase()),
            ],
        ),
    }
}

fn keyed_api_request(
    provider: &'static str,
    base: &str,
    params: &[(&str, &str)],
) -> Result<ProxyRequest, ScrapeError> {
    let mut url = Url::parse(base).map_err(|e| ScrapeError::InvalidProxyUrl {
        provider,
        reason: e.to_string(),
    })?;
    for (key, value) in params {
        url.query_pairs_mut().append_pair(key, value);
    }
    Ok(ProxyRequest {
        url: url.to_string(),
        headers: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(f: impl FnOnce(&mut ProxySettings)) -> ProxySettings {
        let mut settings = ProxySettings::default();
        f(&mut settings);
        settings
    }

    #[test]
    fn no_settings_selects_no_provider() {
        assert_eq!(ProxySettings::default().select_provider(), None);
    }

    #[test]
    fn direct_template_wins_over_every_named_api() {
        let settings = settings_with(|s| {
            s.direct_url_template = Some("https://relay.example.com/get?target={URL}".into());
            s.scraperapi_key = Some("sk-1".into());
            s.crawlbase_token = Some("cb-1".into());
        });
        let provider = settings.select_provider().unwrap();
        assert_eq!(provider.name(), "direct-template");
    }

    #[test]
    fn lone_scraperapi_key_selects_scraperapi() {
        let settings = settings_with(|s| s.scraperapi_key = Some("sk-1".into()));
        assert_eq!(settings.select_provider().unwrap().name(), "scraperapi");
    }

    #[test]
    fn named_apis_follow_priority_order() {
        let settings = settings_with(|s| {
            s.zenrows_key = Some("z-1".into());
            s.scrapingbee_key = Some("b-1".into());
            s.crawlbase_token = Some("c-1".into());
        });
        assert_eq!(settings.select_provider().unwrap().name(), "zenrows");

        let settings = settings_with(|s| {
            s.scrapingbee_key = Some("b-1".into());
            s.crawlbase_token = Some("c-1".into());
        });
        assert_eq!(settings.select_provider().unwrap().name(), "scrapingbee");

        let settings = settings_with(|s| s.crawlbase_token = Some("c-1".into()));
        assert_eq!(settings.select_provider().unwrap().name(), "crawlbase");
    }

    #[test]
    fn country_hint_derives_from_tld() {
        assert_eq!(country_hint("https://www.bol.com/be/p/1"), "fr");
        assert_eq!(country_hint("https://www.zalando.be/article"), "be");
        assert_eq!(country_hint("https://www.amazon.fr/dp/X"), "fr");
        assert_eq!(country_hint("not a url"), "fr");
    }

    #[test]
    fn scraperapi_request_targets_api_host_with_country_code() {
        let provider = ProxyProvider::ScraperApi {
            api_key: "sk-test".into(),
        };
        let request =
            build_proxy_request("https://www.zalando.be/article.html", &provider).unwrap();
        let url = Url::parse(&request.url).unwrap();
        assert_eq!(url.host_str(), Some("api.scraperapi.com"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("api_key".into(), "sk-test".into())));
        assert!(pairs.contains(&("country_code".into(), "be".into())));
        assert!(pairs.contains(&("url".into(), "https://www.zalando.be/article.html".into())));
        assert!(request.headers.is_empty());
    }

    #[test]
    fn zenrows_and_scrapingbee_use_their_own_key_params() {
        let request = build_proxy_request(
            "https://www.amazon.fr/dp/X",
            &ProxyProvider::ZenRows {
                api_key: "z-test".into(),
            },
        )
        .unwrap();
        assert!(request.url.starts_with("https://api.zenrows.com/v1/?"));
        assert!(request.url.contains("apikey=z-test"));
        assert!(request.url.contains("proxy_country=fr"));

        let request = build_proxy_request(
            "https://www.amazon.fr/dp/X",
            &ProxyProvider::ScrapingBee {
                api_key: "b-test".into(),
            },
        )
        .unwrap();
        assert!(request.url.starts_with("https://app.scrapingbee.com/api/v1/?"));
        assert!(request.url.contains("api_key=b-test"));
        assert!(request.url.contains("country_code=fr"));
    }

    #[test]
    fn crawlbase_uses_uppercase_country() {
        let request = build_proxy_request(
            "https://www.bol.com/be/p/1",
            &ProxyProvider::Crawlbase {
                token: "c-test".into(),
            },
        )
        .unwrap();
        assert!(request.url.contains("token=c-test"));
        assert!(request.url.contains("country=FR"));
    }

    #[test]
    fn template_placeholder_is_substituted_percent_encoded() {
        let provider = ProxyProvider::DirectTemplate {
            template: "https://relay.example.com/get?target={URL}".into(),
            api_key: None,
        };
        let request = build_proxy_request("https://www.amazon.fr/dp/X?a=1", &provider).unwrap();
        assert_eq!(
            request.url,
            "https://relay.example.com/get?target=https%3A%2F%2Fwww.amazon.fr%2Fdp%2FX%3Fa%3D1"
        );
    }

    #[test]
    fn template_without_placeholder_appends_url_param() {
        let provider = ProxyProvider::DirectTemplate {
            template: "https://relay.example.com/fetch".into(),
            api_key: Some("secret".into()),
        };
        let request = build_proxy_request("https://www.etsy.com/listing/1", &provider).unwrap();
        assert!(request
            .url
            .starts_with("https://relay.example.com/fetch?url=https%3A%2F%2F"));
        assert_eq!(request.headers, vec![("x-api-key", "secret".to_string())]);

        let provider = ProxyProvider::DirectTemplate {
            template: "https://relay.example.com/fetch?mode=raw".into(),
            api_key: None,
        };
        let request = build_proxy_request("https://www.etsy.com/listing/1", &provider).unwrap();
        assert!(request.url.contains("?mode=raw&url=https%3A%2F%2F"));
    }

    #[test]
    fn malformed_template_is_rejected() {
        let provider = ProxyProvider::DirectTemplate {
            template: "relay-without-scheme/{URL}".into(),
            api_key: None,
        };
        let result = build_proxy_request("https://www.amazon.fr/dp/X", &provider);
        assert!(
            matches!(result, Err(ScrapeError::InvalidProxyUrl { .. })),
            "expected InvalidProxyUrl, got: {result:?}"
        );
    }
}
