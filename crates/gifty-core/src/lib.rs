use serde::{Deserialize, Serialize};
use thiserror::Error;

mod app_config;
mod config;

pub use app_config::{AppConfig, Environment};
pub use config::{
    load_app_config, load_app_config_from_env, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT,
};

/// The normalized product record produced by every merchant extractor.
///
/// Constructed fresh per extraction and never mutated afterwards. `rating`
/// and `ratings_count` are omitted from the JSON body when absent rather
/// than serialized as `null`, matching what the console UI expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftProduct {
    pub name: String,
    /// Display string, e.g. `"€ 19.99"`. Not a numeric amount.
    pub price: String,
    pub image_url: String,
    pub product_link: String,
    pub description: String,
    /// Star rating in `[0, 5]`. Parsed values above 5 are discarded upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings_count: Option<u64>,
    /// Two-letter country code, forced per merchant.
    pub country: String,
}

/// A merchant whose product pages the console can import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Merchant {
    Amazon,
    Bolcom,
    Zalando,
    Etsy,
}

impl Merchant {
    /// The slug used in ingest route paths (`/api/v1/ingest/{slug}`).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Merchant::Amazon => "amazon",
            Merchant::Bolcom => "bolcom",
            Merchant::Zalando => "zalando",
            Merchant::Etsy => "etsy",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Merchant::Amazon => "Amazon",
            Merchant::Bolcom => "bol.com",
            Merchant::Zalando => "Zalando",
            Merchant::Etsy => "Etsy",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "amazon" => Some(Merchant::Amazon),
            "bolcom" => Some(Merchant::Bolcom),
            "zalando" => Some(Merchant::Zalando),
            "etsy" => Some(Merchant::Etsy),
            _ => None,
        }
    }

    pub const ALL: [Merchant; 4] = [
        Merchant::Amazon,
        Merchant::Bolcom,
        Merchant::Zalando,
        Merchant::Etsy,
    ];
}

impl std::fmt::Display for Merchant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// A swipe reaction recorded against a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
    Superlike,
}

impl ReactionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
            ReactionKind::Superlike => "superlike",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gift_product_omits_absent_rating_fields() {
        let product = GiftProduct {
            name: "Scented candle".to_string(),
            price: "€ 19.99".to_string(),
            image_url: "https://img.example.com/candle.jpg".to_string(),
            product_link: "https://www.bol.com/be/p/candle/1".to_string(),
            description: String::new(),
            rating: None,
            ratings_count: None,
            country: "BE".to_string(),
        };
        let json = serde_json::to_string(&product).expect("serialize");
        assert!(!json.contains("rating"), "absent rating must not serialize");
        assert!(json.contains("\"country\":\"BE\""));
    }

    #[test]
    fn gift_product_serializes_present_rating_fields() {
        let product = GiftProduct {
            name: "Watch".to_string(),
            price: "€ 249.00".to_string(),
            image_url: "https://img.example.com/w.jpg".to_string(),
            product_link: "https://www.amazon.fr/dp/X".to_string(),
            description: String::new(),
            rating: Some(4.4),
            ratings_count: Some(1860),
            country: "FR".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&product).expect("serialize"))
                .expect("parse");
        assert!((json["rating"].as_f64().unwrap() - 4.4).abs() < f64::EPSILON);
        assert_eq!(json["ratings_count"].as_u64(), Some(1860));
    }

    #[test]
    fn merchant_slug_round_trips() {
        for merchant in Merchant::ALL {
            assert_eq!(Merchant::from_slug(merchant.slug()), Some(merchant));
        }
        assert_eq!(Merchant::from_slug("ebay"), None);
    }

    #[test]
    fn reaction_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ReactionKind::Superlike).expect("serialize");
        assert_eq!(json, "\"superlike\"");
    }
}
