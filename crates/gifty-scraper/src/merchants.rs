//! Per-merchant extraction profiles.
//!
//! The four merchants share one extraction pipeline; everything
//! merchant-specific (selector lists, rating formats, link and country
//! rules) lives here as data.

use gifty_core::Merchant;

/// Where a field's raw value comes from in the document.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Source {
    /// Trimmed text content of the first matching element.
    Text(&'static str),
    /// An attribute of the first matching element.
    Attr(&'static str, &'static str),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum DescriptionRule {
    Sources(&'static [Source]),
    /// Item texts joined with a separator (Amazon's feature bullets).
    BulletList {
        selector: &'static str,
        separator: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum RatingRule {
    /// No HTML rating source; JSON-LD only.
    None,
    /// Free text in "<n> out of 5" / "<n> sur 5" form.
    OutOfFive(&'static [Source]),
    /// Bare numeric attribute values.
    Numeric(&'static [Source]),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CountRule {
    None,
    /// Visible text candidates; grouped-number parse with the doubled-run
    /// collapse.
    VisibleText(&'static [Source]),
    /// Structured attribute values; digit strip only.
    Numeric(&'static [Source]),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum LinkRule {
    /// The request URL passes through unchanged.
    RequestUrl,
    /// Prefer the page's canonical link, then inject the affiliate tag.
    CanonicalAffiliate,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CountryRule {
    Fixed(&'static str),
    /// Derived from the hostname, restricted to an allow-list.
    HostDerived {
        allowed: &'static [&'static str],
        fallback: &'static str,
    },
}

/// Selector sweep used when the price is still empty after meta tags and
/// JSON-LD: collect all candidate texts, prefer a euro-bearing one.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PriceSweep {
    pub meta: &'static [Source],
    pub text_selectors: &'static [&'static str],
}

pub(crate) struct MerchantProfile {
    pub name_sources: &'static [Source],
    pub image_sources: &'static [Source],
    pub description: DescriptionRule,
    pub price_sources: &'static [Source],
    pub currency_sources: &'static [Source],
    pub price_fallback: Option<PriceSweep>,
    pub rating: RatingRule,
    pub count: CountRule,
    pub link: LinkRule,
    pub country: CountryRule,
}

const OG_TITLE: Source = Source::Attr(r#"meta[property="og:title"]"#, "content");
const OG_IMAGE: Source = Source::Attr(r#"meta[property="og:image"]"#, "content");
const OG_DESCRIPTION: Source = Source::Attr(r#"meta[property="og:description"]"#, "content");
const META_PRICE_AMOUNT: Source = Source::Attr(r#"meta[property="product:price:amount"]"#, "content");
const META_PRICE_CURRENCY: Source =
    Source::Attr(r#"meta[property="product:price:currency"]"#, "content");
const ITEMPROP_PRICE: Source = Source::Attr(r#"meta[itemprop="price"]"#, "content");
const ITEMPROP_CURRENCY: Source = Source::Attr(r#"meta[itemprop="priceCurrency"]"#, "content");

static AMAZON: MerchantProfile = MerchantProfile {
    name_sources: &[Source::Text("#productTitle"), OG_TITLE],
    image_sources: &[
        Source::Attr("#landingImage", "src"),
        Source::Attr("img[data-old-hires]", "data-old-hires"),
        OG_IMAGE,
    ],
    description: DescriptionRule::BulletList {
        selector: "#feature-bullets li",
        separator: " • ",
    },
    price_sources: &[
        Source::Text("#corePrice_feature_div .a-offscreen"),
        Source::Text("#priceblock_ourprice"),
        Source::Text("#priceblock_dealprice"),
        ITEMPROP_PRICE,
    ],
    currency_sources: &[],
    price_fallback: None,
    rating: RatingRule::OutOfFive(&[
        Source::Attr("#acrPopover", "title"),
        Source::Text("i.a-icon-star span.a-icon-alt"),
        Source::Text(r#"span[data-hook="rating-out-of-text"]"#),
    ]),
    count: CountRule::VisibleText(&[
        Source::Text("#acrCustomerReviewText"),
        Source::Text(r#"span[data-hook="total-review-count"]"#),
        Source::Text(r##"a[href="#customerReviews"]"##),
    ]),
    link: LinkRule::CanonicalAffiliate,
    country: CountryRule::Fixed("FR"),
};

static BOLCOM: MerchantProfile = MerchantProfile {
    name_sources: &[OG_TITLE, Source::Text("h1")],
    image_sources: &[OG_IMAGE],
    description: DescriptionRule::Sources(&[OG_DESCRIPTION]),
    price_sources: &[META_PRICE_AMOUNT, ITEMPROP_PRICE],
    currency_sources: &[META_PRICE_CURRENCY, ITEMPROP_CURRENCY],
    price_fallback: Some(PriceSweep {
        meta: &[Source::Attr(r#"meta[name="twitter:data1"]"#, "content")],
        text_selectors: &[
            r#"[data-test="price"]"#,
            r#"[data-test="price-info"]"#,
            r#"[data-test="price-value"]"#,
            ".promo-price",
            ".price-block__highlight",
            ".price-block__price",
        ],
    }),
    rating: RatingRule::None,
    count: CountRule::None,
    link: LinkRule::RequestUrl,
    country: CountryRule::Fixed("BE"),
};

static ZALANDO: MerchantProfile = MerchantProfile {
    name_sources: &[OG_TITLE, Source::Text("h1")],
    image_sources: &[OG_IMAGE],
    description: DescriptionRule::Sources(&[OG_DESCRIPTION]),
    price_sources: &[META_PRICE_AMOUNT, ITEMPROP_PRICE],
    currency_sources: &[META_PRICE_CURRENCY, ITEMPROP_CURRENCY],
    price_fallback: None,
    rating: RatingRule::Numeric(&[
        Source::Attr(r#"[itemprop="ratingValue"]"#, "content"),
        Source::Attr(r#"meta[itemprop="ratingValue"]"#, "content"),
    ]),
    count: CountRule::Numeric(&[
        Source::Attr(r#"[itemprop="reviewCount"]"#, "content"),
        Source::Attr(r#"meta[itemprop="reviewCount"]"#, "content"),
    ]),
    link: LinkRule::RequestUrl,
    country: CountryRule::HostDerived {
        allowed: &["FR", "BE"],
        fallback: "FR",
    },
};

static ETSY: MerchantProfile = MerchantProfile {
    name_sources: &[OG_TITLE, Source::Text("h1")],
    image_sources: &[OG_IMAGE],
    description: DescriptionRule::Sources(&[OG_DESCRIPTION]),
    price_sources: &[ITEMPROP_PRICE],
    currency_sources: &[ITEMPROP_CURRENCY],
    price_fallback: None,
    rating: RatingRule::Numeric(&[Source::Attr(r#"meta[itemprop="ratingValue"]"#, "content")]),
    count: CountRule::Numeric(&[Source::Attr(r#"meta[itemprop="reviewCount"]"#, "content")]),
    link: LinkRule::RequestUrl,
    country: CountryRule::Fixed("FR"),
};

pub(crate) fn profile(merchant: Merchant) -> &'static MerchantProfile {
    match merchant {
        Merchant::Amazon => &AMAZON,
        Merchant::Bolcom => &BOLCOM,
        Merchant::Zalando => &ZALANDO,
        Merchant::Etsy => &ETSY,
    }
}
