use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use gifty_core::{GiftProduct, Merchant};
use gifty_scraper::{domains, extract_product};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct IngestBody {
    url: Option<String>,
}

/// Imports a merchant product page: validates the URL against the merchant's
/// predicate, fetches the page through the proxy chain, and extracts the
/// normalized record. Nothing is persisted here; the console reviews the
/// result before creating the product.
pub(super) async fn ingest_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(merchant): Path<String>,
    Json(body): Json<IngestBody>,
) -> Result<Json<ApiResponse<GiftProduct>>, ApiError> {
    let Some(merchant) = Merchant::from_slug(&merchant) else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            format!("unknown merchant: {merchant}"),
        ));
    };

    let url = body.url.as_deref().map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return Err(ApiError::new(req_id.0, "bad_request", "missing url"));
    }
    if !domains::matches_merchant(merchant, url) {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            format!(
                "only {} product URLs are supported",
                merchant.display_name()
            ),
        ));
    }

    let html = state.fetcher.fetch_page(url).await.map_err(|e| {
        tracing::error!(merchant = %merchant, url, error = %e, "page fetch failed");
        ApiError::new(
            req_id.0.clone(),
            "fetch_failed",
            format!("failed to fetch {} page", merchant.display_name()),
        )
    })?;

    let product = extract_product(&html, url, merchant, &state.affiliate_tag);

    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{body_json, test_state};
    use super::super::build_app;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn post_ingest(merchant: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/ingest/{merchant}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn unknown_merchant_is_rejected() {
        let app = build_app(test_state());
        let response = app
            .oneshot(post_ingest("ebay", &json!({"url": "https://www.ebay.com/itm/1"})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"].as_str(), Some("bad_request"));
    }

    #[tokio::test]
    async fn missing_url_is_rejected() {
        let app = build_app(test_state());
        let response = app
            .oneshot(post_ingest("amazon", &json!({})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"].as_str(), Some("missing url"));
    }

    #[tokio::test]
    async fn wrong_merchant_url_is_rejected_before_any_fetch() {
        let app = build_app(test_state());
        let response = app
            .oneshot(post_ingest(
                "bolcom",
                &json!({"url": "https://www.amazon.fr/dp/X"}),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("bol.com"));
    }
}
