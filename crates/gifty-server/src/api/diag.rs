use axum::{extract::State, Extension, Json};
use serde::Serialize;

use gifty_scraper::{PageHeaders, ProxySettings};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

const IP_PROBE_URL: &str = "https://httpbin.org/ip";

#[derive(Debug, Serialize)]
pub(super) struct ProxyDiagnostics {
    /// Name of the provider the next fetch would use, or `"direct"`.
    provider: &'static str,
    /// Response of an egress-IP probe issued through the fetch chain;
    /// raw text when the probe body is not JSON.
    httpbin: serde_json::Value,
}

/// Reports which scrape-proxy provider is active and what IP the world
/// sees for outbound fetches.
pub(super) async fn proxy_diagnostics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ProxyDiagnostics>>, ApiError> {
    let settings = ProxySettings::from_env();
    let provider = settings
        .select_provider()
        .map_or("direct", |provider| provider.name());

    let headers = PageHeaders {
        user_agent: None,
        accept_language: Some("en,en;q=0.8".to_string()),
    };
    let body = state
        .fetcher
        .fetch_page_with(IP_PROBE_URL, &settings, &headers)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "proxy diagnostic probe failed");
            ApiError::new(req_id.0.clone(), "fetch_failed", "diagnostic probe failed")
        })?;

    let httpbin = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));

    Ok(Json(ApiResponse {
        data: ProxyDiagnostics { provider, httpbin },
        meta: ResponseMeta::new(req_id.0),
    }))
}
