use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use gifty_core::ReactionKind;
use gifty_db::{NewReaction, ReactionRow};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Wire shape kept from the original console UI: `itemId` + `action`.
#[derive(Debug, Deserialize)]
pub(super) struct CreateReactionBody {
    #[serde(rename = "itemId")]
    item_id: String,
    action: ReactionKind,
    session_id: Option<String>,
}

pub(super) async fn list_reactions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ReactionRow>>>, ApiError> {
    let reactions = state
        .store
        .list_reactions()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: reactions,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_reaction(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateReactionBody>,
) -> Result<Json<ApiResponse<ReactionRow>>, ApiError> {
    if body.item_id.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "itemId is required",
        ));
    }

    // Cookie-based sessions are out of scope; callers without one get a
    // throwaway session identifier.
    let session_id = body
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("session_{}", Uuid::new_v4()));

    let reaction = state
        .store
        .insert_reaction(NewReaction {
            session_id,
            product_id: body.item_id,
            kind: body.action,
        })
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: reaction,
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

    fn post_reaction(body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/reactions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn create_generates_session_id_when_absent() {
        let app = build_app(test_state());
        let response = app
            .oneshot(post_reaction(&json!({"itemId": "p-1", "action": "like"})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["product_id"].as_str(), Some("p-1"));
        assert_eq!(json["data"]["reaction"].as_str(), Some("like"));
        assert!(json["data"]["session_id"]
            .as_str()
            .unwrap()
            .starts_with("session_"));
    }

    #[tokio::test]
    async fn create_keeps_caller_session_id() {
        let app = build_app(test_state());
        let response = app
            .oneshot(post_reaction(&json!({
                "itemId": "p-1",
                "action": "superlike",
                "session_id": "session_abc"
            })))
            .await
            .expect("response");

        let json = body_json(response).await;
        assert_eq!(json["data"]["session_id"].as_str(), Some("session_abc"));
    }

    #[tokio::test]
    async fn create_rejects_unknown_action() {
        let app = build_app(test_state());
        let response = app
            .oneshot(post_reaction(&json!({"itemId": "p-1", "action": "meh"})))
            .await
            .expect("response");
        // Serde rejects the enum value before the handler runs.
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn create_rejects_blank_item_id() {
        let app = build_app(test_state());
        let response = app
            .oneshot(post_reaction(&json!({"itemId": " ", "action": "like"})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_returns_inserted_reactions() {
        let app = build_app(test_state());
        app.clone()
            .oneshot(post_reaction(&json!({"itemId": "p-9", "action": "dislike"})))
            .await
            .expect("insert");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/reactions")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let json = body_json(response).await;
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["reaction"].as_str(), Some("dislike"));
    }
}
