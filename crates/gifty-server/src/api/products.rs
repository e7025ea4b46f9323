use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use url::Url;

use gifty_db::{NewProduct, ProductRow};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CreateProductBody {
    name: String,
    price: String,
    image_url: String,
    product_link: String,
    description: Option<String>,
    category: Option<String>,
    availability: Option<bool>,
    rating: Option<f64>,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductRow>>>, ApiError> {
    let products = state
        .store
        .list_products()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: products,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateProductBody>,
) -> Result<Json<ApiResponse<ProductRow>>, ApiError> {
    let new_product = validate(body).map_err(|message| {
        ApiError::new(req_id.0.clone(), "validation_error", message)
    })?;

    let product = state
        .store
        .insert_product(new_product)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn validate(body: CreateProductBody) -> Result<NewProduct, String> {
    if body.name.trim().is_empty() {
        return Err("product name is required".to_string());
    }
    if body.price.trim().is_empty() {
        return Err("price is required".to_string());
    }
    if Url::parse(&body.image_url).is_err() {
        return Err("image_url must be a valid URL".to_string());
    }
    if Url::parse(&body.product_link).is_err() {
        return Err("product_link must be a valid URL".to_string());
    }
    if let Some(rating) = body.rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err("rating must be between 0 and 5".to_string());
        }
    }

    Ok(NewProduct {
        name: body.name,
        price: body.price,
        image_url: body.image_url,
        product_link: body.product_link,
        description: body.description,
        category: body.category,
        availability: body.availability.unwrap_or(true),
        rating: body.rating,
    })
}
