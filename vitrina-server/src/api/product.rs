//! Product endpoints

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use shared::models::{Product, ProductCreate, ProductUpdate};

use super::read_multipart;
use crate::auth::UserIdentity;
use crate::error::ServiceError;
use crate::services::product;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ServiceError>;

/// POST /api/products — multipart: scalar fields, repeated
/// `category_names` fields and one file part per image.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    multipart: Multipart,
) -> ApiResult<Product> {
    let form = read_multipart(multipart).await?;

    let payload = ProductCreate {
        catalogue_id: form.require_parsed("catalogue_id")?,
        name: form.require("name")?.to_string(),
        price: form.require_parsed("price")?,
        currency: form.require_parsed("currency")?,
        details: form.text("details").map(str::to_string),
        status: form.parse("status")?.unwrap_or_default(),
        category_names: form.texts("category_names"),
    };

    let created = product::create(
        &state.pool,
        state.storage.as_ref(),
        &state.config,
        &identity.user_id,
        payload,
        form.files,
    )
    .await?;

    Ok(Json(created))
}

/// GET /api/products/{id}
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Product> {
    let found = product::get(&state.pool, id, &identity.user_id).await?;
    Ok(Json(found))
}

/// PATCH /api/products/{id} — multipart; absent fields keep their value,
/// file parts are appended as new images, `category_names` fully replace
/// the links.
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Product> {
    let form = read_multipart(multipart).await?;

    let payload = ProductUpdate {
        name: form.text("name").map(str::to_string),
        price: form.parse("price")?,
        currency: form.parse("currency")?,
        details: form.text("details").map(str::to_string),
        status: form.parse("status")?,
        category_names: form.texts("category_names"),
    };

    let updated = product::update(
        &state.pool,
        state.storage.as_ref(),
        &state.config,
        id,
        &identity.user_id,
        payload,
        form.files,
    )
    .await?;

    Ok(Json(updated))
}

/// DELETE /api/products/{id}
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    product::delete(&state.pool, state.storage.as_ref(), id, &identity.user_id).await?;
    Ok(Json(json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageRequest {
    pub url: String,
}

/// DELETE /api/products/{id}/images — detach one image by URL
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<DeleteImageRequest>,
) -> ApiResult<Value> {
    product::delete_image(
        &state.pool,
        state.storage.as_ref(),
        id,
        &identity.user_id,
        &req.url,
    )
    .await?;
    Ok(Json(json!({ "deleted": true })))
}

/// GET /api/storefront/{slug}/products — public listing
pub async fn list_by_catalogue_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Vec<Product>> {
    let products = product::list_by_catalogue_slug(&state.pool, &slug).await?;
    Ok(Json(products))
}
