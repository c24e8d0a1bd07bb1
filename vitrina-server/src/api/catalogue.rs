//! Catalogue endpoints

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use serde_json::{Value, json};
use shared::models::{Catalogue, CatalogueCreate, CatalogueUpdate};

use super::read_multipart;
use crate::auth::UserIdentity;
use crate::error::ServiceError;
use crate::services::catalogue::{self, CataloguePublic};
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ServiceError>;

/// POST /api/catalogues — multipart: scalar fields plus an optional
/// store image file.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    multipart: Multipart,
) -> ApiResult<Catalogue> {
    let mut form = read_multipart(multipart).await?;

    let payload = CatalogueCreate {
        slug: form.require("slug")?.to_string(),
        business_name: form.require("business_name")?.to_string(),
        contact_method: form.require("contact_method")?.to_string(),
        whatsapp_number: form.text("whatsapp_number").map(str::to_string),
        instagram_username: form.text("instagram_username").map(str::to_string),
        facebook_url: form.text("facebook_url").map(str::to_string),
        store_link: form.text("store_link").map(str::to_string),
    };
    let file = if form.files.is_empty() {
        None
    } else {
        Some(form.files.remove(0))
    };

    let created = catalogue::create(
        &state.pool,
        state.storage.as_ref(),
        &state.config,
        &identity.user_id,
        payload,
        file,
    )
    .await?;

    Ok(Json(created))
}

/// GET /api/storefront/{slug} — public storefront view
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<CataloguePublic> {
    let public = catalogue::get_by_slug(&state.pool, &slug).await?;
    Ok(Json(public))
}

/// GET /api/catalogues/me
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<Catalogue>> {
    let catalogues = catalogue::list_mine(&state.pool, &identity.user_id).await?;
    Ok(Json(catalogues))
}

/// PATCH /api/catalogues/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
    Json(payload): Json<CatalogueUpdate>,
) -> ApiResult<Catalogue> {
    let updated = catalogue::update(&state.pool, id, &identity.user_id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/catalogues/{id}
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    catalogue::delete(&state.pool, id, &identity.user_id).await?;
    Ok(Json(json!({ "deleted": true })))
}
