//! Category endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use shared::models::{Category, CategoryCreate};

use crate::auth::UserIdentity;
use crate::error::ServiceError;
use crate::services::category;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ServiceError>;

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<CategoryCreate>,
) -> ApiResult<Category> {
    let created = category::create(&state.pool, &identity.user_id, payload).await?;
    Ok(Json(created))
}

/// GET /api/categories/by-catalogue/{slug} — owner-only listing
pub async fn list_by_catalogue_slug(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(slug): Path<String>,
) -> ApiResult<Vec<Category>> {
    let categories =
        category::list_by_catalogue_slug(&state.pool, &identity.user_id, &slug).await?;
    Ok(Json(categories))
}

/// DELETE /api/categories/{id}
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    category::delete(&state.pool, &identity.user_id, id).await?;
    Ok(Json(json!({ "deleted": true })))
}
