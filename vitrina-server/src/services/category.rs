//! Category management and product-link reconciliation

use crate::db;
use crate::error::ServiceResult;
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CategoryCreate};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;

/// Normalize caller-supplied category names: trim, lowercase, drop empties
/// and duplicates. Order of first appearance is preserved.
pub fn normalize_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.clone()) {
            out.push(name);
        }
    }
    out
}

/// Replace a product's category links with exactly the given names.
///
/// Missing categories are created on the fly; an empty list simply clears
/// the links. Runs on the caller's connection so it composes into the
/// surrounding product transaction.
pub async fn reconcile_product_categories(
    conn: &mut SqliteConnection,
    catalogue_id: i64,
    product_id: i64,
    names: &[String],
) -> Result<Vec<Category>, sqlx::Error> {
    db::category::delete_links_for_product(&mut *conn, product_id).await?;

    let now = now_millis();
    let mut categories = Vec::new();
    for name in normalize_names(names) {
        let category = db::category::find_or_create(&mut *conn, catalogue_id, &name, now).await?;
        db::category::link_product(&mut *conn, product_id, category.id).await?;
        categories.push(category);
    }

    Ok(categories)
}

/// Explicitly create a category; keeps the caller's casing.
pub async fn create(
    pool: &SqlitePool,
    user_id: &str,
    payload: CategoryCreate,
) -> ServiceResult<Category> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name must not be empty")
            .with_detail("field", "name")
            .into());
    }

    let catalogue = db::catalogue::find_by_slug(pool, &payload.catalogue_slug)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CatalogueNotFound))?;
    if catalogue.owner_user_id != user_id {
        return Err(AppError::permission_denied("catalogue belongs to another user").into());
    }

    let mut conn = pool.acquire().await?;
    let category = db::category::insert(&mut conn, catalogue.id, name, now_millis()).await?;

    tracing::info!(catalogue_id = catalogue.id, category_id = category.id, "Category created");
    Ok(category)
}

pub async fn list_by_catalogue_slug(
    pool: &SqlitePool,
    user_id: &str,
    slug: &str,
) -> ServiceResult<Vec<Category>> {
    let catalogue = db::catalogue::find_by_slug(pool, slug)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CatalogueNotFound))?;
    if catalogue.owner_user_id != user_id {
        return Err(AppError::permission_denied("catalogue belongs to another user").into());
    }

    Ok(db::category::list_by_catalogue(pool, catalogue.id).await?)
}

pub async fn delete(pool: &SqlitePool, user_id: &str, category_id: i64) -> ServiceResult<()> {
    let category = db::category::find_by_id(pool, category_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;

    let catalogue = db::catalogue::find_by_id(pool, category.catalogue_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CatalogueNotFound))?;
    if catalogue.owner_user_id != user_id {
        return Err(AppError::permission_denied("catalogue belongs to another user").into());
    }

    let mut tx = pool.begin().await?;
    db::category::delete(&mut *tx, category_id).await?;
    tx.commit().await?;

    tracing::info!(category_id, "Category deleted");
    Ok(())
}
