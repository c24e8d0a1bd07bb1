//! Catalogue management and the public storefront view

use crate::config::Config;
use crate::db;
use crate::error::ServiceResult;
use crate::services::images::{self, ImageFile};
use crate::services::product::load_catalogue_products;
use crate::services::storage::ObjectStorage;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Catalogue, CatalogueCreate, CatalogueUpdate, Product};
use shared::util::now_millis;
use sqlx::SqlitePool;

/// Storefront payload for buyers: the catalogue, a ready-to-follow
/// contact link, and its products with images and categories attached.
#[derive(Debug, Serialize)]
pub struct CataloguePublic {
    #[serde(flatten)]
    pub catalogue: Catalogue,
    pub contact_link: String,
    pub products: Vec<Product>,
}

fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.is_empty() {
        return Err(AppError::validation("slug must not be empty").with_detail("field", "slug"));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(
            AppError::validation("slug may only contain letters, digits, - and _")
                .with_detail("field", "slug"),
        );
    }
    Ok(())
}

pub async fn create(
    pool: &SqlitePool,
    storage: &dyn ObjectStorage,
    config: &Config,
    user_id: &str,
    payload: CatalogueCreate,
    file: Option<ImageFile>,
) -> ServiceResult<Catalogue> {
    let slug = payload.slug.trim().to_lowercase();
    validate_slug(&slug)?;

    let business_name = payload.business_name.trim().to_string();
    if business_name.is_empty() {
        return Err(AppError::validation("business_name must not be empty")
            .with_detail("field", "business_name")
            .into());
    }

    let contact = payload.contact()?;

    let now = now_millis();
    let store_image_url = match file {
        Some(file) => {
            images::validate(&file, config.max_image_bytes)?;
            let processed = images::process(&file.data)?;
            let path = format!("catalogues/{slug}-{now}.jpg");
            storage
                .upload(processed, &path)
                .await
                .map_err(|e| AppError::storage(format!("store image upload failed: {e}")))?
        }
        None => String::new(),
    };

    let catalogue = db::catalogue::insert(
        pool,
        user_id,
        &slug,
        &business_name,
        &contact,
        &store_image_url,
        now,
    )
    .await?;

    tracing::info!(catalogue_id = catalogue.id, slug = %catalogue.slug, "Catalogue created");
    Ok(catalogue)
}

/// Public storefront view, no authentication.
pub async fn get_by_slug(pool: &SqlitePool, slug: &str) -> ServiceResult<CataloguePublic> {
    let catalogue = db::catalogue::find_by_slug(pool, slug)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CatalogueNotFound))?;

    let products = load_catalogue_products(pool, catalogue.id).await?;
    let contact_link = catalogue.contact.contact_link();

    Ok(CataloguePublic {
        catalogue,
        contact_link,
        products,
    })
}

pub async fn list_mine(pool: &SqlitePool, user_id: &str) -> ServiceResult<Vec<Catalogue>> {
    Ok(db::catalogue::list_by_owner(pool, user_id).await?)
}

pub async fn update(
    pool: &SqlitePool,
    catalogue_id: i64,
    user_id: &str,
    payload: CatalogueUpdate,
) -> ServiceResult<Catalogue> {
    let mut catalogue = db::catalogue::find_by_id(pool, catalogue_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CatalogueNotFound))?;
    if catalogue.owner_user_id != user_id {
        return Err(AppError::permission_denied("catalogue belongs to another user").into());
    }

    if let Some(slug) = payload.slug.as_deref() {
        let slug = slug.trim().to_lowercase();
        validate_slug(&slug)?;
        catalogue.slug = slug;
    }
    if let Some(name) = payload.business_name.as_deref() {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("business_name must not be empty")
                .with_detail("field", "business_name")
                .into());
        }
        catalogue.business_name = name.to_string();
    }
    if let Some(contact) = payload.contact()? {
        catalogue.contact = contact;
    }

    db::catalogue::update(
        pool,
        catalogue.id,
        &catalogue.slug,
        &catalogue.business_name,
        &catalogue.contact,
        &catalogue.store_image_url,
    )
    .await?;

    Ok(catalogue)
}

/// Remove a catalogue together with its products, categories and image
/// rows. Stored objects are left to out-of-band cleanup.
pub async fn delete(pool: &SqlitePool, catalogue_id: i64, user_id: &str) -> ServiceResult<()> {
    let catalogue = db::catalogue::find_by_id(pool, catalogue_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CatalogueNotFound))?;
    if catalogue.owner_user_id != user_id {
        return Err(AppError::permission_denied("catalogue belongs to another user").into());
    }

    let mut tx = pool.begin().await?;
    db::catalogue::delete_cascade(&mut *tx, catalogue_id).await?;
    tx.commit().await?;

    tracing::info!(catalogue_id, slug = %catalogue.slug, "Catalogue deleted");
    Ok(())
}
