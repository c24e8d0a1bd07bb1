//! Catalogue repository

use super::BoxError;
use shared::models::{Catalogue, ContactMethod};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str =
    "id, slug, business_name, contact_method, contact_value, store_image_url, owner_user_id, created_at";

/// Raw catalogue row; the (method, value) pair is rebuilt into a
/// [`ContactMethod`] on the way out.
#[derive(sqlx::FromRow)]
struct CatalogueRow {
    id: i64,
    slug: String,
    business_name: String,
    contact_method: String,
    contact_value: String,
    store_image_url: String,
    owner_user_id: String,
    created_at: i64,
}

impl CatalogueRow {
    fn into_model(self) -> Result<Catalogue, BoxError> {
        let contact = ContactMethod::from_storage(&self.contact_method, &self.contact_value)?;
        Ok(Catalogue {
            id: self.id,
            slug: self.slug,
            business_name: self.business_name,
            contact,
            store_image_url: self.store_image_url,
            owner_user_id: self.owner_user_id,
            created_at: self.created_at,
        })
    }
}

pub async fn insert(
    pool: &SqlitePool,
    owner_user_id: &str,
    slug: &str,
    business_name: &str,
    contact: &ContactMethod,
    store_image_url: &str,
    now: i64,
) -> Result<Catalogue, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO catalogues (slug, business_name, contact_method, contact_value, store_image_url, owner_user_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(slug)
    .bind(business_name)
    .bind(contact.method())
    .bind(contact.value())
    .bind(store_image_url)
    .bind(owner_user_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(Catalogue {
        id,
        slug: slug.to_string(),
        business_name: business_name.to_string(),
        contact: contact.clone(),
        store_image_url: store_image_url.to_string(),
        owner_user_id: owner_user_id.to_string(),
        created_at: now,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Catalogue>, BoxError> {
    let row = sqlx::query_as::<_, CatalogueRow>(&format!(
        "SELECT {COLUMNS} FROM catalogues WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(CatalogueRow::into_model).transpose()
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Catalogue>, BoxError> {
    let row = sqlx::query_as::<_, CatalogueRow>(&format!(
        "SELECT {COLUMNS} FROM catalogues WHERE slug = ?"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    row.map(CatalogueRow::into_model).transpose()
}

pub async fn list_by_owner(
    pool: &SqlitePool,
    owner_user_id: &str,
) -> Result<Vec<Catalogue>, BoxError> {
    let rows = sqlx::query_as::<_, CatalogueRow>(&format!(
        "SELECT {COLUMNS} FROM catalogues WHERE owner_user_id = ? ORDER BY created_at DESC"
    ))
    .bind(owner_user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(CatalogueRow::into_model).collect()
}

/// Full-row update; the service merges optional attrs into the loaded
/// catalogue before calling this.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    slug: &str,
    business_name: &str,
    contact: &ContactMethod,
    store_image_url: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE catalogues SET slug = ?, business_name = ?, contact_method = ?, contact_value = ?, store_image_url = ? WHERE id = ?",
    )
    .bind(slug)
    .bind(business_name)
    .bind(contact.method())
    .bind(contact.value())
    .bind(store_image_url)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a catalogue and everything hanging off it, inside the caller's
/// transaction: category links, images, products, categories, then the row.
pub async fn delete_cascade(conn: &mut SqliteConnection, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "DELETE FROM product_categories WHERE product_id IN (SELECT id FROM products WHERE catalogue_id = ?)",
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "DELETE FROM product_images WHERE product_id IN (SELECT id FROM products WHERE catalogue_id = ?)",
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM products WHERE catalogue_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM categories WHERE catalogue_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM catalogues WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
