//! Product repository

use super::BoxError;
use shared::models::{Product, ProductImage};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, catalogue_id, name, price, currency, details, status, created_at";

/// Raw product row; currency and status are stored as text.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    catalogue_id: i64,
    name: String,
    price: f64,
    currency: String,
    details: Option<String>,
    status: String,
    created_at: i64,
}

impl ProductRow {
    fn into_model(self) -> Result<Product, BoxError> {
        Ok(Product {
            id: self.id,
            catalogue_id: self.catalogue_id,
            name: self.name,
            price: self.price,
            currency: self.currency.parse().map_err(BoxError::from)?,
            details: self.details,
            status: self.status.parse().map_err(BoxError::from)?,
            created_at: self.created_at,
            images: Vec::new(),
            categories: Vec::new(),
        })
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    conn: &mut SqliteConnection,
    catalogue_id: i64,
    name: &str,
    price: f64,
    currency: &str,
    details: Option<&str>,
    status: &str,
    now: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO products (catalogue_id, name, price, currency, details, status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(catalogue_id)
    .bind(name)
    .bind(price)
    .bind(currency)
    .bind(details)
    .bind(status)
    .bind(now)
    .fetch_one(conn)
    .await
}

/// Full-row scalar update; relations are reconciled separately.
pub async fn update_scalars(
    conn: &mut SqliteConnection,
    id: i64,
    name: &str,
    price: f64,
    currency: &str,
    details: Option<&str>,
    status: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE products SET name = ?, price = ?, currency = ?, details = ?, status = ? WHERE id = ?",
    )
    .bind(name)
    .bind(price)
    .bind(currency)
    .bind(details)
    .bind(status)
    .bind(id)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Product>, BoxError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {COLUMNS} FROM products WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(ProductRow::into_model).transpose()
}

/// Product plus the owner of its catalogue, for ownership checks.
pub async fn find_with_owner(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<(Product, String)>, BoxError> {
    #[derive(sqlx::FromRow)]
    struct OwnedRow {
        #[sqlx(flatten)]
        product: ProductRow,
        owner_user_id: String,
    }

    let row = sqlx::query_as::<_, OwnedRow>(
        "SELECT p.id, p.catalogue_id, p.name, p.price, p.currency, p.details, p.status, p.created_at, c.owner_user_id \
         FROM products p JOIN catalogues c ON c.id = p.catalogue_id WHERE p.id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(r) => Ok(Some((r.product.into_model()?, r.owner_user_id))),
        None => Ok(None),
    }
}

pub async fn list_by_catalogue(
    pool: &SqlitePool,
    catalogue_id: i64,
) -> Result<Vec<Product>, BoxError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {COLUMNS} FROM products WHERE catalogue_id = ? ORDER BY created_at DESC"
    ))
    .bind(catalogue_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ProductRow::into_model).collect()
}

pub async fn insert_images(
    conn: &mut SqliteConnection,
    product_id: i64,
    urls: &[String],
    now: i64,
) -> Result<(), sqlx::Error> {
    for url in urls {
        sqlx::query("INSERT INTO product_images (product_id, url, created_at) VALUES (?, ?, ?)")
            .bind(product_id)
            .bind(url)
            .bind(now)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn list_images(
    pool: &SqlitePool,
    product_id: i64,
) -> Result<Vec<ProductImage>, sqlx::Error> {
    sqlx::query_as::<_, ProductImage>(
        "SELECT id, product_id, url, created_at FROM product_images WHERE product_id = ? ORDER BY id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await
}

/// All images for every product in a catalogue, for building listings
/// without a query per product.
pub async fn list_images_by_catalogue(
    pool: &SqlitePool,
    catalogue_id: i64,
) -> Result<Vec<ProductImage>, sqlx::Error> {
    sqlx::query_as::<_, ProductImage>(
        "SELECT i.id, i.product_id, i.url, i.created_at FROM product_images i \
         JOIN products p ON p.id = i.product_id WHERE p.catalogue_id = ? ORDER BY i.id",
    )
    .bind(catalogue_id)
    .fetch_all(pool)
    .await
}

pub async fn count_images(pool: &SqlitePool, product_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM product_images WHERE product_id = ?")
        .bind(product_id)
        .fetch_one(pool)
        .await
}

/// Returns the number of rows removed (0 when the URL isn't attached).
pub async fn delete_image(
    conn: &mut SqliteConnection,
    product_id: i64,
    url: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM product_images WHERE product_id = ? AND url = ?")
        .bind(product_id)
        .bind(url)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Remove a product and its dependent rows, inside the caller's transaction.
pub async fn delete_rows(conn: &mut SqliteConnection, product_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM product_images WHERE product_id = ?")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM product_categories WHERE product_id = ?")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
