//! Category repository

use shared::models::Category;
use sqlx::{SqliteConnection, SqlitePool};

pub async fn insert(
    conn: &mut SqliteConnection,
    catalogue_id: i64,
    name: &str,
    now: i64,
) -> Result<Category, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO categories (catalogue_id, name, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(catalogue_id)
    .bind(name)
    .bind(now)
    .fetch_one(conn)
    .await?;

    Ok(Category {
        id,
        catalogue_id,
        name: name.to_string(),
        created_at: now,
    })
}

/// Create-or-fetch in one step. The UNIQUE(catalogue_id, name) constraint
/// absorbs concurrent inserts of the same name: whichever insert loses the
/// race is a no-op and the follow-up select returns the surviving row.
pub async fn find_or_create(
    conn: &mut SqliteConnection,
    catalogue_id: i64,
    name: &str,
    now: i64,
) -> Result<Category, sqlx::Error> {
    sqlx::query(
        "INSERT INTO categories (catalogue_id, name, created_at) VALUES (?, ?, ?) \
         ON CONFLICT (catalogue_id, name) DO NOTHING",
    )
    .bind(catalogue_id)
    .bind(name)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    sqlx::query_as::<_, Category>(
        "SELECT id, catalogue_id, name, created_at FROM categories WHERE catalogue_id = ? AND name = ?",
    )
    .bind(catalogue_id)
    .bind(name)
    .fetch_one(conn)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, catalogue_id, name, created_at FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_catalogue(
    pool: &SqlitePool,
    catalogue_id: i64,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, catalogue_id, name, created_at FROM categories WHERE catalogue_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(catalogue_id)
    .fetch_all(pool)
    .await
}

pub async fn list_for_product(
    pool: &SqlitePool,
    product_id: i64,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT c.id, c.catalogue_id, c.name, c.created_at FROM categories c \
         JOIN product_categories pc ON pc.category_id = c.id WHERE pc.product_id = ? ORDER BY c.id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await
}

/// (product_id, category) pairs for every product in a catalogue.
pub async fn list_links_by_catalogue(
    pool: &SqlitePool,
    catalogue_id: i64,
) -> Result<Vec<(i64, Category)>, sqlx::Error> {
    #[derive(sqlx::FromRow)]
    struct LinkRow {
        product_id: i64,
        #[sqlx(flatten)]
        category: Category,
    }

    let rows = sqlx::query_as::<_, LinkRow>(
        "SELECT pc.product_id, c.id, c.catalogue_id, c.name, c.created_at FROM product_categories pc \
         JOIN categories c ON c.id = pc.category_id \
         JOIN products p ON p.id = pc.product_id WHERE p.catalogue_id = ? ORDER BY c.id",
    )
    .bind(catalogue_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| (r.product_id, r.category)).collect())
}

pub async fn delete_links_for_product(
    conn: &mut SqliteConnection,
    product_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM product_categories WHERE product_id = ?")
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn link_product(
    conn: &mut SqliteConnection,
    product_id: i64,
    category_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO product_categories (product_id, category_id) VALUES (?, ?) \
         ON CONFLICT (product_id, category_id) DO NOTHING",
    )
    .bind(product_id)
    .bind(category_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Delete a category and its product links.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM product_categories WHERE category_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{catalogue, test_pool};
    use shared::models::ContactMethod;

    async fn seed_catalogue(pool: &SqlitePool) -> i64 {
        catalogue::insert(
            pool,
            "user-1",
            "acme",
            "Acme",
            &ContactMethod::Whatsapp("+50688990011".into()),
            "",
            1000,
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn find_or_create_is_idempotent() {
        let pool = test_pool().await;
        let cat_id = seed_catalogue(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let first = find_or_create(&mut conn, cat_id, "tops", 2000).await.unwrap();
        let second = find_or_create(&mut conn, cat_id, "tops", 3000).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.created_at, 2000);
    }

    #[tokio::test]
    async fn names_collide_case_insensitively() {
        let pool = test_pool().await;
        let cat_id = seed_catalogue(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let lower = find_or_create(&mut conn, cat_id, "tops", 2000).await.unwrap();
        let upper = find_or_create(&mut conn, cat_id, "TOPS", 3000).await.unwrap();
        assert_eq!(lower.id, upper.id);

        let err = insert(&mut conn, cat_id, "Tops", 4000).await.unwrap_err();
        match err {
            sqlx::Error::Database(db) => assert!(db.is_unique_violation()),
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn same_name_allowed_across_catalogues() {
        let pool = test_pool().await;
        let first = seed_catalogue(&pool).await;
        let second = catalogue::insert(
            &pool,
            "user-2",
            "other",
            "Other",
            &ContactMethod::Link("https://other.cr".into()),
            "",
            1000,
        )
        .await
        .unwrap()
        .id;

        let mut conn = pool.acquire().await.unwrap();
        let a = find_or_create(&mut conn, first, "tops", 2000).await.unwrap();
        let b = find_or_create(&mut conn, second, "tops", 2000).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn delete_removes_links() {
        let pool = test_pool().await;
        let cat_id = seed_catalogue(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let category = find_or_create(&mut conn, cat_id, "tops", 2000).await.unwrap();
        let product_id = crate::db::product::insert(
            &mut conn, cat_id, "Shirt", 10.0, "USD", None, "ACTIVE", 2000,
        )
        .await
        .unwrap();
        link_product(&mut conn, product_id, category.id).await.unwrap();
        delete(&mut conn, category.id).await.unwrap();
        drop(conn);

        assert!(find_by_id(&pool, category.id).await.unwrap().is_none());
        assert!(list_for_product(&pool, product_id).await.unwrap().is_empty());
    }
}
