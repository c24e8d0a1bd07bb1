//! Database access layer
//!
//! Plain async functions over `SqlitePool` / `SqliteConnection`. Functions
//! that must compose into a caller's transaction take `&mut SqliteConnection`.

pub mod catalogue;
pub mod category;
pub mod product;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    pool
}
