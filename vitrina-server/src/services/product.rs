//! Product management: scalar writes, the image pipeline and category
//! reconciliation, composed into one transaction per mutation.
//!
//! Uploads happen before the transaction opens; if any upload fails the
//! rows are never touched. Bulk object deletion happens before row
//! deletion, so a storage outage leaves the product intact rather than
//! leaking orphaned objects.

use crate::config::Config;
use crate::db;
use crate::error::ServiceResult;
use crate::services::category::reconcile_product_categories;
use crate::services::images::{self, ImageFile};
use crate::services::storage::ObjectStorage;
use shared::error::{AppError, ErrorCode};
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::util::now_millis;
use sqlx::SqlitePool;
use std::collections::HashMap;

fn validate_scalars(name: &str, price: f64) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::validation("name must not be empty").with_detail("field", "name"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation("price must be non-negative").with_detail("field", "price"));
    }
    Ok(())
}

/// Validate every file up front, then transcode and upload. Returns the
/// public URLs in input order.
async fn upload_images(
    storage: &dyn ObjectStorage,
    config: &Config,
    files: &[ImageFile],
) -> ServiceResult<Vec<String>> {
    for file in files {
        images::validate(file, config.max_image_bytes)?;
    }

    let mut urls = Vec::with_capacity(files.len());
    for file in files {
        let processed = images::process(&file.data)?;
        let path = images::storage_path("products", &file.filename);
        let url = storage
            .upload(processed, &path)
            .await
            .map_err(|e| AppError::storage(format!("image upload failed: {e}")))?;
        urls.push(url);
    }
    Ok(urls)
}

pub async fn create(
    pool: &SqlitePool,
    storage: &dyn ObjectStorage,
    config: &Config,
    user_id: &str,
    payload: ProductCreate,
    files: Vec<ImageFile>,
) -> ServiceResult<Product> {
    let name = payload.name.trim().to_string();
    validate_scalars(&name, payload.price)?;

    let catalogue = db::catalogue::find_by_id(pool, payload.catalogue_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CatalogueNotFound))?;
    if catalogue.owner_user_id != user_id {
        return Err(AppError::permission_denied("catalogue belongs to another user").into());
    }

    if files.is_empty() {
        return Err(AppError::new(ErrorCode::ImageRequired).into());
    }
    if files.len() > config.max_images_per_product {
        return Err(AppError::new(ErrorCode::ImageLimitExceeded)
            .with_detail("limit", config.max_images_per_product as u64)
            .into());
    }

    let urls = upload_images(storage, config, &files).await?;

    let now = now_millis();
    let mut tx = pool.begin().await?;
    let product_id = db::product::insert(
        &mut *tx,
        catalogue.id,
        &name,
        payload.price,
        payload.currency.as_str(),
        payload.details.as_deref(),
        payload.status.as_str(),
        now,
    )
    .await?;
    db::product::insert_images(&mut *tx, product_id, &urls, now).await?;
    reconcile_product_categories(&mut *tx, catalogue.id, product_id, &payload.category_names)
        .await?;
    tx.commit().await?;

    tracing::info!(product_id, catalogue_id = catalogue.id, "Product created");
    load_product(pool, product_id).await
}

pub async fn get(pool: &SqlitePool, product_id: i64, user_id: &str) -> ServiceResult<Product> {
    let (product, owner) = db::product::find_with_owner(pool, product_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    if owner != user_id {
        return Err(AppError::permission_denied("product belongs to another user").into());
    }
    load_product(pool, product.id).await
}

pub async fn update(
    pool: &SqlitePool,
    storage: &dyn ObjectStorage,
    config: &Config,
    product_id: i64,
    user_id: &str,
    payload: ProductUpdate,
    files: Vec<ImageFile>,
) -> ServiceResult<Product> {
    let (mut product, owner) = db::product::find_with_owner(pool, product_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    if owner != user_id {
        return Err(AppError::permission_denied("product belongs to another user").into());
    }

    if let Some(name) = payload.name {
        product.name = name.trim().to_string();
    }
    if let Some(price) = payload.price {
        product.price = price;
    }
    validate_scalars(&product.name, product.price)?;
    if let Some(currency) = payload.currency {
        product.currency = currency;
    }
    if let Some(details) = payload.details {
        product.details = Some(details);
    }
    if let Some(status) = payload.status {
        product.status = status;
    }

    let existing = db::product::count_images(pool, product_id).await? as usize;
    if existing + files.len() > config.max_images_per_product {
        return Err(AppError::new(ErrorCode::ImageLimitExceeded)
            .with_detail("limit", config.max_images_per_product as u64)
            .with_detail("existing", existing as u64)
            .into());
    }

    let urls = upload_images(storage, config, &files).await?;

    let now = now_millis();
    let mut tx = pool.begin().await?;
    db::product::update_scalars(
        &mut *tx,
        product_id,
        &product.name,
        product.price,
        product.currency.as_str(),
        product.details.as_deref(),
        product.status.as_str(),
    )
    .await?;
    db::product::insert_images(&mut *tx, product_id, &urls, now).await?;
    reconcile_product_categories(
        &mut *tx,
        product.catalogue_id,
        product_id,
        &payload.category_names,
    )
    .await?;
    tx.commit().await?;

    load_product(pool, product_id).await
}

/// Delete a product: storage objects first, rows second. A failed bulk
/// delete aborts before any row is touched.
pub async fn delete(
    pool: &SqlitePool,
    storage: &dyn ObjectStorage,
    product_id: i64,
    user_id: &str,
) -> ServiceResult<()> {
    let (_, owner) = db::product::find_with_owner(pool, product_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    if owner != user_id {
        return Err(AppError::permission_denied("product belongs to another user").into());
    }

    let images = db::product::list_images(pool, product_id).await?;
    let paths: Vec<String> = images
        .iter()
        .filter_map(|i| storage.url_to_path(&i.url))
        .collect();
    storage
        .delete(&paths)
        .await
        .map_err(|e| AppError::storage(format!("image deletion failed: {e}")))?;

    let mut tx = pool.begin().await?;
    db::product::delete_rows(&mut *tx, product_id).await?;
    tx.commit().await?;

    tracing::info!(product_id, "Product deleted");
    Ok(())
}

/// Detach a single image by URL, removing exactly one row and its object.
pub async fn delete_image(
    pool: &SqlitePool,
    storage: &dyn ObjectStorage,
    product_id: i64,
    user_id: &str,
    url: &str,
) -> ServiceResult<()> {
    let (_, owner) = db::product::find_with_owner(pool, product_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    if owner != user_id {
        return Err(AppError::permission_denied("product belongs to another user").into());
    }

    let images = db::product::list_images(pool, product_id).await?;
    if !images.iter().any(|i| i.url == url) {
        return Err(AppError::not_found("product image").into());
    }

    if let Some(path) = storage.url_to_path(url) {
        storage
            .delete(&[path])
            .await
            .map_err(|e| AppError::storage(format!("image deletion failed: {e}")))?;
    }

    let mut conn = pool.acquire().await?;
    db::product::delete_image(&mut conn, product_id, url).await?;

    Ok(())
}

/// Public product listing for a storefront.
pub async fn list_by_catalogue_slug(pool: &SqlitePool, slug: &str) -> ServiceResult<Vec<Product>> {
    let catalogue = db::catalogue::find_by_slug(pool, slug)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CatalogueNotFound))?;
    load_catalogue_products(pool, catalogue.id).await
}

/// All products of a catalogue with images and categories attached,
/// three queries total.
pub(crate) async fn load_catalogue_products(
    pool: &SqlitePool,
    catalogue_id: i64,
) -> ServiceResult<Vec<Product>> {
    let mut products = db::product::list_by_catalogue(pool, catalogue_id).await?;

    let mut images_by_product: HashMap<i64, Vec<_>> = HashMap::new();
    for image in db::product::list_images_by_catalogue(pool, catalogue_id).await? {
        images_by_product.entry(image.product_id).or_default().push(image);
    }

    let mut categories_by_product: HashMap<i64, Vec<_>> = HashMap::new();
    for (product_id, category) in db::category::list_links_by_catalogue(pool, catalogue_id).await? {
        categories_by_product.entry(product_id).or_default().push(category);
    }

    for product in &mut products {
        product.images = images_by_product.remove(&product.id).unwrap_or_default();
        product.categories = categories_by_product.remove(&product.id).unwrap_or_default();
    }

    Ok(products)
}

async fn load_product(pool: &SqlitePool, product_id: i64) -> ServiceResult<Product> {
    let mut product = db::product::find_by_id(pool, product_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    product.images = db::product::list_images(pool, product_id).await?;
    product.categories = db::category::list_for_product(pool, product_id).await?;
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::services::images::tests::png_file;
    use crate::services::storage::test_support::{FailingStorage, MemoryStorage};
    use shared::models::{ContactMethod, Currency, ProductStatus};

    async fn seed_catalogue(pool: &SqlitePool, slug: &str, owner: &str) -> i64 {
        db::catalogue::insert(
            pool,
            owner,
            slug,
            "Acme",
            &ContactMethod::Whatsapp("+50688990011".into()),
            "",
            1000,
        )
        .await
        .unwrap()
        .id
    }

    fn payload(catalogue_id: i64) -> ProductCreate {
        ProductCreate {
            catalogue_id,
            name: "Mug".into(),
            price: 12.5,
            currency: Currency::USD,
            details: Some("ceramic".into()),
            status: ProductStatus::default(),
            category_names: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_with_images_and_folded_categories() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let mut p = payload(cat_id);
        p.category_names = vec!["Tops".into(), "tops ".into()];

        let product = create(
            &pool,
            &storage,
            &config,
            "user-1",
            p,
            vec![png_file("front.png"), png_file("back.png")],
        )
        .await
        .unwrap();

        assert_eq!(product.images.len(), 2);
        assert!(product.images.iter().all(|i| i.url.starts_with("mem://assets/products/")));
        assert_eq!(storage.len(), 2);

        // duplicate names folded into a single category
        assert_eq!(product.categories.len(), 1);
        assert_eq!(product.categories[0].name, "tops");
        assert_eq!(product.status, ProductStatus::Active);
    }

    #[tokio::test]
    async fn create_requires_at_least_one_image() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let err = create(&pool, &storage, &config, "user-1", payload(cat_id), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ImageRequired));
    }

    #[tokio::test]
    async fn create_enforces_image_limit() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let files: Vec<_> = (0..6).map(|i| png_file(&format!("{i}.png"))).collect();
        let err = create(&pool, &storage, &config, "user-1", payload(cat_id), files)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ImageLimitExceeded));
        assert_eq!(storage.len(), 0);
    }

    #[tokio::test]
    async fn create_checks_catalogue_ownership() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let err = create(
            &pool,
            &storage,
            &config,
            "intruder",
            payload(cat_id),
            vec![png_file("a.png")],
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::PermissionDenied));
        assert_eq!(storage.len(), 0);
    }

    #[tokio::test]
    async fn create_rejects_invalid_file_before_any_upload() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let bad = ImageFile {
            filename: "doc.pdf".into(),
            content_type: "application/pdf".into(),
            data: b"%PDF-".to_vec(),
        };
        let err = create(
            &pool,
            &storage,
            &config,
            "user-1",
            payload(cat_id),
            vec![png_file("ok.png"), bad],
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::ImageInvalid));
        // the valid sibling was not uploaded either
        assert_eq!(storage.len(), 0);
        assert!(db::product::list_by_catalogue(&pool, cat_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_negative_price() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let mut p = payload(cat_id);
        p.price = -5.0;
        let err = create(&pool, &storage, &config, "user-1", p, vec![png_file("a.png")])
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ValidationFailed));
    }

    #[tokio::test]
    async fn update_appends_images_and_replaces_categories() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let mut p = payload(cat_id);
        p.category_names = vec!["tops".into()];
        let product = create(&pool, &storage, &config, "user-1", p, vec![png_file("a.png")])
            .await
            .unwrap();

        let updated = update(
            &pool,
            &storage,
            &config,
            product.id,
            "user-1",
            ProductUpdate {
                price: Some(20.0),
                status: Some(ProductStatus::SoldOut),
                category_names: vec!["dresses".into()],
                ..Default::default()
            },
            vec![png_file("b.png")],
        )
        .await
        .unwrap();

        assert_eq!(updated.price, 20.0);
        assert_eq!(updated.status, ProductStatus::SoldOut);
        assert_eq!(updated.name, "Mug");
        assert_eq!(updated.images.len(), 2);
        assert_eq!(updated.categories.len(), 1);
        assert_eq!(updated.categories[0].name, "dresses");
    }

    #[tokio::test]
    async fn update_with_empty_categories_clears_links() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let mut p = payload(cat_id);
        p.category_names = vec!["tops".into(), "dresses".into()];
        let product = create(&pool, &storage, &config, "user-1", p, vec![png_file("a.png")])
            .await
            .unwrap();
        assert_eq!(product.categories.len(), 2);

        let updated = update(
            &pool,
            &storage,
            &config,
            product.id,
            "user-1",
            ProductUpdate::default(),
            vec![],
        )
        .await
        .unwrap();

        assert!(updated.categories.is_empty());
        // category rows survive for reuse
        assert_eq!(db::category::list_by_catalogue(&pool, cat_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_enforces_combined_image_limit() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let mut config = Config::for_tests();
        config.max_images_per_product = 3;
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let product = create(
            &pool,
            &storage,
            &config,
            "user-1",
            payload(cat_id),
            vec![png_file("a.png"), png_file("b.png")],
        )
        .await
        .unwrap();

        let err = update(
            &pool,
            &storage,
            &config,
            product.id,
            "user-1",
            ProductUpdate::default(),
            vec![png_file("c.png"), png_file("d.png")],
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ImageLimitExceeded));
        assert_eq!(storage.len(), 2);
    }

    #[tokio::test]
    async fn update_checks_ownership() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let product = create(&pool, &storage, &config, "user-1", payload(cat_id), vec![png_file("a.png")])
            .await
            .unwrap();

        let err = update(
            &pool,
            &storage,
            &config,
            product.id,
            "intruder",
            ProductUpdate::default(),
            vec![],
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::PermissionDenied));
    }

    #[tokio::test]
    async fn delete_removes_rows_and_objects() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let mut p = payload(cat_id);
        p.category_names = vec!["tops".into()];
        let product = create(
            &pool,
            &storage,
            &config,
            "user-1",
            p,
            vec![png_file("a.png"), png_file("b.png")],
        )
        .await
        .unwrap();
        assert_eq!(storage.len(), 2);

        delete(&pool, &storage, product.id, "user-1").await.unwrap();

        assert_eq!(storage.len(), 0);
        assert!(db::product::find_by_id(&pool, product.id).await.unwrap().is_none());
        assert_eq!(db::product::count_images(&pool, product.id).await.unwrap(), 0);
        assert!(db::category::list_for_product(&pool, product.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_aborts_when_storage_fails() {
        let pool = test_pool().await;
        let storage = FailingStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let product = create(
            &pool,
            &storage,
            &config,
            "user-1",
            payload(cat_id),
            vec![png_file("a.png")],
        )
        .await
        .unwrap();

        let err = delete(&pool, &storage, product.id, "user-1").await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::StorageError));

        // rows untouched: the product remains addressable and consistent
        let reloaded = get(&pool, product.id, "user-1").await.unwrap();
        assert_eq!(reloaded.images.len(), 1);
    }

    #[tokio::test]
    async fn delete_image_detaches_exactly_one() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let product = create(
            &pool,
            &storage,
            &config,
            "user-1",
            payload(cat_id),
            vec![png_file("a.png"), png_file("b.png")],
        )
        .await
        .unwrap();

        let victim = product.images[0].url.clone();
        delete_image(&pool, &storage, product.id, "user-1", &victim)
            .await
            .unwrap();

        let reloaded = get(&pool, product.id, "user-1").await.unwrap();
        assert_eq!(reloaded.images.len(), 1);
        assert_ne!(reloaded.images[0].url, victim);
        assert_eq!(storage.len(), 1);

        // detaching an unknown URL is a NotFound, not a silent no-op
        let err = delete_image(&pool, &storage, product.id, "user-1", &victim)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn get_and_list_cover_relations() {
        let pool = test_pool().await;
        let storage = MemoryStorage::default();
        let config = Config::for_tests();
        let cat_id = seed_catalogue(&pool, "acme", "user-1").await;

        let mut p = payload(cat_id);
        p.category_names = vec!["tops".into()];
        let product = create(&pool, &storage, &config, "user-1", p, vec![png_file("a.png")])
            .await
            .unwrap();

        let err = get(&pool, product.id, "intruder").await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::PermissionDenied));

        let listed = list_by_catalogue_slug(&pool, "acme").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].images.len(), 1);
        assert_eq!(listed[0].categories.len(), 1);

        let err = list_by_catalogue_slug(&pool, "missing").await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CatalogueNotFound));
    }
}
