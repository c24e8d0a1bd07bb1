//! API routes

pub mod catalogue;
pub mod category;
pub mod health;
pub mod product;

use crate::auth::auth_middleware;
use crate::services::images::ImageFile;
use crate::state::AppState;
use axum::extract::Multipart;
use axum::routing::{delete, get, patch, post};
use axum::{Router, middleware};
use shared::error::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;
use tower_http::trace::TraceLayer;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Buyer-facing storefront (no auth)
    let storefront = Router::new()
        .route("/api/storefront/{slug}", get(catalogue::get_by_slug))
        .route(
            "/api/storefront/{slug}/products",
            get(product::list_by_catalogue_slug),
        );

    // Seller management API (JWT authenticated)
    let management = Router::new()
        .route("/api/catalogues", post(catalogue::create))
        .route("/api/catalogues/me", get(catalogue::list_mine))
        .route(
            "/api/catalogues/{id}",
            patch(catalogue::update).delete(catalogue::remove),
        )
        .route("/api/products", post(product::create))
        .route(
            "/api/products/{id}",
            get(product::get).patch(product::update).delete(product::remove),
        )
        .route("/api/products/{id}/images", delete(product::delete_image))
        .route("/api/categories", post(category::create))
        .route(
            "/api/categories/by-catalogue/{slug}",
            get(category::list_by_catalogue_slug),
        )
        .route("/api/categories/{id}", delete(category::remove))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(storefront)
        .merge(management)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A fully-read multipart form: repeated text fields plus uploaded files.
#[derive(Default)]
pub(crate) struct MultipartForm {
    fields: HashMap<String, Vec<String>>,
    pub files: Vec<ImageFile>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn texts(&self, name: &str) -> Vec<String> {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn require(&self, name: &str) -> AppResult<&str> {
        self.text(name).ok_or_else(|| {
            AppError::with_message(ErrorCode::RequiredField, format!("{name} is required"))
                .with_detail("field", name)
        })
    }

    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> AppResult<Option<T>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
                AppError::with_message(
                    ErrorCode::InvalidRequest,
                    format!("invalid value for {name}"),
                )
                .with_detail("field", name)
            }),
        }
    }

    pub fn require_parsed<T: std::str::FromStr>(&self, name: &str) -> AppResult<T> {
        self.require(name)?;
        self.parse(name)?.ok_or_else(|| {
            AppError::with_message(ErrorCode::RequiredField, format!("{name} is required"))
        })
    }
}

/// Drain a multipart stream into memory. Parts with a filename become
/// files; everything else is collected as repeatable text fields.
pub(crate) async fn read_multipart(mut multipart: Multipart) -> AppResult<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("malformed multipart body: {e}"))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name().map(str::to_string) {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(|e| {
                AppError::with_message(
                    ErrorCode::InvalidRequest,
                    format!("failed to read uploaded file: {e}"),
                )
            })?;
            form.files.push(ImageFile {
                filename,
                content_type,
                data: data.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(|e| {
                AppError::with_message(
                    ErrorCode::InvalidRequest,
                    format!("failed to read field {name}: {e}"),
                )
            })?;
            form.fields.entry(name).or_default().push(value);
        }
    }

    Ok(form)
}
