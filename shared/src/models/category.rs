//! Category model

use serde::{Deserialize, Serialize};

/// Category entity — a named tag grouping products within one catalogue
///
/// Names are unique per catalogue, case-insensitively. The reconciler
/// stores them normalized (trimmed, lowercased); categories created
/// explicitly keep the caller's casing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub catalogue_id: i64,
    pub name: String,
    pub created_at: i64,
}

/// Create category payload (explicit creation, outside reconciliation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    /// Slug of the catalogue the category belongs to
    pub catalogue_slug: String,
    pub name: String,
}
