//! Shared types for the Vitrina storefront platform
//!
//! Common types used by the server crate: error codes and the unified
//! `AppError` / `ApiResponse` structures, entity models, and small
//! utility helpers.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};
