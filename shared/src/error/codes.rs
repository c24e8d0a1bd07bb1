//! Unified error codes for the Vitrina platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Catalogue errors
//! - 4xxx: Product errors
//! - 5xxx: Category errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient
/// serialization and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Catalogue ====================
    /// Catalogue not found
    CatalogueNotFound = 3001,
    /// Catalogue slug is already taken
    SlugTaken = 3002,

    // ==================== 4xxx: Product ====================
    /// Product not found
    ProductNotFound = 4001,
    /// At least one image is required
    ImageRequired = 4002,
    /// Image count limit exceeded
    ImageLimitExceeded = 4003,
    /// Image file failed validation (type or size)
    ImageInvalid = 4004,

    // ==================== 5xxx: Category ====================
    /// Category not found
    CategoryNotFound = 5001,
    /// Category name already exists in this catalogue
    CategoryNameExists = 5002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Object storage error
    StorageError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default human-readable message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::RequiredField => "Required field missing",

            Self::NotAuthenticated => "Not authenticated",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Token is invalid",

            Self::PermissionDenied => "Permission denied",

            Self::CatalogueNotFound => "Catalogue not found",
            Self::SlugTaken => "Catalogue slug is already taken",

            Self::ProductNotFound => "Product not found",
            Self::ImageRequired => "At least one image is required",
            Self::ImageLimitExceeded => "Image count limit exceeded",
            Self::ImageInvalid => "Invalid image file",

            Self::CategoryNotFound => "Category not found",
            Self::CategoryNameExists => "Category name already exists",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::StorageError => "Object storage error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.message())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            4 => Ok(Self::AlreadyExists),
            5 => Ok(Self::InvalidRequest),
            7 => Ok(Self::RequiredField),
            1001 => Ok(Self::NotAuthenticated),
            1003 => Ok(Self::TokenExpired),
            1004 => Ok(Self::TokenInvalid),
            2001 => Ok(Self::PermissionDenied),
            3001 => Ok(Self::CatalogueNotFound),
            3002 => Ok(Self::SlugTaken),
            4001 => Ok(Self::ProductNotFound),
            4002 => Ok(Self::ImageRequired),
            4003 => Ok(Self::ImageLimitExceeded),
            4004 => Ok(Self::ImageInvalid),
            5001 => Ok(Self::CategoryNotFound),
            5002 => Ok(Self::CategoryNameExists),
            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::DatabaseError),
            9003 => Ok(Self::StorageError),
            other => Err(InvalidErrorCode(other)),
        }
    }
}
