//! Product model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported price currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    CRC,
    USD,
    MXN,
    COP,
    ARS,
    PEN,
    CLP,
    EUR,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CRC => "CRC",
            Self::USD => "USD",
            Self::MXN => "MXN",
            Self::COP => "COP",
            Self::ARS => "ARS",
            Self::PEN => "PEN",
            Self::CLP => "CLP",
            Self::EUR => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CRC" => Ok(Self::CRC),
            "USD" => Ok(Self::USD),
            "MXN" => Ok(Self::MXN),
            "COP" => Ok(Self::COP),
            "ARS" => Ok(Self::ARS),
            "PEN" => Ok(Self::PEN),
            "CLP" => Ok(Self::CLP),
            "EUR" => Ok(Self::EUR),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

/// Product lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    SoldOut,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::SoldOut => "SOLD_OUT",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "SOLD_OUT" => Ok(Self::SoldOut),
            other => Err(format!("unknown product status: {other}")),
        }
    }
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    /// Owning catalogue
    pub catalogue_id: i64,
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub details: Option<String>,
    pub status: ProductStatus,
    pub created_at: i64,

    // -- Relations (populated by application code) --
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub categories: Vec<super::Category>,
}

/// One stored image asset attached to a product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub url: String,
    pub created_at: i64,
}

/// Create product payload (scalar fields; image files arrive separately)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub catalogue_id: i64,
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub details: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    /// Category names to reconcile onto the product
    #[serde(default)]
    pub category_names: Vec<String>,
}

/// Update product payload
///
/// Category links are fully replaced on every update: an absent or
/// empty list clears them. Images are only ever appended here; removal
/// goes through the dedicated delete-image operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<Currency>,
    pub details: Option<String>,
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub category_names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_parse_roundtrip() {
        for code in ["CRC", "USD", "MXN", "COP", "ARS", "PEN", "CLP", "EUR"] {
            assert_eq!(code.parse::<Currency>().unwrap().as_str(), code);
        }
        assert!("GBP".parse::<Currency>().is_err());
    }

    #[test]
    fn status_serde_uses_screaming_snake() {
        let json = serde_json::to_value(ProductStatus::SoldOut).unwrap();
        assert_eq!(json, "SOLD_OUT");
        assert_eq!("SOLD_OUT".parse::<ProductStatus>().unwrap(), ProductStatus::SoldOut);
    }
}
