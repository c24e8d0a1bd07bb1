//! Catalogue model and the contact-method invariant
//!
//! A catalogue advertises exactly one way for buyers to reach the
//! seller. The channel is a tagged enum, so "exactly one contact field
//! is populated" holds by construction instead of being re-checked on
//! every write.

use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};

/// The channel through which buyers contact the seller
///
/// Serialized as `{ "method": "WHATSAPP", "value": "+50688990011" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "value")]
pub enum ContactMethod {
    /// WhatsApp number (digits and `+` only)
    #[serde(rename = "WHATSAPP")]
    Whatsapp(String),
    /// Instagram handle
    #[serde(rename = "INSTAGRAM")]
    Instagram(String),
    /// Facebook profile/page URL
    #[serde(rename = "FACEBOOK")]
    Facebook(String),
    /// Generic store link
    #[serde(rename = "LINK")]
    Link(String),
}

impl ContactMethod {
    /// Build and validate a contact method from the flat request fields.
    ///
    /// This is the single validate-then-normalize step: the field
    /// matching `method` must be present and non-empty (the error names
    /// the missing field); all non-matching fields are dropped because
    /// only the selected value is kept at all.
    pub fn from_parts(
        method: &str,
        whatsapp_number: Option<&str>,
        instagram_username: Option<&str>,
        facebook_url: Option<&str>,
        store_link: Option<&str>,
    ) -> AppResult<Self> {
        match method {
            "WHATSAPP" => {
                let number = required_field(whatsapp_number, "whatsapp_number")?;
                if !number.chars().all(|c| c.is_ascii_digit() || c == '+') {
                    return Err(AppError::validation(
                        "whatsapp_number must contain only digits or +",
                    )
                    .with_detail("field", "whatsapp_number"));
                }
                Ok(Self::Whatsapp(number))
            }
            "INSTAGRAM" => {
                let handle = required_field(instagram_username, "instagram_username")?;
                Ok(Self::Instagram(handle.trim_start_matches('@').to_string()))
            }
            "FACEBOOK" => {
                let url = required_field(facebook_url, "facebook_url")?;
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(AppError::validation(
                        "facebook_url must be a valid URL (e.g. https://...)",
                    )
                    .with_detail("field", "facebook_url"));
                }
                Ok(Self::Facebook(url))
            }
            "LINK" => {
                let link = required_field(store_link, "store_link")?;
                // Accept bare domains, as the original store-link input did
                let link = if link.starts_with("http://") || link.starts_with("https://") {
                    link
                } else {
                    format!("https://{link}")
                };
                Ok(Self::Link(link))
            }
            other => Err(
                AppError::with_message(ErrorCode::InvalidRequest, "Invalid contact method")
                    .with_detail("contact_method", other),
            ),
        }
    }

    /// Reconstruct from the persisted (tag, value) pair
    pub fn from_storage(method: &str, value: &str) -> AppResult<Self> {
        match method {
            "WHATSAPP" => Ok(Self::Whatsapp(value.to_string())),
            "INSTAGRAM" => Ok(Self::Instagram(value.to_string())),
            "FACEBOOK" => Ok(Self::Facebook(value.to_string())),
            "LINK" => Ok(Self::Link(value.to_string())),
            other => Err(AppError::internal(format!(
                "unknown contact method in storage: {other}"
            ))),
        }
    }

    /// Storage tag for this method
    pub fn method(&self) -> &'static str {
        match self {
            Self::Whatsapp(_) => "WHATSAPP",
            Self::Instagram(_) => "INSTAGRAM",
            Self::Facebook(_) => "FACEBOOK",
            Self::Link(_) => "LINK",
        }
    }

    /// The stored contact value
    pub fn value(&self) -> &str {
        match self {
            Self::Whatsapp(v) | Self::Instagram(v) | Self::Facebook(v) | Self::Link(v) => v,
        }
    }

    /// Derived, read-time deep link buyers can follow
    pub fn contact_link(&self) -> String {
        match self {
            Self::Whatsapp(number) => {
                let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
                format!("https://wa.me/{digits}")
            }
            Self::Instagram(handle) => format!("https://instagram.com/{handle}"),
            Self::Facebook(url) | Self::Link(url) => url.clone(),
        }
    }
}

fn required_field(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("{field} is required for this contact method"),
        )
        .with_detail("field", field)),
    }
}

/// Catalogue entity — one seller's storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogue {
    pub id: i64,
    /// URL-facing identifier, unique across all catalogues
    pub slug: String,
    pub business_name: String,
    pub contact: ContactMethod,
    /// Public URL of the store image, empty when none was uploaded
    #[serde(default)]
    pub store_image_url: String,
    pub owner_user_id: String,
    pub created_at: i64,
}

/// Create catalogue payload (flat request fields, validated into [`ContactMethod`])
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogueCreate {
    pub slug: String,
    pub business_name: String,
    pub contact_method: String,
    pub whatsapp_number: Option<String>,
    pub instagram_username: Option<String>,
    pub facebook_url: Option<String>,
    pub store_link: Option<String>,
}

/// Update catalogue payload — every field optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogueUpdate {
    pub slug: Option<String>,
    pub business_name: Option<String>,
    pub contact_method: Option<String>,
    pub whatsapp_number: Option<String>,
    pub instagram_username: Option<String>,
    pub facebook_url: Option<String>,
    pub store_link: Option<String>,
}

impl CatalogueUpdate {
    /// Validate the contact fields into a [`ContactMethod`], if the
    /// update carries one.
    pub fn contact(&self) -> AppResult<Option<ContactMethod>> {
        match &self.contact_method {
            None => Ok(None),
            Some(method) => ContactMethod::from_parts(
                method,
                self.whatsapp_number.as_deref(),
                self.instagram_username.as_deref(),
                self.facebook_url.as_deref(),
                self.store_link.as_deref(),
            )
            .map(Some),
        }
    }
}

impl CatalogueCreate {
    /// Validate the contact fields into a [`ContactMethod`]
    pub fn contact(&self) -> AppResult<ContactMethod> {
        ContactMethod::from_parts(
            &self.contact_method,
            self.whatsapp_number.as_deref(),
            self.instagram_username.as_deref(),
            self.facebook_url.as_deref(),
            self.store_link.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whatsapp_requires_number() {
        let err = ContactMethod::from_parts("WHATSAPP", None, Some("ignored"), None, None)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(err.details.unwrap()["field"], "whatsapp_number");
    }

    #[test]
    fn whatsapp_rejects_non_numeric() {
        let err =
            ContactMethod::from_parts("WHATSAPP", Some("call me"), None, None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn only_matching_field_is_kept() {
        // Payload carries every field; only the WHATSAPP one survives
        let contact = ContactMethod::from_parts(
            "WHATSAPP",
            Some("+50688990011"),
            Some("acme"),
            Some("https://facebook.com/acme"),
            Some("https://acme.cr"),
        )
        .unwrap();
        assert_eq!(contact, ContactMethod::Whatsapp("+50688990011".into()));
    }

    #[test]
    fn instagram_handle_is_normalized() {
        let contact =
            ContactMethod::from_parts("INSTAGRAM", None, Some("@acme "), None, None).unwrap();
        assert_eq!(contact, ContactMethod::Instagram("acme".into()));
        assert_eq!(contact.contact_link(), "https://instagram.com/acme");
    }

    #[test]
    fn link_gets_https_prefix() {
        let contact = ContactMethod::from_parts("LINK", None, None, None, Some("acme.cr")).unwrap();
        assert_eq!(contact, ContactMethod::Link("https://acme.cr".into()));
    }

    #[test]
    fn facebook_requires_url_shape() {
        let err =
            ContactMethod::from_parts("FACEBOOK", None, None, Some("acme page"), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn unknown_method_rejected() {
        let err = ContactMethod::from_parts("PIGEON", None, None, None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[test]
    fn whatsapp_link_is_digits_only() {
        let contact = ContactMethod::Whatsapp("+506 8899-0011".into());
        assert_eq!(contact.contact_link(), "https://wa.me/50688990011");
    }

    #[test]
    fn storage_roundtrip() {
        let contact = ContactMethod::Facebook("https://facebook.com/acme".into());
        let restored =
            ContactMethod::from_storage(contact.method(), contact.value()).unwrap();
        assert_eq!(contact, restored);
    }

    #[test]
    fn serde_shape_is_tagged() {
        let contact = ContactMethod::Whatsapp("+50688990011".into());
        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["method"], "WHATSAPP");
        assert_eq!(json["value"], "+50688990011");
    }
}
