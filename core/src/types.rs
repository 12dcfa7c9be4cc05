//! Domain DTOs for the menu API.
//!
//! # Design
//! These types mirror the backend's camelCase JSON schema but are defined
//! independently from the mock-server crate; integration tests catch schema
//! drift. Read models (`Item`, `Category`, ...) are tolerant of missing
//! optional fields, write payloads (`*Payload`) only carry what the backend
//! accepts.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;
use crate::options::OptionType;

/// A size/price permutation of an item, e.g. a 33 cm pizza.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemVariant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub variant_name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Option metadata attached to an item. `option_value` is JSON text:
/// `["Lait","Soja"]` for ALLERGENES, `"Oui"` for VEGETARIENNE.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub option_type: OptionType,
    #[serde(deserialize_with = "encoded_json")]
    pub option_value: String,
}

/// Accept `optionValue` either as JSON text or as an already-decoded JSON
/// value; the latter is re-encoded so callers always see text.
fn encoded_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

/// Read an explicit JSON `null` as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

/// A menu product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: Vec<ItemVariant>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<ItemImage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<ItemOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_status() -> String {
    "Active".to_string()
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub items: u32,
}

/// A menu category. Main categories have no `parent_id`; `children` is
/// only populated by the single-category endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Category>,
    #[serde(rename = "_count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<CategoryCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Category {
    pub fn item_count(&self) -> u32 {
        self.count.map(|c| c.items).unwrap_or(0)
    }
}

/// A promotional event or header announcement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_promo: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub show_in_header: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slogan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uber_eats_url: Option<String>,
}

/// Header ticker entry returned by `GET /events/header`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    pub description: String,
}

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariantPayload {
    pub variant_name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub image_url: String,
    pub is_default: bool,
}

/// Options are sent decoded: an array for ALLERGENES/BASE, a scalar for
/// VEGETARIENNE.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionPayload {
    pub option_type: OptionType,
    pub option_value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_id: String,
    pub status: String,
    pub variants: Vec<VariantPayload>,
    pub images: Vec<ImagePayload>,
    pub options: Vec<OptionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub display_order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub status: String,
    pub is_promo: bool,
    pub show_in_header: bool,
}

fn require_name(name: &str, what: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation(format!("{what} must have a name")));
    }
    Ok(())
}

impl ItemPayload {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_name(&self.name, "item")?;
        if self.category_id.trim().is_empty() {
            return Err(ApiError::Validation("item must belong to a category".to_string()));
        }
        Ok(())
    }
}

impl CategoryPayload {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_name(&self.name, "category")
    }
}

impl EventPayload {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_name(&self.name, "event")
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// `refresh_token` is present only when the backend rotates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfTokenResponse {
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_accepts_decoded_option_values() {
        let json = r#"{
            "id": "i1",
            "name": "Margherita",
            "categoryId": "c1",
            "options": [
                {"optionType": "ALLERGENES", "optionValue": ["Lait", "Soja"]},
                {"optionType": "VEGETARIENNE", "optionValue": "\"Oui\""}
            ]
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.status, "Active");
        assert_eq!(item.options[0].option_value, r#"["Lait","Soja"]"#);
        assert_eq!(item.options[1].option_value, r#""Oui""#);
        assert!(item.variants.is_empty());
    }

    #[test]
    fn null_fields_read_as_empty() {
        let json = r#"{"id":"c1","name":"Pizzas","description":null,"imageUrl":null,
            "displayOrder":null,"parentId":null,"children":null}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.description, "");
        assert_eq!(category.display_order, 0);
        assert!(category.children.is_empty());

        let json = r#"{"id":"e1","name":"Soirée","description":null,"images":null,
            "isPromo":null,"showInHeader":true}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.description, "");
        assert!(event.images.is_empty());
        assert!(!event.is_promo);
        assert!(event.show_in_header);

        let json = r#"{"id":"i1","name":"Reine","categoryId":"c1","variants":null,
            "images":null,"options":null}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.variants.is_empty() && item.images.is_empty() && item.options.is_empty());
    }

    #[test]
    fn category_reads_item_count() {
        let json = r#"{"id":"c1","name":"Pizzas","displayOrder":2,"_count":{"items":7}}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.item_count(), 7);
        assert!(category.parent_id.is_none());
        assert!(category.children.is_empty());
    }

    #[test]
    fn item_payload_omits_missing_description() {
        let payload = ItemPayload {
            name: "Reine".to_string(),
            description: None,
            category_id: "c1".to_string(),
            status: "Active".to_string(),
            variants: vec![],
            images: vec![],
            options: vec![],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["categoryId"], "c1");
    }

    #[test]
    fn payload_validation_requires_name_and_category() {
        let mut payload = ItemPayload {
            name: "  ".to_string(),
            description: None,
            category_id: "c1".to_string(),
            status: "Active".to_string(),
            variants: vec![],
            images: vec![],
            options: vec![],
        };
        assert!(matches!(payload.validate(), Err(ApiError::Validation(_))));
        payload.name = "Reine".to_string();
        payload.category_id = String::new();
        assert!(matches!(payload.validate(), Err(ApiError::Validation(_))));
        payload.category_id = "c1".to_string();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn refresh_response_without_rotation() {
        let resp: RefreshResponse = serde_json::from_str(r#"{"access_token":"a2"}"#).unwrap();
        assert_eq!(resp.access_token, "a2");
        assert!(resp.refresh_token.is_none());
    }
}
