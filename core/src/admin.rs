//! Admin CRUD form state and table rows.
//!
//! # Design
//! Each entity gets a form struct holding exactly what the edit dialog
//! shows, a constructor for "add" and one for "edit", and `to_payload`,
//! which sanitises the form into the write payload the backend accepts.
//! Rows are the display-ready columns of the admin tables.

use crate::error::ApiError;
use crate::format::{
    format_date, format_date_for_input, format_date_time, format_price_eur, is_valid_date, parse_date,
};
use crate::menu::{default_image, price_bounds};
use crate::options::{OptionType, OptionValue};
use crate::types::{
    Category, CategoryPayload, Event, EventPayload, ImagePayload, Item, ItemImage, ItemOption,
    ItemPayload, ItemVariant, OptionPayload, VariantPayload,
};

pub const STATUS_ACTIVE: &str = "Active";
pub const STATUS_INACTIVE: &str = "Inactive";

fn blank_variant(name: &str) -> ItemVariant {
    ItemVariant {
        id: None,
        variant_name: name.to_string(),
        price: 0.0,
        sku: Some(String::new()),
    }
}

fn blank_image(is_default: bool) -> ItemImage {
    ItemImage {
        id: None,
        image_url: String::new(),
        is_default,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ItemForm {
    pub name: String,
    pub description: String,
    pub category_id: String,
    pub status: String,
    pub variants: Vec<ItemVariant>,
    pub images: Vec<ItemImage>,
    pub options: Vec<ItemOption>,
}

impl Default for ItemForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category_id: String::new(),
            status: STATUS_ACTIVE.to_string(),
            variants: vec![blank_variant("29cm")],
            images: vec![blank_image(true)],
            options: Vec::new(),
        }
    }
}

impl ItemForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill for editing. Empty lists get one blank row so the dialog
    /// always shows an editable line.
    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone().unwrap_or_default(),
            category_id: item.category_id.clone(),
            status: item.status.clone(),
            variants: if item.variants.is_empty() {
                vec![blank_variant("Standard")]
            } else {
                item.variants.clone()
            },
            images: if item.images.is_empty() {
                vec![blank_image(true)]
            } else {
                item.images.clone()
            },
            options: item.options.clone(),
        }
    }

    pub fn add_variant(&mut self) {
        self.variants.push(blank_variant(""));
    }

    pub fn remove_variant(&mut self, index: usize) {
        if index < self.variants.len() {
            self.variants.remove(index);
        }
    }

    pub fn variant_mut(&mut self, index: usize) -> Option<&mut ItemVariant> {
        self.variants.get_mut(index)
    }

    pub fn add_image(&mut self) {
        self.images.push(blank_image(false));
    }

    pub fn remove_image(&mut self, index: usize) {
        if index < self.images.len() {
            self.images.remove(index);
        }
    }

    pub fn image_mut(&mut self, index: usize) -> Option<&mut ItemImage> {
        self.images.get_mut(index)
    }

    /// Attach an option type with its empty default. No-op when present.
    pub fn add_option(&mut self, option_type: OptionType) {
        if self.options.iter().any(|o| o.option_type == option_type) {
            return;
        }
        self.options.push(ItemOption {
            id: None,
            option_type,
            option_value: option_type.default_encoded().to_string(),
        });
    }

    pub fn remove_option(&mut self, option_type: OptionType) {
        self.options.retain(|o| o.option_type != option_type);
    }

    pub fn option(&self, option_type: OptionType) -> Option<OptionValue> {
        self.options
            .iter()
            .find(|o| o.option_type == option_type)
            .map(|o| OptionValue::decode(&o.option_value))
    }

    /// Radio choice for single-valued options.
    pub fn set_option_value(&mut self, option_type: OptionType, value: &str) {
        if let Some(option) = self.options.iter_mut().find(|o| o.option_type == option_type) {
            option.option_value = OptionValue::One(value.to_string()).encode();
        }
    }

    /// Checkbox toggle for multi-valued options.
    pub fn toggle_option_value(&mut self, option_type: OptionType, value: &str, checked: bool) {
        let Some(option) = self.options.iter_mut().find(|o| o.option_type == option_type) else {
            return;
        };
        let mut values = match OptionValue::decode(&option.option_value) {
            OptionValue::Many(values) => values,
            _ => Vec::new(),
        };
        if checked {
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        } else {
            values.retain(|v| v != value);
        }
        option.option_value = OptionValue::Many(values).encode();
    }

    /// Keep variants with a name and a positive price, images with a URL
    /// and options with a value; options are sent decoded.
    pub fn to_payload(&self) -> Result<ItemPayload, ApiError> {
        let variants = self
            .variants
            .iter()
            .filter(|v| !v.variant_name.trim().is_empty() && v.price > 0.0)
            .map(|v| VariantPayload {
                variant_name: v.variant_name.trim().to_string(),
                price: v.price,
                sku: v.sku.as_deref().and_then(non_empty),
            })
            .collect();
        let images = self
            .images
            .iter()
            .filter(|i| !i.image_url.trim().is_empty())
            .map(|i| ImagePayload {
                image_url: i.image_url.trim().to_string(),
                is_default: i.is_default,
            })
            .collect();
        let options = self
            .options
            .iter()
            .filter(|o| !o.option_value.trim().is_empty())
            .map(|o| {
                serde_json::from_str(&o.option_value)
                    .map(|value| OptionPayload {
                        option_type: o.option_type,
                        option_value: value,
                    })
                    .map_err(|e| {
                        ApiError::Validation(format!("option {} is malformed: {e}", o.option_type))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let payload = ItemPayload {
            name: self.name.trim().to_string(),
            description: non_empty(&self.description),
            category_id: self.category_id.trim().to_string(),
            status: self.status.clone(),
            variants,
            images,
            options,
        };
        payload.validate()?;
        Ok(payload)
    }
}

/// One line of the admin items table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub category: String,
    pub details: String,
    pub status: &'static str,
    pub price: String,
}

impl ItemRow {
    /// `categories` resolves the category name when the item does not embed
    /// it.
    pub fn from_item(item: &Item, categories: &[Category]) -> Self {
        let category = item
            .category
            .as_ref()
            .map(|c| c.name.clone())
            .or_else(|| {
                categories
                    .iter()
                    .find(|c| c.id == item.category_id)
                    .map(|c| c.name.clone())
            })
            .unwrap_or_else(|| "Non catégorisé".to_string());
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            image_url: default_image(item).map(|i| i.image_url.clone()),
            category,
            details: format!(
                "{} variante(s) • {} image(s) • {} option(s)",
                item.variants.len(),
                item.images.len(),
                item.options.len()
            ),
            status: status_label(&item.status),
            price: price_range(&item.variants),
        }
    }
}

pub fn status_label(status: &str) -> &'static str {
    if status == STATUS_ACTIVE {
        "Actif"
    } else {
        "Inactif"
    }
}

/// Admin price column: euro price or range, `N/A` without variants.
pub fn price_range(variants: &[ItemVariant]) -> String {
    match price_bounds(variants) {
        None => "N/A".to_string(),
        Some((lo, hi)) if lo == hi => format_price_eur(lo),
        Some((lo, hi)) => format!("{} - {}", format_price_eur(lo), format_price_eur(hi)),
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub display_order: i32,
    pub parent_id: Option<String>,
}

impl CategoryForm {
    /// Blank form, optionally as a subcategory of `parent_id`.
    pub fn new(parent_id: Option<String>) -> Self {
        Self {
            parent_id,
            ..Self::default()
        }
    }

    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
            image_url: category.image_url.clone().unwrap_or_default(),
            display_order: category.display_order,
            parent_id: category.parent_id.clone(),
        }
    }

    pub fn to_payload(&self) -> Result<CategoryPayload, ApiError> {
        let payload = CategoryPayload {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            image_url: non_empty(&self.image_url),
            display_order: self.display_order,
            parent_id: self.parent_id.as_deref().and_then(non_empty),
        };
        payload.validate()?;
        Ok(payload)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventForm {
    pub name: String,
    pub description: String,
    pub event_type: String,
    pub image_url: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub is_promo: bool,
    pub show_in_header: bool,
}

impl Default for EventForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            event_type: String::new(),
            image_url: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            status: STATUS_ACTIVE.to_string(),
            is_promo: true,
            show_in_header: false,
        }
    }
}

impl EventForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dates are converted to `YYYY-MM-DD` for date inputs.
    pub fn from_event(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            event_type: event.event_type.clone().unwrap_or_default(),
            image_url: event.image_url.clone().unwrap_or_default(),
            start_date: format_date_for_input(event.start_date.as_deref()),
            end_date: format_date_for_input(event.end_date.as_deref()),
            status: event.status.clone().unwrap_or_else(|| STATUS_ACTIVE.to_string()),
            is_promo: event.is_promo,
            show_in_header: event.show_in_header,
        }
    }

    pub fn to_payload(&self) -> Result<EventPayload, ApiError> {
        let start = self.checked_date(&self.start_date, "start")?;
        let end = self.checked_date(&self.end_date, "end")?;
        if let (Some(start), Some(end)) = (&start, &end) {
            if parse_date(end) < parse_date(start) {
                return Err(ApiError::Validation(
                    "event must end after it starts".to_string(),
                ));
            }
        }
        let payload = EventPayload {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            event_type: non_empty(&self.event_type),
            image_url: non_empty(&self.image_url),
            start_date: start,
            end_date: end,
            status: self.status.clone(),
            is_promo: self.is_promo,
            show_in_header: self.show_in_header,
        };
        payload.validate()?;
        Ok(payload)
    }

    fn checked_date(&self, raw: &str, which: &str) -> Result<Option<String>, ApiError> {
        match non_empty(raw) {
            None => Ok(None),
            Some(date) if is_valid_date(Some(&date)) => Ok(Some(date)),
            Some(date) => Err(ApiError::Validation(format!("invalid {which} date: {date}"))),
        }
    }
}

/// One line of the admin events table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub id: String,
    pub name: String,
    pub event_type: String,
    pub starts: String,
    pub ends: String,
    /// Full start and end with the time, shown on hover.
    pub period: String,
    pub status: &'static str,
    pub flags: String,
}

impl EventRow {
    pub fn from_event(event: &Event) -> Self {
        let mut flags = Vec::new();
        if event.is_promo {
            flags.push("Promo");
        }
        if event.show_in_header {
            flags.push("Bandeau");
        }
        Self {
            id: event.id.clone(),
            name: event.name.clone(),
            event_type: event
                .event_type
                .clone()
                .unwrap_or_else(|| "Promotion".to_string()),
            starts: format_date(event.start_date.as_deref()),
            ends: format_date(event.end_date.as_deref()),
            period: format!(
                "{} - {}",
                format_date_time(event.start_date.as_deref()),
                format_date_time(event.end_date.as_deref())
            ),
            status: status_label(event.status.as_deref().unwrap_or(STATUS_ACTIVE)),
            flags: flags.join(", "),
        }
    }
}
