//! Order summary built from the customisation dialog.

use crate::types::{Item, ItemVariant};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub item_id: String,
    pub item_name: String,
    pub variant: Option<ItemVariant>,
    pub base: Option<String>,
    quantity: u32,
}

impl OrderDraft {
    pub fn new(item: &Item, variant: Option<&ItemVariant>) -> Self {
        Self {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            variant: variant.cloned(),
            base: None,
            quantity: 1,
        }
    }

    /// Pick a variant by id or, failing that, by name.
    pub fn for_selection(item: &Item, variant: Option<&str>, quantity: u32) -> Self {
        let chosen = variant.and_then(|key| {
            item.variants
                .iter()
                .find(|v| v.id.as_deref() == Some(key) || v.variant_name == key)
        });
        let mut draft = Self::new(item, chosen.or_else(|| crate::menu::default_variant(item)));
        draft.set_quantity(quantity);
        draft
    }

    pub fn with_base(mut self, base: Option<String>) -> Self {
        self.base = base.filter(|b| !b.trim().is_empty());
        self
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Quantity never drops below one.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }

    pub fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    pub fn decrement(&mut self) {
        self.set_quantity(self.quantity.saturating_sub(1));
    }

    pub fn unit_price(&self) -> f64 {
        self.variant.as_ref().map(|v| v.price).unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.unit_price() * f64::from(self.quantity)
    }
}
