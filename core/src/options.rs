//! Item option catalogue and decoding of JSON-encoded option values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Allergenes,
    Vegetarienne,
    Base,
}

const ALLERGENES: &[&str] = &[
    "Arachide",
    "Céréales contenant du gluten",
    "Lait",
    "Œuf",
    "Fruits à coque",
    "Poisson",
    "Crustacés",
    "Mollusques",
    "Soja",
    "Sésame",
    "Moutarde",
    "Céleri",
    "Lupin",
    "Sulfites",
];

const VEGETARIENNE: &[&str] = &["Oui", "Non"];

const BASE: &[&str] = &["Tomate", "Crème"];

impl OptionType {
    /// Every option type, in form display order.
    pub const ALL: [OptionType; 3] = [
        OptionType::Allergenes,
        OptionType::Vegetarienne,
        OptionType::Base,
    ];

    /// Values an admin may pick for this option type.
    pub fn allowed_values(self) -> &'static [&'static str] {
        match self {
            OptionType::Allergenes => ALLERGENES,
            OptionType::Vegetarienne => VEGETARIENNE,
            OptionType::Base => BASE,
        }
    }

    /// Checkbox types hold a list; VEGETARIENNE is a single radio choice.
    pub fn is_multi_valued(self) -> bool {
        matches!(self, OptionType::Allergenes | OptionType::Base)
    }

    /// Encoded value a freshly added option starts with.
    pub fn default_encoded(self) -> &'static str {
        if self.is_multi_valued() {
            "[]"
        } else {
            "null"
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Allergenes => "ALLERGENES",
            OptionType::Vegetarienne => "VEGETARIENNE",
            OptionType::Base => "BASE",
        }
    }

    pub fn parse(s: &str) -> Option<OptionType> {
        OptionType::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Many(Vec<String>),
    One(String),
    Unset,
}

impl OptionValue {
    /// Decode JSON text. Text that is not JSON is taken verbatim, matching
    /// how older records stored bare strings.
    pub fn decode(raw: &str) -> OptionValue {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Array(values)) => OptionValue::Many(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        serde_json::Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            Ok(serde_json::Value::String(s)) => OptionValue::One(s),
            Ok(serde_json::Value::Null) => OptionValue::Unset,
            Ok(other) => OptionValue::One(other.to_string()),
            Err(_) => OptionValue::One(raw.to_string()),
        }
    }

    pub fn encode(&self) -> String {
        self.to_json().to_string()
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            OptionValue::Many(values) => serde_json::Value::from(values.clone()),
            OptionValue::One(value) => serde_json::Value::from(value.clone()),
            OptionValue::Unset => serde_json::Value::Null,
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            OptionValue::Many(values) => values.iter().any(|v| v == value),
            OptionValue::One(v) => v == value,
            OptionValue::Unset => false,
        }
    }
}

impl Item {
    pub fn option_value(&self, option_type: OptionType) -> Option<OptionValue> {
        self.options
            .iter()
            .find(|o| o.option_type == option_type)
            .map(|o| OptionValue::decode(&o.option_value))
    }

    pub fn has_option(&self, option_type: OptionType) -> bool {
        self.options.iter().any(|o| o.option_type == option_type)
    }

    /// True only when the VEGETARIENNE option is present and says "Oui".
    pub fn is_vegetarian(&self) -> bool {
        matches!(
            self.option_value(OptionType::Vegetarienne),
            Some(OptionValue::One(v)) if v == "Oui"
        )
    }

    pub fn allergens(&self) -> Vec<String> {
        match self.option_value(OptionType::Allergenes) {
            Some(OptionValue::Many(values)) => values,
            _ => Vec::new(),
        }
    }

    /// Sauce base shown under the item name, e.g. "Tomate, Crème".
    pub fn base_description(&self) -> String {
        match self.option_value(OptionType::Base) {
            Some(OptionValue::Many(values)) => values.join(", "),
            Some(OptionValue::One(value)) => value,
            Some(OptionValue::Unset) | None => String::new(),
        }
    }
}
