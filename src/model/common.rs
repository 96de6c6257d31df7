use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute code, unique per entity type (e.g. "color", "size").
pub type AttributeCode = String;

/// Store-assigned attribute identifier.
pub type AttributeId = i64;

/// Store-assigned option identifier.
pub type OptionId = i64;

/// Option display value -> swatch value, built fresh per attribute from its
/// spec. Resolution is by display value, so values are assumed unique within
/// one attribute.
pub type SwatchMap = HashMap<String, String>;

/// The catalog product entity type all seeded attributes belong to.
pub const CATALOG_PRODUCT_ENTITY: &str = "catalog_product";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Simple,
    Virtual,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Simple => "simple",
            ProductType::Virtual => "virtual",
        }
    }
}

/// Join product types into the comma-separated `apply_to` form the store
/// persists.
pub fn apply_to_string(types: &[ProductType]) -> String {
    types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
