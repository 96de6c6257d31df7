use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::common::{
    apply_to_string, AttributeCode, AttributeId, OptionId, ProductType,
};
use crate::model::spec::FrontendInput;

/// Which swatch payload an attribute carries once seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwatchInputType {
    Visual,
    Text,
}

impl SwatchInputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwatchInputType::Visual => "visual",
            SwatchInputType::Text => "text",
        }
    }
}

/// Attribute metadata as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub entity_type: String,
    pub code: AttributeCode,
    pub frontend_label: String,
    pub frontend_input: FrontendInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swatch_input_type: Option<SwatchInputType>,
    pub is_required: bool,
    pub is_user_defined: bool,
    pub is_searchable: bool,
    pub is_filterable: bool,
    pub is_comparable: bool,
    pub visible_in_advanced_search: bool,
    pub apply_to: String,
    pub is_used_in_grid: bool,
    pub is_visible_in_grid: bool,
    pub update_product_preview_image: bool,
    pub use_product_image_for_swatch: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Definition handed to `add_attribute`. The store creates the attribute if
/// missing and appends `option_values` either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub backend_type: String,
    pub frontend_label: String,
    pub frontend_input: FrontendInput,
    pub is_required: bool,
    pub is_user_defined: bool,
    pub is_searchable: bool,
    pub is_filterable: bool,
    pub is_comparable: bool,
    pub visible_in_advanced_search: bool,
    pub apply_to: String,
    pub is_used_in_grid: bool,
    pub is_visible_in_grid: bool,
    pub option_values: Vec<String>,
}

impl AttributeDefinition {
    /// The seeded catalog-product select attribute: user-defined, searchable,
    /// filterable, comparable, applicable to simple and virtual products.
    pub fn select(frontend_label: impl Into<String>, option_values: Vec<String>) -> Self {
        Self {
            backend_type: "int".to_string(),
            frontend_label: frontend_label.into(),
            frontend_input: FrontendInput::Select,
            is_required: false,
            is_user_defined: true,
            is_searchable: true,
            is_filterable: true,
            is_comparable: true,
            visible_in_advanced_search: true,
            apply_to: apply_to_string(&[ProductType::Simple, ProductType::Virtual]),
            is_used_in_grid: true,
            is_visible_in_grid: false,
            option_values,
        }
    }
}

/// An option already present on a stored attribute, in position order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingOption {
    pub id: OptionId,
    pub value: String,
}

/// The option/swatch payload applied on save, one entry per option id.
///
/// `order` carries the sequential position as a string, `marked_for_deletion`
/// the empty no-op markers the save contract requires, and `values` the
/// `[display, ""]` rows whose second slot is reserved for locale-specific
/// labels. Only one of the swatch maps is populated, depending on the spec's
/// frontend input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionUpdateBatch {
    pub order: HashMap<OptionId, String>,
    pub marked_for_deletion: HashMap<OptionId, String>,
    pub values: HashMap<OptionId, Vec<String>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub visual_swatches: HashMap<OptionId, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub text_swatches: HashMap<OptionId, Vec<String>>,
}

/// Everything one `save_attribute` call persists onto an existing attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeUpdate {
    pub frontend_input: FrontendInput,
    pub swatch_input_type: SwatchInputType,
    pub update_product_preview_image: bool,
    pub use_product_image_for_swatch: bool,
    pub options: OptionUpdateBatch,
}
