use serde::{Deserialize, Serialize};

use crate::model::common::{AttributeCode, SwatchMap};

/// How the attribute is rendered on the storefront. Stored attributes are
/// always `select`; the swatch variants only control which swatch payload the
/// seeder attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontendInput {
    Select,
    SwatchVisual,
    SwatchText,
}

impl FrontendInput {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrontendInput::Select => "select",
            FrontendInput::SwatchVisual => "swatch_visual",
            FrontendInput::SwatchText => "swatch_text",
        }
    }
}

/// One desired option: display value plus an optional swatch (hex color for
/// visual swatches, arbitrary text otherwise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub default_store_view: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub swatch: String,
}

/// A desired select-type attribute, as declared in the sample-data fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub code: AttributeCode,
    pub frontend_label: String,
    pub frontend_input: FrontendInput,
    pub options: Vec<OptionSpec>,
}

impl AttributeSpec {
    /// Build the value -> swatch map for this spec's options. Every declared
    /// option lands in the map, empty swatch strings included; the fallback
    /// to the display value applies only to values with no entry at all.
    pub fn swatch_map(&self) -> SwatchMap {
        self.options
            .iter()
            .map(|o| (o.default_store_view.clone(), o.swatch.clone()))
            .collect()
    }
}

/// Raw per-attribute entry of the fixture document, keyed by attribute code
/// at the document level.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeSpecEntry {
    pub frontend_label: String,
    pub frontend_input: FrontendInput,
    #[serde(default)]
    pub values: Vec<OptionSpec>,
}

impl AttributeSpecEntry {
    pub fn into_spec(self, code: AttributeCode) -> AttributeSpec {
        AttributeSpec {
            code,
            frontend_label: self.frontend_label,
            frontend_input: self.frontend_input,
            options: self.values,
        }
    }
}
