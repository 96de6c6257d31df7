use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{AttributeCode, AttributeSpec, AttributeSpecEntry};

/// Fixture location, relative to the sample-data directory.
pub const ATTRIBUTES_PATH: &str = "products/attributes.json";

/// Read and parse the attribute fixture under `data_dir`.
pub fn load_attribute_specs(data_dir: &Path) -> Result<Vec<AttributeSpec>> {
    let path = data_dir.join(ATTRIBUTES_PATH);
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read attribute fixture {}", path.display()))?;
    parse_attribute_specs(&raw)
        .with_context(|| format!("Failed to parse attribute fixture {}", path.display()))
}

/// Parse the fixture document: a JSON object mapping attribute code to its
/// spec. Entries with a `null` body are skipped. Attributes are returned in
/// sorted-key order; nothing depends on cross-attribute order.
pub fn parse_attribute_specs(json: &str) -> Result<Vec<AttributeSpec>> {
    let document: BTreeMap<AttributeCode, Option<AttributeSpecEntry>> =
        serde_json::from_str(json).context("Attribute fixture is not a valid JSON document")?;

    Ok(document
        .into_iter()
        .filter_map(|(code, entry)| entry.map(|e| e.into_spec(code)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FrontendInput;

    #[test]
    fn parses_the_fixture_document_shape() {
        let json = r##"{
            "color": {
                "frontend_label": "Color",
                "frontend_input": "swatch_visual",
                "values": [
                    {"default_store_view": "Red", "swatch": "#FF0000"},
                    {"default_store_view": "Blue", "swatch": "#0000FF"}
                ]
            },
            "size": {
                "frontend_label": "Size",
                "frontend_input": "swatch_text",
                "values": [
                    {"default_store_view": "M", "swatch": "M"}
                ]
            }
        }"##;

        let specs = parse_attribute_specs(json).unwrap();
        assert_eq!(specs.len(), 2);

        let color = specs.iter().find(|s| s.code == "color").unwrap();
        assert_eq!(color.frontend_label, "Color");
        assert_eq!(color.frontend_input, FrontendInput::SwatchVisual);
        assert_eq!(color.options.len(), 2);
        assert_eq!(color.options[0].default_store_view, "Red");
        assert_eq!(color.options[0].swatch, "#FF0000");
    }

    #[test]
    fn null_entries_are_skipped() {
        let json = r#"{
            "color": null,
            "size": {
                "frontend_label": "Size",
                "frontend_input": "select",
                "values": []
            }
        }"#;

        let specs = parse_attribute_specs(json).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].code, "size");
    }

    #[test]
    fn swatch_key_defaults_to_empty() {
        let json = r#"{
            "material": {
                "frontend_label": "Material",
                "frontend_input": "select",
                "values": [{"default_store_view": "Wood"}]
            }
        }"#;

        let specs = parse_attribute_specs(json).unwrap();
        assert_eq!(specs[0].options[0].swatch, "");
    }

    #[test]
    fn rejects_unknown_frontend_input() {
        let json = r#"{
            "color": {
                "frontend_label": "Color",
                "frontend_input": "multiselect",
                "values": []
            }
        }"#;

        assert!(parse_attribute_specs(json).is_err());
    }
}
