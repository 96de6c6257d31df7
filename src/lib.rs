pub mod config;
pub mod model;
pub mod seed;
pub mod store;

// Export all model types
pub use model::*;

// Export seed module
pub use seed::*;

// Export store types
pub use store::{AttributeStore, MemoryStore, PostgresEavStore};

#[cfg(test)]
mod tests {
    use crate::model::{FrontendInput, OptionSpec, SwatchInputType};

    #[test]
    fn frontend_input_round_trips_through_serde() {
        for (json, expected) in [
            ("\"select\"", FrontendInput::Select),
            ("\"swatch_visual\"", FrontendInput::SwatchVisual),
            ("\"swatch_text\"", FrontendInput::SwatchText),
        ] {
            let parsed: FrontendInput = serde_json::from_str(json).unwrap();
            assert_eq!(parsed, expected);
            assert_eq!(serde_json::to_string(&parsed).unwrap(), json);
        }
    }

    #[test]
    fn frontend_input_as_str_matches_serde_names() {
        assert_eq!(FrontendInput::SwatchVisual.as_str(), "swatch_visual");
        assert_eq!(SwatchInputType::Visual.as_str(), "visual");
        assert_eq!(SwatchInputType::Text.as_str(), "text");
    }

    #[test]
    fn option_spec_omits_empty_swatch_when_serialized() {
        let option = OptionSpec {
            default_store_view: "Red".to_string(),
            swatch: String::new(),
        };
        let json = serde_json::to_string(&option).unwrap();
        assert!(!json.contains("\"swatch\""));

        let parsed: OptionSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.swatch, "");
    }

    #[test]
    fn select_definition_carries_the_catalog_defaults() {
        use crate::model::AttributeDefinition;

        let definition =
            AttributeDefinition::select("Color", vec!["Red".to_string(), "Blue".to_string()]);
        assert_eq!(definition.backend_type, "int");
        assert_eq!(definition.frontend_input, FrontendInput::Select);
        assert!(!definition.is_required);
        assert!(definition.is_user_defined);
        assert!(definition.is_searchable);
        assert!(definition.is_filterable);
        assert!(definition.is_comparable);
        assert!(definition.visible_in_advanced_search);
        assert_eq!(definition.apply_to, "simple,virtual");
        assert!(definition.is_used_in_grid);
        assert!(!definition.is_visible_in_grid);
        assert_eq!(definition.option_values.len(), 2);
    }
}
