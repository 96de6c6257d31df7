use anyhow::Result;
use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::model::{
    AttributeDefinition, AttributeSpec, AttributeUpdate, ExistingOption, FrontendInput,
    OptionUpdateBatch, SwatchInputType, SwatchMap, CATALOG_PRODUCT_ENTITY,
};
use crate::store::traits::AttributeStore;

/// What to do when an attribute cannot be re-fetched right after it was
/// added. `AbortRun` is the historical behavior: the whole seeding batch
/// stops, without error. `SkipSpec` moves on to the next attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAttributePolicy {
    AbortRun,
    SkipSpec,
}

impl Default for MissingAttributePolicy {
    fn default() -> Self {
        MissingAttributePolicy::AbortRun
    }
}

/// Per-run tally, used for logging and asserted by tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub seeded: usize,
    pub up_to_date: usize,
    pub missing: usize,
}

enum SpecOutcome {
    Seeded,
    UpToDate,
    MissingAfterAdd,
}

/// Seeds select-type catalog product attributes from declarative specs.
///
/// Each spec is reconciled against the store: options already present are
/// never recreated, renamed or deleted, so the final option set is always
/// the union of what was saved before and what the spec adds.
pub struct AttributeSeeder {
    missing_attribute: MissingAttributePolicy,
}

impl AttributeSeeder {
    pub fn new(missing_attribute: MissingAttributePolicy) -> Self {
        Self { missing_attribute }
    }

    /// Process every spec in order, strictly sequentially.
    pub async fn seed<S: AttributeStore + ?Sized>(
        &self,
        store: &S,
        specs: &[AttributeSpec],
    ) -> Result<SeedSummary> {
        let mut summary = SeedSummary::default();

        for spec in specs {
            match self.seed_attribute(store, spec).await? {
                SpecOutcome::Seeded => summary.seeded += 1,
                SpecOutcome::UpToDate => summary.up_to_date += 1,
                SpecOutcome::MissingAfterAdd => {
                    summary.missing += 1;
                    match self.missing_attribute {
                        MissingAttributePolicy::AbortRun => {
                            warn!(
                                "attribute '{}' missing after add, aborting seeding run",
                                spec.code
                            );
                            return Ok(summary);
                        }
                        MissingAttributePolicy::SkipSpec => {
                            warn!(
                                "attribute '{}' missing after add, skipping it",
                                spec.code
                            );
                        }
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn seed_attribute<S: AttributeStore + ?Sized>(
        &self,
        store: &S,
        spec: &AttributeSpec,
    ) -> Result<SpecOutcome> {
        let swatch_map = spec.swatch_map();

        // Desired values in spec order, de-duplicated by display value.
        let mut to_add: Vec<String> = spec
            .options
            .iter()
            .map(|o| o.default_store_view.clone())
            .unique()
            .collect();

        if let Some(attribute) = store.get_attribute(CATALOG_PRODUCT_ENTITY, &spec.code).await? {
            let existing = store.load_options(attribute.id).await?;
            to_add.retain(|value| !existing.iter().any(|option| &option.value == value));
        }

        if to_add.is_empty() {
            debug!("attribute '{}' has nothing to add, skipping", spec.code);
            return Ok(SpecOutcome::UpToDate);
        }

        store
            .add_attribute(
                CATALOG_PRODUCT_ENTITY,
                &spec.code,
                &AttributeDefinition::select(spec.frontend_label.clone(), to_add),
            )
            .await?;

        // The store may serve stale lookups after a schema-level add.
        store.clear_cache().await?;

        let Some(attribute) = store.get_attribute(CATALOG_PRODUCT_ENTITY, &spec.code).await? else {
            return Ok(SpecOutcome::MissingAfterAdd);
        };

        // Fresh load so the payload covers pre-existing and just-created
        // options alike.
        let options = store.load_options(attribute.id).await?;
        let update = AttributeUpdate {
            frontend_input: FrontendInput::Select,
            swatch_input_type: match spec.frontend_input {
                FrontendInput::SwatchVisual => SwatchInputType::Visual,
                _ => SwatchInputType::Text,
            },
            update_product_preview_image: true,
            use_product_image_for_swatch: false,
            options: build_option_batch(&options, &swatch_map, spec.frontend_input),
        };

        store.save_attribute(&attribute, &update).await?;
        info!(
            "seeded attribute '{}' with {} option(s)",
            spec.code,
            options.len()
        );

        Ok(SpecOutcome::Seeded)
    }
}

/// Assemble the option/swatch payload for every option on the attribute:
/// sequential order indices, empty delete markers, `[value, ""]` label rows,
/// and visual or text swatches depending on the spec's frontend input. An
/// option with no swatch map entry falls back to its own display value.
pub fn build_option_batch(
    options: &[ExistingOption],
    swatch_map: &SwatchMap,
    frontend_input: FrontendInput,
) -> OptionUpdateBatch {
    let mut batch = OptionUpdateBatch::default();

    for (index, option) in options.iter().enumerate() {
        batch.order.insert(option.id, index.to_string());
        batch.marked_for_deletion.insert(option.id, String::new());
        batch
            .values
            .insert(option.id, vec![option.value.clone(), String::new()]);

        let swatch = swatch_map
            .get(&option.value)
            .cloned()
            .unwrap_or_else(|| option.value.clone());

        match frontend_input {
            FrontendInput::SwatchVisual => {
                batch.visual_swatches.insert(option.id, swatch);
            }
            _ => {
                batch.text_swatches.insert(option.id, vec![swatch]);
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn options() -> Vec<ExistingOption> {
        vec![
            ExistingOption {
                id: 10,
                value: "Red".to_string(),
            },
            ExistingOption {
                id: 11,
                value: "Blue".to_string(),
            },
        ]
    }

    #[test]
    fn visual_batch_carries_swatches_and_markers() {
        let swatch_map: SwatchMap = HashMap::from([
            ("Red".to_string(), "#FF0000".to_string()),
            ("Blue".to_string(), "#0000FF".to_string()),
        ]);

        let batch = build_option_batch(&options(), &swatch_map, FrontendInput::SwatchVisual);

        assert_eq!(batch.order[&10], "0");
        assert_eq!(batch.order[&11], "1");
        assert_eq!(batch.marked_for_deletion[&10], "");
        assert_eq!(batch.values[&10], vec!["Red".to_string(), String::new()]);
        assert_eq!(batch.visual_swatches[&10], "#FF0000");
        assert_eq!(batch.visual_swatches[&11], "#0000FF");
        assert!(batch.text_swatches.is_empty());
    }

    #[test]
    fn text_batch_wraps_swatches_in_single_element_lists() {
        let swatch_map: SwatchMap = HashMap::from([("Red".to_string(), "R".to_string())]);

        let batch = build_option_batch(&options(), &swatch_map, FrontendInput::SwatchText);

        assert_eq!(batch.text_swatches[&10], vec!["R".to_string()]);
        assert!(batch.visual_swatches.is_empty());
    }

    #[test]
    fn missing_swatch_entry_falls_back_to_display_value() {
        let swatch_map: SwatchMap = HashMap::new();

        let visual = build_option_batch(&options(), &swatch_map, FrontendInput::SwatchVisual);
        assert_eq!(visual.visual_swatches[&10], "Red");

        let text = build_option_batch(&options(), &swatch_map, FrontendInput::Select);
        assert_eq!(text.text_swatches[&11], vec!["Blue".to_string()]);
    }

    #[test]
    fn empty_swatch_string_is_kept_verbatim() {
        let swatch_map: SwatchMap = HashMap::from([("Red".to_string(), String::new())]);

        let batch = build_option_batch(&options(), &swatch_map, FrontendInput::SwatchVisual);
        assert_eq!(batch.visual_swatches[&10], "");
    }

    #[test]
    fn plain_select_gets_the_text_payload() {
        let swatch_map: SwatchMap = HashMap::new();
        let batch = build_option_batch(&options(), &swatch_map, FrontendInput::Select);
        assert_eq!(batch.text_swatches.len(), 2);
        assert!(batch.visual_swatches.is_empty());
    }
}
