use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use anyhow::{anyhow, Result};
use chrono::Utc;

use crate::model::{
    Attribute, AttributeDefinition, AttributeId, AttributeUpdate, ExistingOption, OptionId,
};
use crate::store::traits::AttributeStore;

/// One stored option row, swatch values included.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredOption {
    pub id: OptionId,
    pub value: String,
    pub position: usize,
    pub visual_swatch: Option<String>,
    pub text_swatch: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    attributes: HashMap<(String, String), Attribute>,
    options: HashMap<AttributeId, Vec<StoredOption>>,
    vanished: HashSet<(String, String)>,
    next_attribute_id: AttributeId,
    next_option_id: OptionId,
    add_attribute_calls: u64,
    save_attribute_calls: u64,
}

/// In-memory `AttributeStore` for development and tests. Tracks how many
/// mutating calls it has served so tests can assert idempotence, and can be
/// told to report an attribute as absent to exercise the
/// vanished-after-create path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get_attribute` report this attribute as absent from now on,
    /// while the underlying rows stay in place.
    pub async fn vanish_attribute(&self, entity_type: &str, code: &str) {
        let mut state = self.state.write().await;
        state
            .vanished
            .insert((entity_type.to_string(), code.to_string()));
    }

    /// Number of mutating store calls served so far.
    pub async fn mutation_count(&self) -> u64 {
        let state = self.state.read().await;
        state.add_attribute_calls + state.save_attribute_calls
    }

    /// Stored attribute metadata, bypassing the vanish knob.
    pub async fn stored_attribute(&self, entity_type: &str, code: &str) -> Option<Attribute> {
        let state = self.state.read().await;
        state
            .attributes
            .get(&(entity_type.to_string(), code.to_string()))
            .cloned()
    }

    /// Stored option rows in position order.
    pub async fn stored_options(&self, attribute_id: AttributeId) -> Vec<StoredOption> {
        let state = self.state.read().await;
        state.options.get(&attribute_id).cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl AttributeStore for MemoryStore {
    async fn get_attribute(&self, entity_type: &str, code: &str) -> Result<Option<Attribute>> {
        let state = self.state.read().await;
        let key = (entity_type.to_string(), code.to_string());
        if state.vanished.contains(&key) {
            return Ok(None);
        }
        Ok(state.attributes.get(&key).cloned())
    }

    async fn add_attribute(
        &self,
        entity_type: &str,
        code: &str,
        definition: &AttributeDefinition,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.add_attribute_calls += 1;

        let key = (entity_type.to_string(), code.to_string());
        let now = Utc::now();

        let candidate_id = state.next_attribute_id + 1;
        let mut created = false;
        let attribute = state.attributes.entry(key).or_insert_with(|| {
            created = true;
            Attribute {
                id: candidate_id,
                entity_type: entity_type.to_string(),
                code: code.to_string(),
                frontend_label: definition.frontend_label.clone(),
                frontend_input: definition.frontend_input,
                swatch_input_type: None,
                is_required: definition.is_required,
                is_user_defined: definition.is_user_defined,
                is_searchable: definition.is_searchable,
                is_filterable: definition.is_filterable,
                is_comparable: definition.is_comparable,
                visible_in_advanced_search: definition.visible_in_advanced_search,
                apply_to: definition.apply_to.clone(),
                is_used_in_grid: definition.is_used_in_grid,
                is_visible_in_grid: definition.is_visible_in_grid,
                update_product_preview_image: false,
                use_product_image_for_swatch: false,
                created_at: now,
                updated_at: now,
            }
        });

        // Metadata updates apply on the existing-attribute path too.
        attribute.frontend_label = definition.frontend_label.clone();
        attribute.is_required = definition.is_required;
        attribute.is_user_defined = definition.is_user_defined;
        attribute.is_searchable = definition.is_searchable;
        attribute.is_filterable = definition.is_filterable;
        attribute.is_comparable = definition.is_comparable;
        attribute.visible_in_advanced_search = definition.visible_in_advanced_search;
        attribute.apply_to = definition.apply_to.clone();
        attribute.is_used_in_grid = definition.is_used_in_grid;
        attribute.is_visible_in_grid = definition.is_visible_in_grid;
        attribute.updated_at = now;
        let attribute_id = attribute.id;

        if created {
            state.next_attribute_id = candidate_id;
        }

        // Append the definition's option values after any existing options.
        let mut next_option_id = state.next_option_id;
        let rows = state.options.entry(attribute_id).or_default();
        let mut position = rows.iter().map(|o| o.position + 1).max().unwrap_or(0);
        for value in &definition.option_values {
            next_option_id += 1;
            rows.push(StoredOption {
                id: next_option_id,
                value: value.clone(),
                position,
                visual_swatch: None,
                text_swatch: None,
            });
            position += 1;
        }
        state.next_option_id = next_option_id;

        Ok(())
    }

    async fn load_options(&self, attribute_id: AttributeId) -> Result<Vec<ExistingOption>> {
        let state = self.state.read().await;
        let mut rows = state.options.get(&attribute_id).cloned().unwrap_or_default();
        rows.sort_by_key(|o| o.position);
        Ok(rows
            .into_iter()
            .map(|o| ExistingOption {
                id: o.id,
                value: o.value,
            })
            .collect())
    }

    async fn save_attribute(&self, attribute: &Attribute, update: &AttributeUpdate) -> Result<()> {
        let mut state = self.state.write().await;
        state.save_attribute_calls += 1;

        let key = (attribute.entity_type.clone(), attribute.code.clone());
        let now = Utc::now();
        {
            let stored = state
                .attributes
                .get_mut(&key)
                .ok_or_else(|| anyhow!("attribute {} not found on save", attribute.code))?;
            stored.frontend_input = update.frontend_input;
            stored.swatch_input_type = Some(update.swatch_input_type);
            stored.update_product_preview_image = update.update_product_preview_image;
            stored.use_product_image_for_swatch = update.use_product_image_for_swatch;
            stored.updated_at = now;
        }

        let rows = state.options.entry(attribute.id).or_default();
        rows.retain(|row| {
            update
                .options
                .marked_for_deletion
                .get(&row.id)
                .map(|marker| marker.is_empty())
                .unwrap_or(true)
        });
        for row in rows.iter_mut() {
            if let Some(values) = update.options.values.get(&row.id) {
                if let Some(value) = values.first() {
                    row.value = value.clone();
                }
            }
            if let Some(order) = update.options.order.get(&row.id) {
                if let Ok(position) = order.parse::<usize>() {
                    row.position = position;
                }
            }
            if let Some(swatch) = update.options.visual_swatches.get(&row.id) {
                row.visual_swatch = Some(swatch.clone());
            }
            if let Some(swatch) = update.options.text_swatches.get(&row.id) {
                row.text_swatch = swatch.first().cloned();
            }
        }
        rows.sort_by_key(|o| o.position);

        Ok(())
    }

    async fn clear_cache(&self) -> Result<()> {
        // Nothing cached; state reads are always fresh.
        Ok(())
    }
}
