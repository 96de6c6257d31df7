use crate::model::{
    Attribute, AttributeDefinition, AttributeId, AttributeUpdate, ExistingOption,
};
use anyhow::Result;

/// The attribute metadata seam the seeder drives. Implementations own all
/// EAV storage and schema concerns.
#[async_trait::async_trait]
pub trait AttributeStore: Send + Sync {
    /// Look up an attribute by entity type and code.
    async fn get_attribute(&self, entity_type: &str, code: &str) -> Result<Option<Attribute>>;

    /// Create the attribute if missing, update its metadata if present, and
    /// append the definition's option values after any existing options.
    async fn add_attribute(
        &self,
        entity_type: &str,
        code: &str,
        definition: &AttributeDefinition,
    ) -> Result<()>;

    /// All options currently on the attribute, in position order.
    async fn load_options(&self, attribute_id: AttributeId) -> Result<Vec<ExistingOption>>;

    /// Persist the assembled option/swatch payload onto the attribute.
    async fn save_attribute(&self, attribute: &Attribute, update: &AttributeUpdate) -> Result<()>;

    /// Drop any cached attribute metadata. Required between a schema-level
    /// add and the re-fetch that follows it.
    async fn clear_cache(&self) -> Result<()>;
}
