use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{
    Attribute, AttributeDefinition, AttributeId, AttributeUpdate, ExistingOption, FrontendInput,
    SwatchInputType,
};
use crate::store::attribute_cache::AttributeCache;
use crate::store::traits::AttributeStore;

/// PostgreSQL-backed attribute store over a small EAV schema:
/// `eav_attribute`, `eav_attribute_option`, `eav_attribute_option_value`
/// (store 0 holds the default-store-view labels) and
/// `eav_attribute_option_swatch`.
#[derive(Debug)]
pub struct PostgresEavStore {
    pool: PgPool,
    cache: AttributeCache,
}

impl PostgresEavStore {
    /// Create a new store with the given database URL.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self {
            pool,
            cache: AttributeCache::new(),
        })
    }

    /// Create the EAV schema if it does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        for statement in [
            r#"
            CREATE TABLE IF NOT EXISTS eav_attribute (
                attribute_id BIGSERIAL PRIMARY KEY,
                entity_type TEXT NOT NULL,
                attribute_code TEXT NOT NULL,
                frontend_label TEXT NOT NULL,
                frontend_input TEXT NOT NULL,
                swatch_input_type TEXT,
                is_required BOOLEAN NOT NULL DEFAULT FALSE,
                is_user_defined BOOLEAN NOT NULL DEFAULT TRUE,
                is_searchable BOOLEAN NOT NULL DEFAULT FALSE,
                is_filterable BOOLEAN NOT NULL DEFAULT FALSE,
                is_comparable BOOLEAN NOT NULL DEFAULT FALSE,
                visible_in_advanced_search BOOLEAN NOT NULL DEFAULT FALSE,
                apply_to TEXT NOT NULL DEFAULT '',
                is_used_in_grid BOOLEAN NOT NULL DEFAULT FALSE,
                is_visible_in_grid BOOLEAN NOT NULL DEFAULT FALSE,
                update_product_preview_image BOOLEAN NOT NULL DEFAULT FALSE,
                use_product_image_for_swatch BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (entity_type, attribute_code)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS eav_attribute_option (
                option_id BIGSERIAL PRIMARY KEY,
                attribute_id BIGINT NOT NULL
                    REFERENCES eav_attribute(attribute_id) ON DELETE CASCADE,
                position INT NOT NULL DEFAULT 0
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS eav_attribute_option_value (
                option_id BIGINT NOT NULL
                    REFERENCES eav_attribute_option(option_id) ON DELETE CASCADE,
                store_id INT NOT NULL DEFAULT 0,
                value TEXT NOT NULL,
                PRIMARY KEY (option_id, store_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS eav_attribute_option_swatch (
                option_id BIGINT NOT NULL
                    REFERENCES eav_attribute_option(option_id) ON DELETE CASCADE,
                swatch_type TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (option_id, swatch_type)
            )
            "#,
        ] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to run EAV schema migration")?;
        }

        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn attribute_from_row(row: &sqlx::postgres::PgRow) -> Result<Attribute> {
        let frontend_input = parse_frontend_input(row.get("frontend_input"))?;
        let swatch_input_type = row
            .get::<Option<String>, _>("swatch_input_type")
            .map(|s| parse_swatch_input_type(&s))
            .transpose()?;

        Ok(Attribute {
            id: row.get::<i64, _>("attribute_id"),
            entity_type: row.get("entity_type"),
            code: row.get("attribute_code"),
            frontend_label: row.get("frontend_label"),
            frontend_input,
            swatch_input_type,
            is_required: row.get("is_required"),
            is_user_defined: row.get("is_user_defined"),
            is_searchable: row.get("is_searchable"),
            is_filterable: row.get("is_filterable"),
            is_comparable: row.get("is_comparable"),
            visible_in_advanced_search: row.get("visible_in_advanced_search"),
            apply_to: row.get("apply_to"),
            is_used_in_grid: row.get("is_used_in_grid"),
            is_visible_in_grid: row.get("is_visible_in_grid"),
            update_product_preview_image: row.get("update_product_preview_image"),
            use_product_image_for_swatch: row.get("use_product_image_for_swatch"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        })
    }
}

fn parse_frontend_input(value: &str) -> Result<FrontendInput> {
    match value {
        "select" => Ok(FrontendInput::Select),
        "swatch_visual" => Ok(FrontendInput::SwatchVisual),
        "swatch_text" => Ok(FrontendInput::SwatchText),
        other => bail!("Unknown frontend_input '{}' in eav_attribute", other),
    }
}

fn parse_swatch_input_type(value: &str) -> Result<SwatchInputType> {
    match value {
        "visual" => Ok(SwatchInputType::Visual),
        "text" => Ok(SwatchInputType::Text),
        other => bail!("Unknown swatch_input_type '{}' in eav_attribute", other),
    }
}

#[async_trait::async_trait]
impl AttributeStore for PostgresEavStore {
    async fn get_attribute(&self, entity_type: &str, code: &str) -> Result<Option<Attribute>> {
        if let Some(cached) = self.cache.get(entity_type, code).await {
            return Ok(cached);
        }

        let row = sqlx::query(
            "SELECT * FROM eav_attribute WHERE entity_type = $1 AND attribute_code = $2",
        )
        .bind(entity_type)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch attribute")?;

        let attribute = row.as_ref().map(Self::attribute_from_row).transpose()?;

        // Cache misses as well; clear_cache is what refreshes them after a
        // schema-level add.
        self.cache
            .put(entity_type, code, attribute.clone())
            .await;

        Ok(attribute)
    }

    async fn add_attribute(
        &self,
        entity_type: &str,
        code: &str,
        definition: &AttributeDefinition,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin add_attribute transaction")?;

        let attribute_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO eav_attribute (
                entity_type, attribute_code, frontend_label, frontend_input,
                is_required, is_user_defined, is_searchable, is_filterable,
                is_comparable, visible_in_advanced_search, apply_to,
                is_used_in_grid, is_visible_in_grid
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (entity_type, attribute_code) DO UPDATE SET
                frontend_label = EXCLUDED.frontend_label,
                is_required = EXCLUDED.is_required,
                is_user_defined = EXCLUDED.is_user_defined,
                is_searchable = EXCLUDED.is_searchable,
                is_filterable = EXCLUDED.is_filterable,
                is_comparable = EXCLUDED.is_comparable,
                visible_in_advanced_search = EXCLUDED.visible_in_advanced_search,
                apply_to = EXCLUDED.apply_to,
                is_used_in_grid = EXCLUDED.is_used_in_grid,
                is_visible_in_grid = EXCLUDED.is_visible_in_grid,
                updated_at = NOW()
            RETURNING attribute_id
            "#,
        )
        .bind(entity_type)
        .bind(code)
        .bind(&definition.frontend_label)
        .bind(definition.frontend_input.as_str())
        .bind(definition.is_required)
        .bind(definition.is_user_defined)
        .bind(definition.is_searchable)
        .bind(definition.is_filterable)
        .bind(definition.is_comparable)
        .bind(definition.visible_in_advanced_search)
        .bind(&definition.apply_to)
        .bind(definition.is_used_in_grid)
        .bind(definition.is_visible_in_grid)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to upsert attribute")?;

        let mut position: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM eav_attribute_option WHERE attribute_id = $1",
        )
        .bind(attribute_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to determine next option position")?;

        for value in &definition.option_values {
            let option_id: i64 = sqlx::query_scalar(
                "INSERT INTO eav_attribute_option (attribute_id, position) VALUES ($1, $2) RETURNING option_id",
            )
            .bind(attribute_id)
            .bind(position)
            .fetch_one(&mut *tx)
            .await
            .context("Failed to insert attribute option")?;

            sqlx::query(
                "INSERT INTO eav_attribute_option_value (option_id, store_id, value) VALUES ($1, 0, $2)",
            )
            .bind(option_id)
            .bind(value)
            .execute(&mut *tx)
            .await
            .context("Failed to insert attribute option value")?;

            position += 1;
        }

        tx.commit()
            .await
            .context("Failed to commit add_attribute transaction")?;

        Ok(())
    }

    async fn load_options(&self, attribute_id: AttributeId) -> Result<Vec<ExistingOption>> {
        let rows = sqlx::query(
            r#"
            SELECT o.option_id, v.value
            FROM eav_attribute_option o
            JOIN eav_attribute_option_value v
              ON v.option_id = o.option_id AND v.store_id = 0
            WHERE o.attribute_id = $1
            ORDER BY o.position ASC, o.option_id ASC
            "#,
        )
        .bind(attribute_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load attribute options")?;

        Ok(rows
            .into_iter()
            .map(|row| ExistingOption {
                id: row.get::<i64, _>("option_id"),
                value: row.get("value"),
            })
            .collect())
    }

    async fn save_attribute(&self, attribute: &Attribute, update: &AttributeUpdate) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin save_attribute transaction")?;

        sqlx::query(
            r#"
            UPDATE eav_attribute SET
                frontend_input = $2,
                swatch_input_type = $3,
                update_product_preview_image = $4,
                use_product_image_for_swatch = $5,
                updated_at = NOW()
            WHERE attribute_id = $1
            "#,
        )
        .bind(attribute.id)
        .bind(update.frontend_input.as_str())
        .bind(update.swatch_input_type.as_str())
        .bind(update.update_product_preview_image)
        .bind(update.use_product_image_for_swatch)
        .execute(&mut *tx)
        .await
        .context("Failed to update attribute")?;

        for (option_id, marker) in &update.options.marked_for_deletion {
            if marker.is_empty() {
                continue;
            }
            sqlx::query("DELETE FROM eav_attribute_option WHERE option_id = $1")
                .bind(*option_id)
                .execute(&mut *tx)
                .await
                .context("Failed to delete attribute option")?;
        }

        for (option_id, order) in &update.options.order {
            let position: i32 = order
                .parse()
                .with_context(|| format!("Non-numeric option order '{}'", order))?;
            sqlx::query("UPDATE eav_attribute_option SET position = $2 WHERE option_id = $1")
                .bind(*option_id)
                .bind(position)
                .execute(&mut *tx)
                .await
                .context("Failed to update option position")?;
        }

        for (option_id, values) in &update.options.values {
            let Some(value) = values.first() else {
                continue;
            };
            sqlx::query(
                r#"
                INSERT INTO eav_attribute_option_value (option_id, store_id, value)
                VALUES ($1, 0, $2)
                ON CONFLICT (option_id, store_id) DO UPDATE SET value = EXCLUDED.value
                "#,
            )
            .bind(*option_id)
            .bind(value)
            .execute(&mut *tx)
            .await
            .context("Failed to update option value")?;
        }

        for (option_id, swatch) in &update.options.visual_swatches {
            sqlx::query(
                r#"
                INSERT INTO eav_attribute_option_swatch (option_id, swatch_type, value)
                VALUES ($1, 'visual', $2)
                ON CONFLICT (option_id, swatch_type) DO UPDATE SET value = EXCLUDED.value
                "#,
            )
            .bind(*option_id)
            .bind(swatch)
            .execute(&mut *tx)
            .await
            .context("Failed to upsert visual swatch")?;
        }

        for (option_id, swatch) in &update.options.text_swatches {
            let Some(value) = swatch.first() else {
                continue;
            };
            sqlx::query(
                r#"
                INSERT INTO eav_attribute_option_swatch (option_id, swatch_type, value)
                VALUES ($1, 'text', $2)
                ON CONFLICT (option_id, swatch_type) DO UPDATE SET value = EXCLUDED.value
                "#,
            )
            .bind(*option_id)
            .bind(value)
            .execute(&mut *tx)
            .await
            .context("Failed to upsert text swatch")?;
        }

        tx.commit()
            .await
            .context("Failed to commit save_attribute transaction")?;

        self.cache.remove(&attribute.entity_type, &attribute.code).await;

        Ok(())
    }

    async fn clear_cache(&self) -> Result<()> {
        self.cache.clear().await;
        Ok(())
    }
}
