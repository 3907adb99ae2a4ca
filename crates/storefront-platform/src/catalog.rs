use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use storefront_core::{AssignedAttribute, Attribute, AttributeValue, Product, ProductVariant};
use storefront_search::{SearchIndexStore, SearchVector};
use tracing::error;
use uuid::Uuid;

use crate::contracts::ProductSearchHit;

const PRODUCT_ATTRIBUTES_SQL: &str = r#"
    SELECT
        apa.id AS assignment_id,
        apa.product_id AS owner_id,
        a.id AS attribute_id,
        a.slug AS attribute_slug,
        a.name AS attribute_name,
        a.input_type,
        a.unit,
        av.id AS value_id,
        av.name AS value_name,
        av.slug AS value_slug,
        av.rich_text,
        av.date_time
    FROM assigned_product_attribute apa
    JOIN attribute a ON a.id = apa.attribute_id
    LEFT JOIN assigned_product_attribute_value apav ON apav.assignment_id = apa.id
    LEFT JOIN attribute_value av ON av.id = apav.value_id
    WHERE apa.product_id = ANY($1)
    ORDER BY apa.product_id, apa.sort_order NULLS LAST, apa.id, apav.sort_order NULLS LAST, av.id
"#;

const VARIANT_ATTRIBUTES_SQL: &str = r#"
    SELECT
        ava.id AS assignment_id,
        ava.variant_id AS owner_id,
        a.id AS attribute_id,
        a.slug AS attribute_slug,
        a.name AS attribute_name,
        a.input_type,
        a.unit,
        av.id AS value_id,
        av.name AS value_name,
        av.slug AS value_slug,
        av.rich_text,
        av.date_time
    FROM assigned_variant_attribute ava
    JOIN product_variant v ON v.id = ava.variant_id
    JOIN attribute a ON a.id = ava.attribute_id
    LEFT JOIN assigned_variant_attribute_value avav ON avav.assignment_id = ava.id
    LEFT JOIN attribute_value av ON av.id = avav.value_id
    WHERE v.product_id = ANY($1)
    ORDER BY ava.variant_id, ava.sort_order NULLS LAST, ava.id, avav.sort_order NULLS LAST, av.id
"#;

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    text_config: String,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool, text_config: impl Into<String>) -> Self {
        Self {
            pool,
            text_config: text_config.into(),
        }
    }

    /// Ranked full-text search over `search_vector`. A blank query lists
    /// products by name without filtering.
    pub async fn search_products(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<ProductSearchHit>> {
        let rows = if query.trim().is_empty() {
            sqlx::query(
                r#"
                SELECT id, name, NULL::real AS search_rank
                FROM product
                ORDER BY name, id
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                SELECT
                    id,
                    name,
                    ts_rank(search_vector, websearch_to_tsquery($1::regconfig, $2)) AS search_rank
                FROM product
                WHERE search_vector @@ websearch_to_tsquery($1::regconfig, $2)
                ORDER BY search_rank DESC, name, id
                LIMIT $3
                "#,
            )
            .bind(&self.text_config)
            .bind(query.trim())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        rows.iter()
            .map(|row| -> Result<ProductSearchHit> {
                Ok(ProductSearchHit {
                    product_id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    search_rank: row.try_get("search_rank")?,
                })
            })
            .collect()
    }

    async fn load_assigned_attributes(
        &self,
        sql: &str,
        product_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<AssignedAttribute>>> {
        let rows = sqlx::query(sql)
            .bind(product_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_owner: HashMap<Uuid, Vec<AssignedAttribute>> = HashMap::new();
        let mut current_assignment: Option<Uuid> = None;

        for row in rows {
            let assignment_id: Uuid = row.try_get("assignment_id")?;
            let owner_id: Uuid = row.try_get("owner_id")?;
            let assigned = by_owner.entry(owner_id).or_default();

            if current_assignment != Some(assignment_id) {
                current_assignment = Some(assignment_id);
                let input_type: String = row.try_get("input_type")?;
                assigned.push(AssignedAttribute {
                    attribute: Attribute {
                        id: row.try_get("attribute_id")?,
                        slug: row.try_get("attribute_slug")?,
                        name: row.try_get("attribute_name")?,
                        input_type: input_type.parse()?,
                        unit: row.try_get("unit")?,
                    },
                    values: Vec::new(),
                });
            }

            let Some(value_id) = row.try_get::<Option<Uuid>, _>("value_id")? else {
                continue;
            };
            if let Some(attribute) = assigned.last_mut() {
                attribute.values.push(AttributeValue {
                    id: value_id,
                    name: row.try_get("value_name")?,
                    slug: row.try_get("value_slug")?,
                    rich_text: row.try_get("rich_text")?,
                    date_time: row.try_get("date_time")?,
                });
            }
        }

        Ok(by_owner)
    }
}

#[async_trait]
impl SearchIndexStore for PgCatalogStore {
    async fn products_for_indexing(&self, product_ids: &[Uuid]) -> Result<Vec<Product>> {
        let product_rows = sqlx::query(
            r#"
            SELECT
                id,
                name,
                description,
                COALESCE(description_plaintext, '') AS description_plaintext
            FROM product
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
        .context("failed to load products for indexing")?;

        let variant_rows = sqlx::query(
            r#"
            SELECT id, product_id, sku, name
            FROM product_variant
            WHERE product_id = ANY($1)
            ORDER BY product_id, sort_order NULLS LAST, id
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
        .context("failed to load product variants for indexing")?;

        let mut product_attributes = self
            .load_assigned_attributes(PRODUCT_ATTRIBUTES_SQL, product_ids)
            .await?;
        let mut variant_attributes = self
            .load_assigned_attributes(VARIANT_ATTRIBUTES_SQL, product_ids)
            .await?;

        let mut variants: HashMap<Uuid, Vec<ProductVariant>> = HashMap::new();
        for row in variant_rows {
            let id: Uuid = row.try_get("id")?;
            let product_id: Uuid = row.try_get("product_id")?;
            variants.entry(product_id).or_default().push(ProductVariant {
                id,
                sku: row.try_get("sku")?,
                name: row.try_get("name")?,
                attributes: variant_attributes.remove(&id).unwrap_or_default(),
            });
        }

        product_rows
            .iter()
            .map(|row| -> Result<Product> {
                let id: Uuid = row.try_get("id")?;
                Ok(Product {
                    id,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    description_plaintext: row.try_get("description_plaintext")?,
                    attributes: product_attributes.remove(&id).unwrap_or_default(),
                    variants: variants.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn save_search_index(
        &self,
        product_id: Uuid,
        search_document: &str,
        search_vector: &SearchVector,
    ) -> Result<()> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE product SET search_document = ");
        query.push_bind(search_document.to_string());
        query.push(", search_vector = ");
        push_search_vector(&mut query, &self.text_config, search_vector);
        query.push(", updated_at = NOW() WHERE id = ");
        query.push_bind(product_id);

        query
            .build()
            .execute(&self.pool)
            .await
            .inspect_err(|err| error!(%product_id, "failed to save search index: {err}"))?;

        Ok(())
    }
}

/// Appends the weighted `tsvector` expression for `vector`.
pub fn push_search_vector(
    query: &mut QueryBuilder<'_, Postgres>,
    text_config: &str,
    vector: &SearchVector,
) {
    if vector.is_empty() {
        query.push("''::tsvector");
        return;
    }

    for (index, term) in vector.terms().iter().enumerate() {
        if index > 0 {
            query.push(" || ");
        }
        query.push("setweight(to_tsvector(");
        query.push_bind(text_config.to_string());
        query.push("::regconfig, ");
        query.push_bind(term.text.clone());
        query.push("), '");
        query.push(term.weight.as_str());
        query.push("')");
    }
}

#[cfg(test)]
mod tests {
    use storefront_search::SearchWeight;

    use super::*;

    #[test]
    fn weighted_terms_become_setweight_expressions() {
        let mut vector = SearchVector::new();
        vector.push("Summer Tee", SearchWeight::A);
        vector.push("cotton", SearchWeight::B);

        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        push_search_vector(&mut query, "simple", &vector);

        assert_eq!(
            query.sql(),
            "SELECT setweight(to_tsvector($1::regconfig, $2), 'A') \
             || setweight(to_tsvector($3::regconfig, $4), 'B')"
        );
    }

    #[test]
    fn empty_vector_is_empty_tsvector() {
        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        push_search_vector(&mut query, "simple", &SearchVector::new());

        assert_eq!(query.sql(), "SELECT ''::tsvector");
    }
}
