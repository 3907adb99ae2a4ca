use async_trait::async_trait;
use storefront_core::Product;
use tracing::info;
use uuid::Uuid;

use crate::document::prepare_product_search_document_value;
use crate::vector::{SearchVector, prepare_product_search_vector_value};

#[async_trait]
pub trait SearchIndexStore: Send + Sync {
    /// Products with attributes and variants loaded, attributes and values in
    /// assignment order.
    async fn products_for_indexing(&self, product_ids: &[Uuid]) -> anyhow::Result<Vec<Product>>;

    /// Writes `search_document`, `search_vector` and bumps `updated_at`.
    async fn save_search_index(
        &self,
        product_id: Uuid,
        search_document: &str,
        search_vector: &SearchVector,
    ) -> anyhow::Result<()>;
}

/// Recomputes the search index of the given products and returns how many
/// were found and updated.
pub async fn update_products_search_document<S>(
    store: &S,
    product_ids: &[Uuid],
) -> anyhow::Result<usize>
where
    S: SearchIndexStore + ?Sized,
{
    if product_ids.is_empty() {
        return Ok(0);
    }

    let products = store.products_for_indexing(product_ids).await?;
    for product in &products {
        let search_document = prepare_product_search_document_value(product);
        let search_vector = prepare_product_search_vector_value(product);
        store
            .save_search_index(product.id, &search_document, &search_vector)
            .await?;
    }

    info!(
        requested = product_ids.len(),
        updated = products.len(),
        "updated product search index"
    );
    Ok(products.len())
}

pub async fn update_product_search_document<S>(store: &S, product_id: Uuid) -> anyhow::Result<bool>
where
    S: SearchIndexStore + ?Sized,
{
    let updated = update_products_search_document(store, &[product_id]).await?;
    Ok(updated > 0)
}
