//! Seed the hosted search index with the sample catalog.

use renewly_storefront::catalog::sample_products;
use renewly_storefront::config::StorefrontConfig;
use renewly_storefront::services::SearchClient;

/// Push the sample catalog into the products index.
///
/// # Errors
///
/// Fails when the search service is not configured or the push is rejected.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let search_config = config
        .search
        .as_ref()
        .ok_or("SEARCH_URL / SEARCH_API_KEY not configured")?;

    let client = SearchClient::new(search_config)?;
    let products = sample_products();
    client.add_documents(&products).await?;

    tracing::info!(count = products.len(), "catalog pushed to the products index");
    Ok(())
}
