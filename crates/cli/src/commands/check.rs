//! Validate configuration and probe each hosted collaborator.

use renewly_storefront::config::StorefrontConfig;
use renewly_storefront::services::SearchClient;

/// Report which hosted services are configured and whether the search
/// service answers its health endpoint.
///
/// # Errors
///
/// Fails when the configuration itself is invalid; unreachable services are
/// reported, not fatal, matching the storefront's degrade-don't-die policy.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!(configured = config.identity.is_some(), "identity provider");
    tracing::info!(configured = config.user_data.is_some(), "user data store");

    match &config.search {
        None => tracing::info!(configured = false, "search index"),
        Some(search_config) => {
            let client = SearchClient::new(search_config)?;
            match client.health().await {
                Ok(()) => tracing::info!(configured = true, reachable = true, "search index"),
                Err(error) => {
                    tracing::warn!(configured = true, reachable = false, %error, "search index");
                }
            }
        }
    }

    Ok(())
}
