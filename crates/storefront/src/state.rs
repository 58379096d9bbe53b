//! Application state shared across handlers.
//!
//! Every hosted-service client is constructed once here, at startup, and
//! injected into handlers through this state. There are no lazily
//! initialized module globals; a test can build an `AppState` with exactly
//! the clients it wants (usually none).

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::services::{
    IdentityClient, IdentityError, SearchClient, SearchError, UserDataClient, UserDataError,
};

/// Error constructing application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("identity client: {0}")]
    Identity(#[from] IdentityError),
    #[error("search client: {0}")]
    Search(#[from] SearchError),
    #[error("user-data client: {0}")]
    UserData(#[from] UserDataError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    identity: Option<IdentityClient>,
    search: Option<SearchClient>,
    user_data: Option<UserDataClient>,
    catalog: Catalog,
}

impl AppState {
    /// Create application state, building a client for each hosted service
    /// that is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured client fails to construct.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let identity = config
            .identity
            .as_ref()
            .map(IdentityClient::new)
            .transpose()?;
        let search = config.search.as_ref().map(SearchClient::new).transpose()?;
        let user_data = config
            .user_data
            .as_ref()
            .map(UserDataClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                identity,
                search,
                user_data,
                catalog: Catalog::sample(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The identity provider client, when configured.
    #[must_use]
    pub fn identity(&self) -> Option<&IdentityClient> {
        self.inner.identity.as_ref()
    }

    /// The search index client, when configured.
    #[must_use]
    pub fn search(&self) -> Option<&SearchClient> {
        self.inner.search.as_ref()
    }

    /// The per-identity data store client, when configured.
    #[must_use]
    pub fn user_data(&self) -> Option<&UserDataClient> {
        self.inner.user_data.as_ref()
    }

    /// The in-process sample catalog (search-index fallback).
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }
}
