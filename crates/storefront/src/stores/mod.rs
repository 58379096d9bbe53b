//! Session-backed state containers.
//!
//! Each store binds a pure collection from `renewly_core` to its fixed
//! session key and, for cart/wishlist/compare, to the remote per-identity
//! record. The policy is uniform:
//!
//! 1. Load from the session synchronously; corrupt data loads as empty.
//! 2. On sign-in, fetch the remote record and merge additively; local-only
//!    entries are pushed, remote entries are never deleted by the merge.
//! 3. Signed out, everything is session-only.
//! 4. Mutations are optimistic: session state is written first, the remote
//!    write is best-effort, and its result is reported as a
//!    [`renewly_core::sync::SyncOutcome`] rather than rolled back.

pub mod cart;
pub mod compare;
pub mod quotes;
pub mod wishlist;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tower_sessions::Session;

use renewly_core::{ProductId, sync};

use crate::error::AppError;

/// Typed not-found failures from store mutations.
///
/// These used to fail silently upstream; here they are explicit so the JSON
/// surface (and tests) can see them, even where a UI would ignore them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The cart has no line for this product.
    #[error("no cart line for product {0}")]
    CartLineNotFound(ProductId),
    /// The wishlist has no entry for this product.
    #[error("product {0} is not on the wishlist")]
    WishlistEntryNotFound(ProductId),
    /// The comparison has no entry for this product.
    #[error("product {0} is not under comparison")]
    CompareEntryNotFound(ProductId),
    /// No saved comparison set with this name.
    #[error("no saved comparison named {0:?}")]
    SavedSetNotFound(String),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        Self::NotFound(error.to_string())
    }
}

/// Load a collection from its session key, treating missing or corrupt data
/// as empty.
pub(crate) async fn load_collection<T>(session: &Session, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match session.get::<serde_json::Value>(key).await {
        Ok(raw) => sync::fail_soft(raw),
        Err(error) => {
            tracing::warn!(key, %error, "failed to read session state, starting empty");
            T::default()
        }
    }
}

/// Persist a collection under its session key. Failures are logged, never
/// surfaced; the in-memory copy remains the working state.
pub(crate) async fn save_collection<T>(session: &Session, key: &str, value: &T)
where
    T: Serialize,
{
    if let Err(error) = session.insert(key, value).await {
        tracing::warn!(key, %error, "failed to persist session state");
    }
}
