//! Wishlist store, plus the per-product alert preferences that ride along
//! with it.
//!
//! The remote record keeps only product ids; product details are resolved
//! through the catalog when remote-only entries appear during sign-in sync.
//! Alert preferences are session-only and never synchronized.

use tower_sessions::Session;
use tracing::warn;

use renewly_core::ProductId;
use renewly_core::collections::{AlertBook, AlertPreference, WishItem, WishlistState};
use renewly_core::sync::{SyncOutcome, plan_additive_merge};

use crate::catalog::{Catalog, Product};
use crate::models::CurrentUser;
use crate::models::session::session_keys;
use crate::services::UserDataClient;
use crate::stores::{StoreError, load_collection, save_collection};

/// The wishlist store for one request.
pub struct WishlistStore<'a> {
    session: &'a Session,
    user: Option<CurrentUser>,
    remote: Option<&'a UserDataClient>,
    catalog: &'a Catalog,
}

impl<'a> WishlistStore<'a> {
    /// Bind the store to a session plus its collaborators.
    #[must_use]
    pub const fn new(
        session: &'a Session,
        user: Option<CurrentUser>,
        remote: Option<&'a UserDataClient>,
        catalog: &'a Catalog,
    ) -> Self {
        Self {
            session,
            user,
            remote,
            catalog,
        }
    }

    /// Load the wishlist from the session.
    pub async fn load(&self) -> WishlistState {
        load_collection(self.session, session_keys::WISHLIST).await
    }

    async fn persist(&self, state: &WishlistState) {
        save_collection(self.session, session_keys::WISHLIST, state).await;
    }

    fn remote_pair(&self) -> Option<(&CurrentUser, &'a UserDataClient)> {
        match (&self.user, self.remote) {
            (Some(user), Some(remote)) => Some((user, remote)),
            _ => None,
        }
    }

    /// Reconcile the session wishlist with the remote record after sign-in.
    ///
    /// Local-only entries are pushed; remote-only ids are materialized from
    /// the catalog where possible. On fetch failure the prior state is left
    /// unchanged.
    pub async fn sync_on_sign_in(&self) -> (WishlistState, SyncOutcome) {
        let local = self.load().await;
        let Some((user, remote)) = self.remote_pair() else {
            return (local, SyncOutcome::LocalOnly);
        };

        let remote_entries = match remote.get_wishlist(&user.id).await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(%error, "wishlist sync: remote fetch failed, staying local");
                return (local, SyncOutcome::RemoteFailed);
            }
        };

        let remote_items: Vec<WishItem> = remote_entries
            .iter()
            .filter_map(|entry| {
                local
                    .items()
                    .iter()
                    .find(|item| item.product_id == entry.product_id)
                    .cloned()
                    .or_else(|| {
                        self.catalog
                            .get(&entry.product_id)
                            .map(wish_item_from_product)
                    })
            })
            .collect();

        let plan = plan_additive_merge(local.items(), &remote_items, |item| {
            item.product_id.clone()
        });

        let mut outcome = SyncOutcome::Synced;
        for item in &plan.to_push {
            if let Err(error) = remote.add_wishlist_entry(&user.id, &item.product_id).await {
                warn!(%error, product = %item.product_id, "wishlist sync: push failed");
                outcome = SyncOutcome::RemoteFailed;
            }
        }

        let merged = WishlistState::from_items(plan.merged);
        self.persist(&merged).await;
        (merged, outcome)
    }

    /// Add a product; a duplicate is a no-op (and no remote write happens).
    pub async fn add(&self, product: &Product) -> (WishlistState, SyncOutcome) {
        let mut state = self.load().await;
        let added = state.add(wish_item_from_product(product));
        self.persist(&state).await;

        let outcome = match (added, self.remote_pair()) {
            (_, None) => SyncOutcome::LocalOnly,
            (false, Some(_)) => SyncOutcome::Synced,
            (true, Some((user, remote))) => {
                match remote.add_wishlist_entry(&user.id, &product.id).await {
                    Ok(_) => SyncOutcome::Synced,
                    Err(error) => {
                        warn!(%error, product = %product.id, "wishlist: remote insert failed");
                        SyncOutcome::RemoteFailed
                    }
                }
            }
        };
        (state, outcome)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WishlistEntryNotFound`] when the product is not
    /// wishlisted.
    pub async fn remove(
        &self,
        product_id: &ProductId,
    ) -> Result<(WishlistState, SyncOutcome), StoreError> {
        let mut state = self.load().await;
        if !state.remove(product_id) {
            return Err(StoreError::WishlistEntryNotFound(product_id.clone()));
        }
        self.persist(&state).await;

        let outcome = match self.remote_pair() {
            None => SyncOutcome::LocalOnly,
            Some((user, remote)) => {
                match remote.remove_wishlist_entry(&user.id, product_id).await {
                    Ok(()) => SyncOutcome::Synced,
                    Err(error) => {
                        warn!(%error, product = %product_id, "wishlist: remote delete failed");
                        SyncOutcome::RemoteFailed
                    }
                }
            }
        };
        Ok((state, outcome))
    }

    /// Remove every item. Remote entries are deleted one by one, matching
    /// the record-per-entry shape of the remote store.
    pub async fn clear(&self) -> (WishlistState, SyncOutcome) {
        let state = self.load().await;
        let product_ids: Vec<ProductId> = state
            .items()
            .iter()
            .map(|item| item.product_id.clone())
            .collect();

        let mut cleared = state;
        cleared.clear();
        self.persist(&cleared).await;

        let outcome = match self.remote_pair() {
            None => SyncOutcome::LocalOnly,
            Some((user, remote)) => {
                let mut outcome = SyncOutcome::Synced;
                for product_id in &product_ids {
                    if let Err(error) = remote.remove_wishlist_entry(&user.id, product_id).await {
                        warn!(%error, product = %product_id, "wishlist clear: remote delete failed");
                        outcome = SyncOutcome::RemoteFailed;
                    }
                }
                outcome
            }
        };
        (cleared, outcome)
    }

    /// Alert preferences for a product (defaults when never saved).
    pub async fn alert_preference(&self, product_id: &ProductId) -> AlertPreference {
        let book: AlertBook = load_collection(self.session, session_keys::WISHLIST_ALERTS).await;
        book.get(product_id)
    }

    /// Save alert preferences for a product. Session-only by design.
    pub async fn set_alert_preference(&self, product_id: ProductId, preference: AlertPreference) {
        let mut book: AlertBook =
            load_collection(self.session, session_keys::WISHLIST_ALERTS).await;
        book.set(product_id, preference);
        save_collection(self.session, session_keys::WISHLIST_ALERTS, &book).await;
    }
}

/// Convert a catalog product into a wishlist item.
fn wish_item_from_product(product: &Product) -> WishItem {
    WishItem {
        product_id: product.id.clone(),
        title: product.title.clone(),
        brand: product.brand.clone(),
        image: product.image.clone(),
        price: product.price,
    }
}
