//! Compare store: a capped tray of products plus named saved sets.
//!
//! Guests get their own session key so a visitor's tray survives until they
//! sign in; the signed-in tray mirrors to the remote record. Saved sets stay
//! with whichever tray they were created on and are never synchronized.

use tower_sessions::Session;
use tracing::warn;

use renewly_core::ProductId;
use renewly_core::collections::{CompareAddOutcome, CompareItem, CompareState};
use renewly_core::sync::{SyncOutcome, plan_additive_merge};

use crate::catalog::{Catalog, Product};
use crate::models::CurrentUser;
use crate::models::session::session_keys;
use crate::services::UserDataClient;
use crate::stores::{StoreError, load_collection, save_collection};

/// The compare store for one request.
pub struct CompareStore<'a> {
    session: &'a Session,
    user: Option<CurrentUser>,
    remote: Option<&'a UserDataClient>,
    catalog: &'a Catalog,
}

impl<'a> CompareStore<'a> {
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

    /// The session key for the active tray: signed-in and guest visitors
    /// keep separate trays.
    fn key(&self) -> &'static str {
        if self.user.is_some() {
            session_keys::COMPARE
        } else {
            session_keys::COMPARE_GUEST
        }
    }

    /// Load the active tray from the session.
    pub async fn load(&self) -> CompareState {
        load_collection(self.session, self.key()).await
    }

    async fn persist(&self, state: &CompareState) {
        save_collection(self.session, self.key(), state).await;
    }

    fn remote_pair(&self) -> Option<(&CurrentUser, &'a UserDataClient)> {
        match (&self.user, self.remote) {
            (Some(user), Some(remote)) => Some((user, remote)),
            _ => None,
        }
    }

    /// Reconcile the signed-in tray with the remote record after sign-in.
    ///
    /// The guest tray is merged in (additively, capped at four) and pushed;
    /// on fetch failure the prior in-memory state is left unchanged.
    pub async fn sync_on_sign_in(&self) -> (CompareState, SyncOutcome) {
        let Some((user, remote)) = self.remote_pair() else {
            return (self.load().await, SyncOutcome::LocalOnly);
        };

        // Guest selections made before signing in count as local state.
        let signed_in: CompareState = load_collection(self.session, session_keys::COMPARE).await;
        let guest: CompareState =
            load_collection(self.session, session_keys::COMPARE_GUEST).await;
        let mut local_items: Vec<CompareItem> = signed_in.items().to_vec();
        for item in guest.items() {
            if !local_items
                .iter()
                .any(|existing| existing.product_id == item.product_id)
            {
                local_items.push(item.clone());
            }
        }

        let remote_entries = match remote.get_compare(&user.id).await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(%error, "compare sync: remote fetch failed, staying local");
                return (signed_in, SyncOutcome::RemoteFailed);
            }
        };

        let remote_items: Vec<CompareItem> = remote_entries
            .iter()
            .filter_map(|entry| {
                local_items
                    .iter()
                    .find(|item| item.product_id == entry.product_id)
                    .cloned()
                    .or_else(|| {
                        self.catalog
                            .get(&entry.product_id)
                            .map(compare_item_from_product)
                    })
            })
            .collect();

        let plan = plan_additive_merge(&local_items, &remote_items, |item| {
            item.product_id.clone()
        });

        let merged = CompareState::from_items(plan.merged, signed_in.saved().to_vec());

        let mut outcome = SyncOutcome::Synced;
        for item in &plan.to_push {
            // Entries squeezed out by the cap are not pushed.
            if !merged.contains(&item.product_id) {
                continue;
            }
            if let Err(error) = remote.add_compare_entry(&user.id, &item.product_id).await {
                warn!(%error, product = %item.product_id, "compare sync: push failed");
                outcome = SyncOutcome::RemoteFailed;
            }
        }

        save_collection(self.session, session_keys::COMPARE, &merged).await;
        (merged, outcome)
    }

    /// Add a product to the tray. Duplicates and adds beyond the cap are
    /// silently ignored (no remote write either way).
    pub async fn add(
        &self,
        product: &Product,
    ) -> (CompareState, CompareAddOutcome, SyncOutcome) {
        let mut state = self.load().await;
        let added = state.add(compare_item_from_product(product));
        self.persist(&state).await;

        let outcome = match (added, self.remote_pair()) {
            (_, None) => SyncOutcome::LocalOnly,
            (CompareAddOutcome::Added, Some((user, remote))) => {
                match remote.add_compare_entry(&user.id, &product.id).await {
                    Ok(_) => SyncOutcome::Synced,
                    Err(error) => {
                        warn!(%error, product = %product.id, "compare: remote insert failed");
                        SyncOutcome::RemoteFailed
                    }
                }
            }
            // Nothing changed locally, nothing to mirror.
            (_, Some(_)) => SyncOutcome::Synced,
        };
        (state, added, outcome)
    }

    /// Remove a product from the tray.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CompareEntryNotFound`] when the product is not
    /// in the tray.
    pub async fn remove(
        &self,
        product_id: &ProductId,
    ) -> Result<(CompareState, SyncOutcome), StoreError> {
        let mut state = self.load().await;
        if !state.remove(product_id) {
            return Err(StoreError::CompareEntryNotFound(product_id.clone()));
        }
        self.persist(&state).await;

        let outcome = match self.remote_pair() {
            None => SyncOutcome::LocalOnly,
            Some((user, remote)) => {
                match remote.remove_compare_entry(&user.id, product_id).await {
                    Ok(()) => SyncOutcome::Synced,
                    Err(error) => {
                        warn!(%error, product = %product_id, "compare: remote delete failed");
                        SyncOutcome::RemoteFailed
                    }
                }
            }
        };
        Ok((state, outcome))
    }

    /// Empty the tray (saved sets are kept).
    pub async fn clear(&self) -> (CompareState, SyncOutcome) {
        let mut state = self.load().await;
        state.clear();
        self.persist(&state).await;

        let outcome = match self.remote_pair() {
            None => SyncOutcome::LocalOnly,
            Some((user, remote)) => match remote.clear_compare(&user.id).await {
                Ok(()) => SyncOutcome::Synced,
                Err(error) => {
                    warn!(%error, "compare clear: remote delete failed");
                    SyncOutcome::RemoteFailed
                }
            },
        };
        (state, outcome)
    }

    /// Snapshot the current tray under a name (session-only). The second
    /// element is `false` when the name is blank and nothing was saved.
    pub async fn save_set(&self, name: &str) -> (CompareState, bool) {
        let mut state = self.load().await;
        let saved = state.save_set(name);
        if saved {
            self.persist(&state).await;
        }
        (state, saved)
    }

    /// Delete a saved set by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SavedSetNotFound`] when no set has this name.
    pub async fn remove_set(&self, name: &str) -> Result<CompareState, StoreError> {
        let mut state = self.load().await;
        if !state.remove_set(name) {
            return Err(StoreError::SavedSetNotFound(name.to_owned()));
        }
        self.persist(&state).await;
        Ok(state)
    }
}

/// Convert a catalog product into a compare item.
fn compare_item_from_product(product: &Product) -> CompareItem {
    CompareItem {
        product_id: product.id.clone(),
        title: product.title.clone(),
        brand: product.brand.clone(),
        image: product.image.clone(),
        price: product.price,
    }
}
