//! Cart store: session-backed, opportunistically mirrored to the remote
//! per-identity record.

use tower_sessions::Session;
use tracing::warn;

use renewly_core::ProductId;
use renewly_core::collections::{CartLine, CartState};
use renewly_core::sync::{SyncOutcome, plan_additive_merge};

use crate::catalog::Product;
use crate::models::session::{current_user, session_keys};
use crate::models::CurrentUser;
use crate::services::UserDataClient;
use crate::services::user_data::{NewRemoteCartLine, RemoteCartLine};
use crate::stores::{StoreError, load_collection, save_collection};

/// The cart store for one request.
pub struct CartStore<'a> {
    session: &'a Session,
    user: Option<CurrentUser>,
    remote: Option<&'a UserDataClient>,
}

impl<'a> CartStore<'a> {
    /// Bind the store to a session, plus the identity and remote client when
    /// present.
    #[must_use]
    pub const fn new(
        session: &'a Session,
        user: Option<CurrentUser>,
        remote: Option<&'a UserDataClient>,
    ) -> Self {
        Self {
            session,
            user,
            remote,
        }
    }

    /// Load the cart from the session. Missing or corrupt data is an empty
    /// cart.
    pub async fn load(&self) -> CartState {
        load_collection(self.session, session_keys::CART).await
    }

    async fn persist(&self, state: &CartState) {
        save_collection(self.session, session_keys::CART, state).await;
    }

    /// Identity and client, when both are available.
    fn remote_pair(&self) -> Option<(&CurrentUser, &'a UserDataClient)> {
        match (&self.user, self.remote) {
            (Some(user), Some(remote)) => Some((user, remote)),
            _ => None,
        }
    }

    /// Whether the identity captured at operation start is still the
    /// session's identity. Writes that complete after a sign-out are
    /// ignored rather than cancelled.
    async fn identity_still_current(&self, user: &CurrentUser) -> bool {
        current_user(self.session)
            .await
            .is_some_and(|current| current.id == user.id)
    }

    /// Reconcile the session cart with the remote record after sign-in.
    ///
    /// Remote entries win on overlap; local-only lines are pushed (additive
    /// merge, nothing remote is deleted). On fetch failure the session cart
    /// is kept as-is.
    pub async fn sync_on_sign_in(&self) -> (CartState, SyncOutcome) {
        let local = self.load().await;
        let Some((user, remote)) = self.remote_pair() else {
            return (local, SyncOutcome::LocalOnly);
        };

        let remote_lines = match remote.get_cart(&user.id).await {
            Ok(lines) => lines,
            Err(error) => {
                warn!(%error, "cart sync: remote fetch failed, staying local");
                return (local, SyncOutcome::RemoteFailed);
            }
        };

        let remote_as_local: Vec<CartLine> =
            remote_lines.into_iter().map(cart_line_from_remote).collect();
        let plan = plan_additive_merge(local.lines(), &remote_as_local, |line| {
            line.product_id.clone()
        });

        let mut outcome = SyncOutcome::Synced;
        let mut merged = CartState::from_lines(plan.merged);
        for line in &plan.to_push {
            let push = NewRemoteCartLine {
                user_id: &user.id,
                product_id: &line.product_id,
                quantity: line.quantity,
                product_title: &line.title,
                product_brand: &line.brand,
                product_image: &line.image,
                product_price: line.unit_price,
            };
            match remote.add_cart_line(&push).await {
                Ok(row) => {
                    merged.add(CartLine {
                        remote_line_id: Some(row.id),
                        quantity: 0,
                        ..line.clone()
                    });
                }
                Err(error) => {
                    warn!(%error, product = %line.product_id, "cart sync: push failed");
                    outcome = SyncOutcome::RemoteFailed;
                }
            }
        }

        if self.identity_still_current(user).await {
            self.persist(&merged).await;
            (merged, outcome)
        } else {
            (local, outcome)
        }
    }

    /// Add `quantity` units of a product. An existing line for the product
    /// is incremented, never duplicated.
    pub async fn add(&self, product: &Product, quantity: u32) -> (CartState, SyncOutcome) {
        let mut state = self.load().await;
        state.add(CartLine {
            product_id: product.id.clone(),
            title: product.title.clone(),
            brand: product.brand.clone(),
            image: product.image.clone(),
            unit_price: product.price,
            quantity: quantity.max(1),
            remote_line_id: None,
        });
        self.persist(&state).await;

        let outcome = self.push_line(&mut state, &product.id).await;
        (state, outcome)
    }

    /// Set the quantity of an existing line (clamped to one).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CartLineNotFound`] when the product is not in
    /// the cart; nothing is mutated.
    pub async fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(CartState, SyncOutcome), StoreError> {
        let mut state = self.load().await;
        if !state.set_quantity(product_id, quantity) {
            return Err(StoreError::CartLineNotFound(product_id.clone()));
        }
        self.persist(&state).await;

        let outcome = self.push_line(&mut state, product_id).await;
        Ok((state, outcome))
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CartLineNotFound`] when the product is not in
    /// the cart.
    pub async fn remove(
        &self,
        product_id: &ProductId,
    ) -> Result<(CartState, SyncOutcome), StoreError> {
        let mut state = self.load().await;
        let removed_remote_id = state.get(product_id).and_then(|line| line.remote_line_id.clone());
        if !state.remove(product_id) {
            return Err(StoreError::CartLineNotFound(product_id.clone()));
        }
        self.persist(&state).await;

        let outcome = match (self.remote_pair(), removed_remote_id) {
            (None, _) => SyncOutcome::LocalOnly,
            (Some(_), None) => SyncOutcome::Synced,
            (Some((_, remote)), Some(remote_id)) => match remote.remove_cart_line(&remote_id).await
            {
                Ok(()) => SyncOutcome::Synced,
                Err(error) => {
                    warn!(%error, product = %product_id, "cart remove: remote delete failed");
                    SyncOutcome::RemoteFailed
                }
            },
        };
        Ok((state, outcome))
    }

    /// Remove every line.
    pub async fn clear(&self) -> (CartState, SyncOutcome) {
        let mut state = self.load().await;
        state.clear();
        self.persist(&state).await;

        let outcome = match self.remote_pair() {
            None => SyncOutcome::LocalOnly,
            Some((user, remote)) => match remote.clear_cart(&user.id).await {
                Ok(()) => SyncOutcome::Synced,
                Err(error) => {
                    warn!(%error, "cart clear: remote delete failed");
                    SyncOutcome::RemoteFailed
                }
            },
        };
        (state, outcome)
    }

    /// Mirror one line's current quantity to the remote record, inserting
    /// the row if the line has no remote id yet. Folds the assigned remote
    /// id back into the session only while the same identity is signed in.
    async fn push_line(&self, state: &mut CartState, product_id: &ProductId) -> SyncOutcome {
        let Some((user, remote)) = self.remote_pair() else {
            return SyncOutcome::LocalOnly;
        };
        let Some(line) = state.get(product_id).cloned() else {
            return SyncOutcome::Synced;
        };

        if let Some(remote_id) = &line.remote_line_id {
            match remote.set_cart_quantity(remote_id, line.quantity).await {
                Ok(()) => SyncOutcome::Synced,
                Err(error) => {
                    warn!(%error, product = %product_id, "cart: remote quantity update failed");
                    SyncOutcome::RemoteFailed
                }
            }
        } else {
            let push = NewRemoteCartLine {
                user_id: &user.id,
                product_id: &line.product_id,
                quantity: line.quantity,
                product_title: &line.title,
                product_brand: &line.brand,
                product_image: &line.image,
                product_price: line.unit_price,
            };
            match remote.add_cart_line(&push).await {
                Ok(row) => {
                    if self.identity_still_current(user).await {
                        if let Some(stored) = state
                            .lines()
                            .iter()
                            .position(|candidate| &candidate.product_id == product_id)
                        {
                            let mut lines: Vec<CartLine> = state.lines().to_vec();
                            if let Some(entry) = lines.get_mut(stored) {
                                entry.remote_line_id = Some(row.id);
                            }
                            *state = CartState::from_lines(lines);
                            self.persist(state).await;
                        }
                    }
                    SyncOutcome::Synced
                }
                Err(error) => {
                    warn!(%error, product = %product_id, "cart: remote insert failed");
                    SyncOutcome::RemoteFailed
                }
            }
        }
    }
}

/// Convert a remote cart row into a local line.
fn cart_line_from_remote(row: RemoteCartLine) -> CartLine {
    CartLine {
        product_id: row.product_id,
        title: row.product_title,
        brand: row.product_brand,
        image: row.product_image,
        unit_price: row.product_price,
        quantity: row.quantity.max(1),
        remote_line_id: Some(row.id),
    }
}
