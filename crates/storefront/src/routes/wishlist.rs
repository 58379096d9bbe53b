//! Wishlist route handlers, including per-product alert preferences.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use renewly_core::ProductId;
use renewly_core::collections::{AlertPreference, WishItem, WishlistState};
use renewly_core::sync::SyncOutcome;

use crate::error::{AppError, Result};
use crate::models::session::current_user;
use crate::routes::products::resolve_product;
use crate::state::AppState;
use crate::stores::wishlist::WishlistStore;

/// Wishlist display data.
#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub items: Vec<WishItem>,
    pub sync: SyncOutcome,
}

fn view(state: WishlistState, sync: SyncOutcome) -> WishlistView {
    WishlistView {
        items: state.items().to_vec(),
        sync,
    }
}

async fn store<'a>(state: &'a AppState, session: &'a Session) -> WishlistStore<'a> {
    WishlistStore::new(
        session,
        current_user(session).await,
        state.user_data(),
        state.catalog(),
    )
}

/// Product reference request body.
#[derive(Debug, Deserialize)]
pub struct ProductRefBody {
    pub product_id: ProductId,
}

/// Display the wishlist.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Json<WishlistView> {
    let wishlist = store(&state, &session).await.load().await;
    Json(view(wishlist, SyncOutcome::LocalOnly))
}

/// Add a product to the wishlist (duplicate adds are no-ops).
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<ProductRefBody>,
) -> Result<Json<WishlistView>> {
    let product = resolve_product(&state, &body.product_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {}", body.product_id)))?;

    let (wishlist, sync) = store(&state, &session).await.add(&product).await;
    Ok(Json(view(wishlist, sync)))
}

/// Remove a product from the wishlist.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<ProductRefBody>,
) -> Result<Json<WishlistView>> {
    let (wishlist, sync) = store(&state, &session)
        .await
        .remove(&body.product_id)
        .await?;
    Ok(Json(view(wishlist, sync)))
}

/// Empty the wishlist.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Json<WishlistView> {
    let (wishlist, sync) = store(&state, &session).await.clear().await;
    Json(view(wishlist, sync))
}

/// Alert preferences payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct AlertView {
    pub product_id: ProductId,
    #[serde(flatten)]
    pub preference: AlertPreference,
}

/// Alert preferences for a product (defaults if never saved).
#[instrument(skip(state, session))]
pub async fn get_alerts(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Json<AlertView> {
    let preference = store(&state, &session).await.alert_preference(&id).await;
    Json(AlertView {
        product_id: id,
        preference,
    })
}

/// Save alert preferences for a product. Session-only; never synchronized.
#[instrument(skip(state, session))]
pub async fn set_alerts(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Json(preference): Json<AlertPreference>,
) -> Json<AlertView> {
    store(&state, &session)
        .await
        .set_alert_preference(id.clone(), preference)
        .await;
    Json(AlertView {
        product_id: id,
        preference,
    })
}
