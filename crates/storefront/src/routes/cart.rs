//! Cart route handlers.
//!
//! Every response carries the derived discount figures and the sync outcome
//! of the mutation, so clients (and tests) can see how far a write
//! propagated instead of guessing from logs.

use axum::{
    Json,
    extract::State,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use renewly_core::ProductId;
use renewly_core::collections::CartState;
use renewly_core::pricing::NextTier;
use renewly_core::sync::SyncOutcome;

use crate::error::{AppError, Result};
use crate::models::session::current_user;
use crate::routes::products::resolve_product;
use crate::state::AppState;
use crate::stores::cart::CartStore;

/// Cart line display data.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub title: String,
    pub brand: String,
    pub image: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Cart display data with derived totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub count: u32,
    pub subtotal: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    /// Subtotal minus bulk discount.
    pub payable: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_tier: Option<NextTier>,
    pub sync: SyncOutcome,
}

/// Build the response view from cart state.
fn cart_view(state: &CartState, sync: SyncOutcome) -> CartView {
    let discount = state.bulk_discount();
    let subtotal = state.subtotal();
    CartView {
        items: state
            .lines()
            .iter()
            .map(|line| CartLineView {
                product_id: line.product_id.clone(),
                title: line.title.clone(),
                brand: line.brand.clone(),
                image: line.image.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
                line_total: line.line_total(),
            })
            .collect(),
        count: state.total_quantity(),
        subtotal,
        discount_percent: discount.percent,
        discount_amount: discount.amount,
        payable: subtotal - discount.amount,
        next_tier: state.next_tier(),
        sync,
    }
}

async fn store<'a>(state: &'a AppState, session: &'a Session) -> CartStore<'a> {
    CartStore::new(session, current_user(session).await, state.user_data())
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartBody {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartBody {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartBody {
    pub product_id: ProductId,
}

/// Cart count badge payload.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Display the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Json<CartView> {
    let cart = store(&state, &session).await.load().await;
    Json(cart_view(&cart, SyncOutcome::LocalOnly))
}

/// Add a product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToCartBody>,
) -> Result<Json<CartView>> {
    let product = resolve_product(&state, &body.product_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {}", body.product_id)))?;

    let (cart, sync) = store(&state, &session)
        .await
        .add(&product, body.quantity.unwrap_or(1))
        .await;
    Ok(Json(cart_view(&cart, sync)))
}

/// Set a line's quantity.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateCartBody>,
) -> Result<Json<CartView>> {
    let (cart, sync) = store(&state, &session)
        .await
        .set_quantity(&body.product_id, body.quantity)
        .await?;
    Ok(Json(cart_view(&cart, sync)))
}

/// Remove a line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RemoveFromCartBody>,
) -> Result<Json<CartView>> {
    let (cart, sync) = store(&state, &session)
        .await
        .remove(&body.product_id)
        .await?;
    Ok(Json(cart_view(&cart, sync)))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Json<CartView> {
    let (cart, sync) = store(&state, &session).await.clear().await;
    Json(cart_view(&cart, sync))
}

/// Item count for the header badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Json<CartCount> {
    let cart = store(&state, &session).await.load().await;
    Json(CartCount {
        count: cart.total_quantity(),
    })
}
