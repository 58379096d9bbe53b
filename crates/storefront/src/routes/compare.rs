//! Compare route handlers: the tray and named saved sets.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use renewly_core::ProductId;
use renewly_core::collections::{CompareAddOutcome, CompareItem, CompareState, SavedCompareSet};
use renewly_core::sync::SyncOutcome;

use crate::error::{AppError, Result};
use crate::models::session::current_user;
use crate::routes::products::resolve_product;
use crate::state::AppState;
use crate::stores::compare::CompareStore;

/// Compare tray display data.
#[derive(Debug, Serialize)]
pub struct CompareView {
    pub items: Vec<CompareItem>,
    pub saved: Vec<SavedCompareSet>,
    pub sync: SyncOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CompareAddOutcome>,
}

fn view(state: CompareState, sync: SyncOutcome, outcome: Option<CompareAddOutcome>) -> CompareView {
    CompareView {
        items: state.items().to_vec(),
        saved: state.saved().to_vec(),
        sync,
        outcome,
    }
}

async fn store<'a>(state: &'a AppState, session: &'a Session) -> CompareStore<'a> {
    CompareStore::new(
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

/// Saved set request body.
#[derive(Debug, Deserialize)]
pub struct SaveSetBody {
    pub name: String,
}

/// Display the tray and saved sets.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Json<CompareView> {
    let compare = store(&state, &session).await.load().await;
    Json(view(compare, SyncOutcome::LocalOnly, None))
}

/// Add a product to the tray. A fifth distinct product is silently ignored;
/// the returned `outcome` says which way the add went.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<ProductRefBody>,
) -> Result<Json<CompareView>> {
    let product = resolve_product(&state, &body.product_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {}", body.product_id)))?;

    let (compare, outcome, sync) = store(&state, &session).await.add(&product).await;
    Ok(Json(view(compare, sync, Some(outcome))))
}

/// Remove a product from the tray.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<ProductRefBody>,
) -> Result<Json<CompareView>> {
    let (compare, sync) = store(&state, &session)
        .await
        .remove(&body.product_id)
        .await?;
    Ok(Json(view(compare, sync, None)))
}

/// Empty the tray (saved sets survive).
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Json<CompareView> {
    let (compare, sync) = store(&state, &session).await.clear().await;
    Json(view(compare, sync, None))
}

/// Save the current tray under a name; an existing name is replaced.
#[instrument(skip(state, session))]
pub async fn save_set(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SaveSetBody>,
) -> Result<Json<CompareView>> {
    let (compare, saved) = store(&state, &session).await.save_set(&body.name).await;
    if !saved {
        return Err(AppError::BadRequest("set name must not be blank".to_owned()));
    }
    Ok(Json(view(compare, SyncOutcome::LocalOnly, None)))
}

/// Delete a saved set by name.
#[instrument(skip(state, session))]
pub async fn remove_set(
    State(state): State<AppState>,
    session: Session,
    Path(name): Path<String>,
) -> Result<Json<CompareView>> {
    let compare = store(&state, &session).await.remove_set(&name).await?;
    Ok(Json(view(compare, SyncOutcome::LocalOnly, None)))
}
