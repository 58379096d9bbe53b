//! Auth route handlers: delegation to the hosted identity provider plus the
//! sign-in collection sync.
//!
//! Signing in is the moment the local/remote reconciliation policy runs:
//! after the provider accepts the credentials, the cart, wishlist, and
//! compare stores each merge the session state with the remote record and
//! report how that went.

use axum::{
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{instrument, warn};

use renewly_core::sync::SyncOutcome;
use renewly_core::{Email, UserId};

use crate::error::{AppError, Result};
use crate::models::CurrentUser;
use crate::models::forms::validate_email;
use crate::models::session::{clear_current_user, current_user, session_keys, set_current_user};
use crate::services::IdentityClient;
use crate::state::AppState;
use crate::stores::cart::CartStore;
use crate::stores::compare::CompareStore;
use crate::stores::wishlist::WishlistStore;

/// The configured identity client, or a 503 for this deployment; the UI
/// shows this as a disabled sign-in control.
fn require_identity(state: &AppState) -> Result<&IdentityClient> {
    state
        .identity()
        .ok_or(AppError::NotConfigured("identity provider"))
}

/// Credentials request body.
#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

/// Email-only request body.
#[derive(Debug, Deserialize)]
pub struct EmailBody {
    pub email: String,
}

/// Outcome of the per-collection sign-in sync.
#[derive(Debug, Serialize)]
pub struct CollectionSync {
    pub cart: SyncOutcome,
    pub wishlist: SyncOutcome,
    pub compare: SyncOutcome,
}

/// Signed-in session payload.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user: Option<SessionUser>,
    /// Whether a hosted identity provider is configured for this
    /// deployment; `false` renders as an informational banner.
    pub identity_configured: bool,
}

/// Minimal user identity for clients.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: Email,
}

/// Sign-in response.
#[derive(Debug, Serialize)]
pub struct SignInView {
    pub user: SessionUser,
    pub sync: CollectionSync,
}

/// Run the reconciliation policy for all three synced collections.
async fn sync_collections(state: &AppState, session: &Session) -> CollectionSync {
    let user = current_user(session).await;

    let cart = CartStore::new(session, user.clone(), state.user_data());
    let (_, cart_sync) = cart.sync_on_sign_in().await;

    let wishlist = WishlistStore::new(session, user.clone(), state.user_data(), state.catalog());
    let (_, wishlist_sync) = wishlist.sync_on_sign_in().await;

    let compare = CompareStore::new(session, user, state.user_data(), state.catalog());
    let (_, compare_sync) = compare.sync_on_sign_in().await;

    CollectionSync {
        cart: cart_sync,
        wishlist: wishlist_sync,
        compare: compare_sync,
    }
}

/// Password sign-in. On success the session holds the identity and the
/// collections have been merged with the remote record.
#[instrument(skip(state, session, body))]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<SignInView>> {
    let email = validate_email("email", &body.email)
        .map_err(|error| AppError::Validation(vec![error]))?;
    let identity = require_identity(&state)?;

    let auth = identity
        .sign_in_with_password(email.as_str(), &body.password)
        .await?;

    let user = CurrentUser {
        id: auth.user.id,
        email: auth.user.email,
        access_token: auth.access_token,
    };
    set_current_user(&session, &user)
        .await
        .map_err(|error| AppError::Internal(error.to_string()))?;

    let sync = sync_collections(&state, &session).await;
    Ok(Json(SignInView {
        user: SessionUser {
            id: user.id,
            email: user.email,
        },
        sync,
    }))
}

/// Registration; behaves like sign-in on success, so a brand-new account
/// inherits whatever the visitor had collected as a guest.
#[instrument(skip(state, session, body))]
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<SignInView>> {
    let email = validate_email("email", &body.email)
        .map_err(|error| AppError::Validation(vec![error]))?;
    let identity = require_identity(&state)?;

    let auth = identity.sign_up(email.as_str(), &body.password).await?;

    let user = CurrentUser {
        id: auth.user.id,
        email: auth.user.email,
        access_token: auth.access_token,
    };
    set_current_user(&session, &user)
        .await
        .map_err(|error| AppError::Internal(error.to_string()))?;

    let sync = sync_collections(&state, &session).await;
    Ok(Json(SignInView {
        user: SessionUser {
            id: user.id,
            email: user.email,
        },
        sync,
    }))
}

/// Sign out: best-effort upstream invalidation, then drop the identity and
/// the synced collections from the session. Guest state (guest compare
/// tray, quotes, alert preferences) stays.
#[instrument(skip(state, session))]
pub async fn sign_out(State(state): State<AppState>, session: Session) -> Json<SessionView> {
    if let Some(user) = current_user(&session).await {
        if let Some(identity) = state.identity() {
            if let Err(error) = identity.sign_out(&user.access_token).await {
                warn!(%error, "upstream sign-out failed, clearing session anyway");
            }
        }
    }

    if let Err(error) = clear_current_user(&session).await {
        warn!(%error, "failed to clear session identity");
    }
    for key in [session_keys::CART, session_keys::WISHLIST, session_keys::COMPARE] {
        if let Err(error) = session.remove::<serde_json::Value>(key).await {
            warn!(key, %error, "failed to drop synced collection");
        }
    }

    Json(SessionView {
        user: None,
        identity_configured: state.identity().is_some(),
    })
}

/// Current session.
#[instrument(skip(state, session))]
pub async fn session(State(state): State<AppState>, session: Session) -> Json<SessionView> {
    let user = current_user(&session).await.map(|user| SessionUser {
        id: user.id,
        email: user.email,
    });
    Json(SessionView {
        user,
        identity_configured: state.identity().is_some(),
    })
}

/// Request a password-reset email.
#[instrument(skip(state, body))]
pub async fn reset(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<Json<serde_json::Value>> {
    let email = validate_email("email", &body.email)
        .map_err(|error| AppError::Validation(vec![error]))?;
    let identity = require_identity(&state)?;

    identity.request_password_reset(email.as_str()).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
