//! Session-related types.
//!
//! The session is this service's stand-in for the browser's local storage:
//! durable per-visitor state, each logical collection under its own fixed
//! key. There is no schema versioning; anything that fails to decode loads
//! as empty.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use renewly_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user, plus
/// the provider access token needed to sign out upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Identity-provider user id.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Access token issued by the identity provider.
    pub access_token: String,
}

/// Fixed keys for per-visitor persisted state.
pub mod session_keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the cart line collection.
    pub const CART: &str = "rn_cart";

    /// Key for the wishlist collection.
    pub const WISHLIST: &str = "rn_wishlist";

    /// Key for the signed-in compare tray (ids + named saved sets).
    pub const COMPARE: &str = "rn_compare";

    /// Key for the guest compare tray.
    pub const COMPARE_GUEST: &str = "rn_compare_guest";

    /// Key for the quote collection.
    pub const QUOTES: &str = "rn_quotes";

    /// Key for per-product wishlist alert preferences.
    pub const WISHLIST_ALERTS: &str = "rn_wishlist_alerts";

    /// Key for OAuth CSRF state during social sign-in.
    pub const OAUTH_STATE: &str = "oauth_state";
}

/// Read the current user from the session, if signed in.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Store the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the current user from the session (sign-out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
