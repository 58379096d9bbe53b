//! Account route handlers: addresses and preferences, held in the remote
//! per-identity store.
//!
//! Remote failures degrade rather than error: listings come back empty and
//! mutations report `remote_failed`, mirroring the collection stores.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use renewly_core::sync::SyncOutcome;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::forms::{FieldError, validate_phone, validate_pincode, validate_required};
use crate::services::UserDataClient;
use crate::services::user_data::{AddressInput, RemoteAddress, RemotePreferences};
use crate::state::AppState;

/// The configured data-store client, or a 503 for this deployment.
fn require_user_data(state: &AppState) -> Result<&UserDataClient> {
    state
        .user_data()
        .ok_or(AppError::NotConfigured("user data store"))
}

fn validate_address(input: &AddressInput) -> Result<()> {
    let mut errors: Vec<FieldError> = Vec::new();
    if let Err(error) = validate_required("label", &input.label) {
        errors.push(error);
    }
    if let Err(error) = validate_required("recipient", &input.recipient) {
        errors.push(error);
    }
    if let Err(error) = validate_required("line", &input.line) {
        errors.push(error);
    }
    if let Err(error) = validate_required("city", &input.city) {
        errors.push(error);
    }
    if let Err(error) = validate_required("state", &input.state) {
        errors.push(error);
    }
    if let Err(error) = validate_phone("phone", &input.phone) {
        errors.push(error);
    }
    if let Err(error) = validate_pincode("pincode", &input.pincode) {
        errors.push(error);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Address list payload.
#[derive(Debug, Serialize)]
pub struct AddressListView {
    pub addresses: Vec<RemoteAddress>,
    pub sync: SyncOutcome,
}

/// Single-address mutation payload.
#[derive(Debug, Serialize)]
pub struct AddressView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<RemoteAddress>,
    pub sync: SyncOutcome,
}

/// List saved addresses. Remote failure degrades to an empty list.
#[instrument(skip(state, user))]
pub async fn list_addresses(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<AddressListView>> {
    let client = require_user_data(&state)?;
    match client.list_addresses(&user.id).await {
        Ok(addresses) => Ok(Json(AddressListView {
            addresses,
            sync: SyncOutcome::Synced,
        })),
        Err(error) => {
            warn!(%error, "address list failed, returning empty");
            Ok(Json(AddressListView {
                addresses: Vec::new(),
                sync: SyncOutcome::RemoteFailed,
            }))
        }
    }
}

/// Create an address.
#[instrument(skip(state, user, input))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(input): Json<AddressInput>,
) -> Result<Json<AddressView>> {
    validate_address(&input)?;
    let client = require_user_data(&state)?;
    match client.create_address(&user.id, &input).await {
        Ok(address) => Ok(Json(AddressView {
            address: Some(address),
            sync: SyncOutcome::Synced,
        })),
        Err(error) => {
            warn!(%error, "address create failed");
            Ok(Json(AddressView {
                address: None,
                sync: SyncOutcome::RemoteFailed,
            }))
        }
    }
}

/// Update an address in place.
#[instrument(skip(state, _user, input))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<String>,
    Json(input): Json<AddressInput>,
) -> Result<Json<AddressView>> {
    validate_address(&input)?;
    let client = require_user_data(&state)?;
    match client.update_address(&id, &input).await {
        Ok(()) => Ok(Json(AddressView {
            address: None,
            sync: SyncOutcome::Synced,
        })),
        Err(error) => {
            warn!(%error, address = %id, "address update failed");
            Ok(Json(AddressView {
                address: None,
                sync: SyncOutcome::RemoteFailed,
            }))
        }
    }
}

/// Delete an address.
#[instrument(skip(state, _user))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<AddressView>> {
    let client = require_user_data(&state)?;
    match client.delete_address(&id).await {
        Ok(()) => Ok(Json(AddressView {
            address: None,
            sync: SyncOutcome::Synced,
        })),
        Err(error) => {
            warn!(%error, address = %id, "address delete failed");
            Ok(Json(AddressView {
                address: None,
                sync: SyncOutcome::RemoteFailed,
            }))
        }
    }
}

/// Preference fields a client can set.
#[derive(Debug, Deserialize)]
pub struct PreferencesBody {
    pub email_deals: bool,
    pub messaging_updates: bool,
    pub dark_mode: bool,
}

/// Preferences payload.
#[derive(Debug, Serialize)]
pub struct PreferencesView {
    pub email_deals: bool,
    pub messaging_updates: bool,
    pub dark_mode: bool,
    pub sync: SyncOutcome,
}

/// Fetch preferences; absent or failing remote yields the defaults.
#[instrument(skip(state, user))]
pub async fn get_preferences(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<PreferencesView>> {
    let client = require_user_data(&state)?;
    let (preferences, sync) = match client.get_preferences(&user.id).await {
        Ok(found) => (found, SyncOutcome::Synced),
        Err(error) => {
            warn!(%error, "preference fetch failed, returning defaults");
            (None, SyncOutcome::RemoteFailed)
        }
    };

    let view = preferences.map_or(
        PreferencesView {
            email_deals: false,
            messaging_updates: true,
            dark_mode: false,
            sync,
        },
        |preferences| PreferencesView {
            email_deals: preferences.email_deals,
            messaging_updates: preferences.messaging_updates,
            dark_mode: preferences.dark_mode,
            sync,
        },
    );
    Ok(Json(view))
}

/// Save preferences.
#[instrument(skip(state, user, body))]
pub async fn set_preferences(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<PreferencesBody>,
) -> Result<Json<PreferencesView>> {
    let client = require_user_data(&state)?;
    let record = RemotePreferences {
        user_id: user.id,
        email_deals: body.email_deals,
        messaging_updates: body.messaging_updates,
        dark_mode: body.dark_mode,
    };

    let sync = match client.upsert_preferences(&record).await {
        Ok(_) => SyncOutcome::Synced,
        Err(error) => {
            warn!(%error, "preference save failed");
            SyncOutcome::RemoteFailed
        }
    };

    Ok(Json(PreferencesView {
        email_deals: record.email_deals,
        messaging_updates: record.messaging_updates,
        dark_mode: record.dark_mode,
        sync,
    }))
}
