//! Remote per-identity data store client.
//!
//! CRUD over five logical record types - addresses, preferences, wishlist
//! entries, compare entries, and cart lines - each scoped by an identity id.
//! The store is a hosted REST service; every operation here is best-effort
//! from the caller's point of view: failures are logged and collections
//! degrade to local-only behavior, they never block the shopper.
//!
//! The record is shared across devices for the same identity with
//! last-write-wins semantics and no conflict detection; that is a documented
//! non-goal.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use renewly_core::{ProductId, UserId};

use crate::config::UserDataConfig;

/// Errors that can occur when talking to the data store.
#[derive(Debug, Error)]
pub enum UserDataError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An insert/update returned no representation.
    #[error("empty response for {0}")]
    EmptyResponse(&'static str),
}

/// A cart line in the remote record.
///
/// Product details are denormalized onto the row so the cart can render
/// without a catalog round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCartLine {
    pub id: String,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub product_title: String,
    pub product_brand: String,
    pub product_image: String,
    pub product_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A wishlist entry in the remote record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteWishlistEntry {
    pub id: String,
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// A compare entry in the remote record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCompareEntry {
    pub id: String,
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// A saved address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAddress {
    pub id: String,
    pub user_id: UserId,
    pub label: String,
    pub recipient: String,
    pub phone: String,
    pub line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub is_default: bool,
}

/// Fields for creating or updating an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressInput {
    pub label: String,
    pub recipient: String,
    pub phone: String,
    pub line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub is_default: bool,
}

/// Per-identity preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePreferences {
    pub user_id: UserId,
    pub email_deals: bool,
    pub messaging_updates: bool,
    pub dark_mode: bool,
}

/// Client for the hosted per-identity data store.
#[derive(Clone)]
pub struct UserDataClient {
    client: reqwest::Client,
    base_url: String,
}

impl UserDataClient {
    /// Create a new data store client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &UserDataConfig) -> Result<Self, UserDataError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", config.service_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&bearer)
                .map_err(|e| UserDataError::Parse(format!("Invalid service key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_owned(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    /// List rows of `table` belonging to `user_id`.
    async fn list_for_user<T: DeserializeOwned>(
        &self,
        table: &str,
        user_id: &UserId,
    ) -> Result<Vec<T>, UserDataError> {
        let url = format!(
            "{}?user_id=eq.{}",
            self.table_url(table),
            urlencoding::encode(user_id.as_str())
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| UserDataError::Parse(e.to_string()))
    }

    /// Insert a row and return the stored representation.
    async fn insert_returning<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &'static str,
        body: &B,
    ) -> Result<T, UserDataError> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }
        let mut rows: Vec<T> = response
            .json()
            .await
            .map_err(|e| UserDataError::Parse(e.to_string()))?;
        rows.pop().ok_or(UserDataError::EmptyResponse(table))
    }

    /// Delete rows of `table` matching the filter query string.
    async fn delete_where(&self, table: &str, filter: &str) -> Result<(), UserDataError> {
        let url = format!("{}?{filter}", self.table_url(table));
        let response = self.client.delete(&url).send().await?;
        let status = response.status();
        if !status.is_success() && status.as_u16() != 204 {
            return Err(api_error(status.as_u16(), response).await);
        }
        Ok(())
    }

    // =========================================================================
    // Cart lines
    // =========================================================================

    /// Fetch the remote cart for an identity.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: &UserId) -> Result<Vec<RemoteCartLine>, UserDataError> {
        self.list_for_user("user_cart_items", user_id).await
    }

    /// Insert a cart line and return the stored row (with its id).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, line))]
    pub async fn add_cart_line(
        &self,
        line: &NewRemoteCartLine<'_>,
    ) -> Result<RemoteCartLine, UserDataError> {
        self.insert_returning("user_cart_items", line).await
    }

    /// Update the quantity on an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn set_cart_quantity(
        &self,
        line_id: &str,
        quantity: u32,
    ) -> Result<(), UserDataError> {
        let url = format!(
            "{}?id=eq.{}",
            self.table_url("user_cart_items"),
            urlencoding::encode(line_id)
        );
        let response = self
            .client
            .patch(&url)
            .json(&serde_json::json!({ "quantity": quantity }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() && status.as_u16() != 204 {
            return Err(api_error(status.as_u16(), response).await);
        }
        Ok(())
    }

    /// Remove one cart line by its remote id.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn remove_cart_line(&self, line_id: &str) -> Result<(), UserDataError> {
        self.delete_where(
            "user_cart_items",
            &format!("id=eq.{}", urlencoding::encode(line_id)),
        )
        .await
    }

    /// Remove every cart line for an identity.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: &UserId) -> Result<(), UserDataError> {
        self.delete_where(
            "user_cart_items",
            &format!("user_id=eq.{}", urlencoding::encode(user_id.as_str())),
        )
        .await
    }

    // =========================================================================
    // Wishlist entries
    // =========================================================================

    /// Fetch the remote wishlist for an identity.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_wishlist(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RemoteWishlistEntry>, UserDataError> {
        self.list_for_user("user_wishlist_items", user_id).await
    }

    /// Add a wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn add_wishlist_entry(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<RemoteWishlistEntry, UserDataError> {
        self.insert_returning(
            "user_wishlist_items",
            &serde_json::json!({ "user_id": user_id, "product_id": product_id }),
        )
        .await
    }

    /// Remove a wishlist entry by product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn remove_wishlist_entry(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), UserDataError> {
        self.delete_where(
            "user_wishlist_items",
            &format!(
                "user_id=eq.{}&product_id=eq.{}",
                urlencoding::encode(user_id.as_str()),
                urlencoding::encode(product_id.as_str())
            ),
        )
        .await
    }

    // =========================================================================
    // Compare entries
    // =========================================================================

    /// Fetch the remote compare list for an identity.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_compare(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RemoteCompareEntry>, UserDataError> {
        self.list_for_user("user_compare_items", user_id).await
    }

    /// Add a compare entry.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn add_compare_entry(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<RemoteCompareEntry, UserDataError> {
        self.insert_returning(
            "user_compare_items",
            &serde_json::json!({ "user_id": user_id, "product_id": product_id }),
        )
        .await
    }

    /// Remove a compare entry by product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn remove_compare_entry(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), UserDataError> {
        self.delete_where(
            "user_compare_items",
            &format!(
                "user_id=eq.{}&product_id=eq.{}",
                urlencoding::encode(user_id.as_str()),
                urlencoding::encode(product_id.as_str())
            ),
        )
        .await
    }

    /// Remove every compare entry for an identity.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear_compare(&self, user_id: &UserId) -> Result<(), UserDataError> {
        self.delete_where(
            "user_compare_items",
            &format!("user_id=eq.{}", urlencoding::encode(user_id.as_str())),
        )
        .await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List saved addresses for an identity.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_addresses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RemoteAddress>, UserDataError> {
        self.list_for_user("user_addresses", user_id).await
    }

    /// Create an address and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, input))]
    pub async fn create_address(
        &self,
        user_id: &UserId,
        input: &AddressInput,
    ) -> Result<RemoteAddress, UserDataError> {
        let mut body = serde_json::to_value(input)
            .map_err(|e| UserDataError::Parse(e.to_string()))?;
        if let Some(object) = body.as_object_mut() {
            object.insert("user_id".to_owned(), serde_json::json!(user_id));
        }
        self.insert_returning("user_addresses", &body).await
    }

    /// Update an address in place.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, input))]
    pub async fn update_address(
        &self,
        address_id: &str,
        input: &AddressInput,
    ) -> Result<(), UserDataError> {
        let url = format!(
            "{}?id=eq.{}",
            self.table_url("user_addresses"),
            urlencoding::encode(address_id)
        );
        let response = self.client.patch(&url).json(input).send().await?;
        let status = response.status();
        if !status.is_success() && status.as_u16() != 204 {
            return Err(api_error(status.as_u16(), response).await);
        }
        Ok(())
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, address_id: &str) -> Result<(), UserDataError> {
        self.delete_where(
            "user_addresses",
            &format!("id=eq.{}", urlencoding::encode(address_id)),
        )
        .await
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// Fetch preferences for an identity, if any were ever saved.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_preferences(
        &self,
        user_id: &UserId,
    ) -> Result<Option<RemotePreferences>, UserDataError> {
        let mut rows: Vec<RemotePreferences> =
            self.list_for_user("user_preferences", user_id).await?;
        Ok(rows.pop())
    }

    /// Create or replace preferences for an identity.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, preferences))]
    pub async fn upsert_preferences(
        &self,
        preferences: &RemotePreferences,
    ) -> Result<RemotePreferences, UserDataError> {
        let response = self
            .client
            .post(self.table_url("user_preferences"))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(preferences)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }
        let mut rows: Vec<RemotePreferences> = response
            .json()
            .await
            .map_err(|e| UserDataError::Parse(e.to_string()))?;
        rows.pop().ok_or(UserDataError::EmptyResponse("user_preferences"))
    }
}

/// Insert payload for a cart line.
#[derive(Debug, Serialize)]
pub struct NewRemoteCartLine<'a> {
    pub user_id: &'a UserId,
    pub product_id: &'a ProductId,
    pub quantity: u32,
    pub product_title: &'a str,
    pub product_brand: &'a str,
    pub product_image: &'a str,
    pub product_price: Decimal,
}

/// Read an error body into a typed API error.
async fn api_error(status: u16, response: reqwest::Response) -> UserDataError {
    let message = response.text().await.unwrap_or_default();
    UserDataError::Api { status, message }
}
