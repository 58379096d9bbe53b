//! Quote store: the session-held quote book.
//!
//! Quotes are local to the owning browser in the current design - there is
//! no remote mirror. The whole book is serialized on every mutation under
//! one fixed key and loaded fail-soft; quotes are never deleted.

use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::warn;

use renewly_core::quote::{BusinessInfo, Quote, QuoteBook, QuoteError, QuoteLineItem, QuoteStatus};
use renewly_core::{ProductId, QuoteId};

use crate::models::session::session_keys;
use crate::stores::{load_collection, save_collection};

/// The quote store for one request.
pub struct QuoteStore<'a> {
    session: &'a Session,
}

impl<'a> QuoteStore<'a> {
    /// Bind the store to a session.
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Load the book from the session. Missing or corrupt data is an empty
    /// book.
    pub async fn load(&self) -> QuoteBook {
        load_collection(self.session, session_keys::QUOTES).await
    }

    async fn persist(&self, book: &QuoteBook) {
        save_collection(self.session, session_keys::QUOTES, book).await;
    }

    /// Create a quote from the inquiry flow.
    ///
    /// # Errors
    ///
    /// Propagates [`QuoteError`] from validation (empty lines, bad
    /// quantities/prices).
    pub async fn create(
        &self,
        line_items: Vec<QuoteLineItem>,
        business: BusinessInfo,
        notes: Option<String>,
    ) -> Result<Quote, QuoteError> {
        let mut book = self.load().await;
        let quote = book.create(line_items, business, notes)?;
        self.persist(&book).await;
        Ok(quote)
    }

    /// Look up one quote.
    pub async fn get(&self, id: &QuoteId) -> Option<Quote> {
        self.load().await.get(id).cloned()
    }

    /// Move a quote to its next status.
    ///
    /// # Errors
    ///
    /// Propagates the book's typed not-found / invalid-transition errors;
    /// on error nothing is persisted.
    pub async fn transition(&self, id: &QuoteId, next: QuoteStatus) -> Result<Quote, QuoteError> {
        let mut book = self.load().await;
        book.transition(id, next)?;
        self.persist(&book).await;
        book.get(id)
            .cloned()
            .ok_or_else(|| QuoteError::NotFound(id.clone()))
    }

    /// Set or clear a negotiated line price.
    ///
    /// Permitted in any status; an edit to a terminal quote is logged so it
    /// is at least visible when it happens.
    ///
    /// # Errors
    ///
    /// Propagates the book's typed not-found errors.
    pub async fn set_line_price(
        &self,
        id: &QuoteId,
        product_id: &ProductId,
        negotiated_price: Option<Decimal>,
    ) -> Result<Quote, QuoteError> {
        let mut book = self.load().await;

        if let Some(quote) = book.get(id) {
            if quote.status.is_terminal() {
                warn!(quote = %id, status = %quote.status, "line price edited on a settled quote");
            }
        }

        book.set_line_price(id, product_id, negotiated_price)?;
        self.persist(&book).await;
        book.get(id)
            .cloned()
            .ok_or_else(|| QuoteError::NotFound(id.clone()))
    }
}
