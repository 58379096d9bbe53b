//! Bulk-quote lifecycle: records, status state machine, derived totals.
//!
//! A quote is a negotiable, non-final bulk-order proposal. Its status moves
//! strictly forward:
//!
//! ```text
//! requested -> review -> quoted -> approved   (terminal)
//!                               \-> rejected  (terminal)
//! ```
//!
//! Totals are never stored on the record; they are recomputed from the line
//! items through [`crate::pricing`] every time they are read, so an edited
//! negotiated price is always reflected everywhere at once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;
use uuid::Uuid;

use crate::pricing;
use crate::types::{Email, ProductId, QuoteId};

/// GST rate applied to the taxable value of every quote, in percent.
///
/// Centralized here; the invoice view and the quote detail view both read
/// this constant.
pub static GST_RATE_PERCENT: LazyLock<Decimal> = LazyLock::new(|| Decimal::new(18, 0));

/// Lifecycle status of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Submitted by the buyer, not yet looked at.
    Requested,
    /// Under review by the sales team.
    Review,
    /// Priced and sent back to the buyer.
    Quoted,
    /// Accepted by the buyer. Terminal.
    Approved,
    /// Declined. Terminal.
    Rejected,
}

impl QuoteStatus {
    /// Statuses reachable in one step from this one.
    #[must_use]
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::Requested => &[Self::Review],
            Self::Review => &[Self::Quoted],
            Self::Quoted => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    /// Whether no further transitions exist from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Whether `next` is an immediate successor of this status.
    ///
    /// Backward moves and skips are both rejected; the machine only walks
    /// forward one step at a time.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.successors().contains(&next)
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Requested => "requested",
            Self::Review => "review",
            Self::Quoted => "quoted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

/// One product line on a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLineItem {
    pub product_id: ProductId,
    pub title: String,
    pub brand: String,
    pub quantity: u32,
    /// Unit price at request time.
    pub list_price: Decimal,
    /// Negotiated unit price; when present it supersedes `list_price` in
    /// every downstream total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiated_price: Option<Decimal>,
}

impl QuoteLineItem {
    /// The unit price totals are computed from.
    #[must_use]
    pub fn effective_unit_price(&self) -> Decimal {
        self.negotiated_price.unwrap_or(self.list_price)
    }
}

/// Buyer details captured on the inquiry form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessInfo {
    pub company_name: String,
    pub contact_name: String,
    pub email: Email,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A bulk-order quote.
///
/// `id` is immutable after creation and quotes are never deleted; the book
/// keeps every quote the browser has ever raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub created_at: DateTime<Utc>,
    pub status: QuoteStatus,
    pub line_items: Vec<QuoteLineItem>,
    pub business: BusinessInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Quote {
    /// Sum of quantities over all line items.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.line_items.iter().map(|line| line.quantity).sum()
    }

    /// Sum of effective unit price times quantity over all line items.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.line_items
            .iter()
            .map(|line| line.effective_unit_price() * Decimal::from(line.quantity))
            .sum()
    }

    /// Derived money figures for display and invoicing.
    ///
    /// Always recomputed from the line items; nothing here is stored.
    #[must_use]
    pub fn totals(&self) -> QuoteTotals {
        let subtotal = self.subtotal();
        let discount = pricing::discount_amount_for(subtotal, self.total_quantity());
        let taxable_value = subtotal - discount.amount;
        let tax_amount = (taxable_value * *GST_RATE_PERCENT / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        QuoteTotals {
            subtotal,
            discount_percent: discount.percent,
            discount_amount: discount.amount,
            taxable_value,
            tax_amount,
            total: taxable_value + tax_amount,
        }
    }
}

/// Derived totals for a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub taxable_value: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Failures from quote-book operations.
///
/// Not-found and invalid-transition conditions are typed so callers can map
/// them to proper responses instead of silently doing nothing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuoteError {
    /// A quote needs at least one line item.
    #[error("a quote needs at least one line item")]
    EmptyLineItems,
    /// Line quantities start at one.
    #[error("line for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
    /// Unit prices cannot be negative.
    #[error("negative unit price {price} for product {product_id}")]
    NegativePrice {
        product_id: ProductId,
        price: Decimal,
    },
    /// No quote with this id exists in the book.
    #[error("quote {0} not found")]
    NotFound(QuoteId),
    /// The quote exists but has no line for this product.
    #[error("quote {quote_id} has no line for product {product_id}")]
    LineNotFound {
        quote_id: QuoteId,
        product_id: ProductId,
    },
    /// The requested status is not the immediate successor of the current
    /// one. The record is left untouched.
    #[error("cannot move a {from} quote to {to}")]
    InvalidTransition { from: QuoteStatus, to: QuoteStatus },
}

/// The collection of quotes owned by one browser.
///
/// Serialized wholesale on every mutation; deserialized once at startup.
/// Newest quotes sit at the front, matching how the account page lists them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteBook {
    quotes: Vec<Quote>,
}

impl QuoteBook {
    /// Create an empty book.
    #[must_use]
    pub const fn new() -> Self {
        Self { quotes: Vec::new() }
    }

    /// All quotes, newest first.
    #[must_use]
    pub fn all(&self) -> &[Quote] {
        &self.quotes
    }

    /// Number of quotes in the book.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether the book holds no quotes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Look up a quote by id. No side effects.
    #[must_use]
    pub fn get(&self, id: &QuoteId) -> Option<&Quote> {
        self.quotes.iter().find(|quote| &quote.id == id)
    }

    /// Create a new quote in `requested` status and prepend it to the book.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::EmptyLineItems`] for an empty line list, and
    /// validates quantities and prices on every line.
    pub fn create(
        &mut self,
        line_items: Vec<QuoteLineItem>,
        business: BusinessInfo,
        notes: Option<String>,
    ) -> Result<Quote, QuoteError> {
        if line_items.is_empty() {
            return Err(QuoteError::EmptyLineItems);
        }
        for line in &line_items {
            if line.quantity == 0 {
                return Err(QuoteError::ZeroQuantity(line.product_id.clone()));
            }
            if line.list_price < Decimal::ZERO {
                return Err(QuoteError::NegativePrice {
                    product_id: line.product_id.clone(),
                    price: line.list_price,
                });
            }
        }

        let quote = Quote {
            id: self.fresh_id(),
            created_at: Utc::now(),
            status: QuoteStatus::Requested,
            line_items,
            business,
            notes,
        };
        self.quotes.insert(0, quote.clone());
        Ok(quote)
    }

    /// Move a quote to its next status.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::NotFound`] for an unknown id and
    /// [`QuoteError::InvalidTransition`] when `next` is not the immediate
    /// successor of the current status; in both cases nothing is mutated.
    pub fn transition(&mut self, id: &QuoteId, next: QuoteStatus) -> Result<(), QuoteError> {
        let quote = self
            .quotes
            .iter_mut()
            .find(|quote| &quote.id == id)
            .ok_or_else(|| QuoteError::NotFound(id.clone()))?;

        if !quote.status.can_transition_to(next) {
            return Err(QuoteError::InvalidTransition {
                from: quote.status,
                to: next,
            });
        }

        quote.status = next;
        Ok(())
    }

    /// Set or clear the negotiated unit price on one line.
    ///
    /// Permitted in any status, including terminal ones; callers that find
    /// that surprising can watch for it, but the book does not restrict it.
    ///
    /// # Errors
    ///
    /// Returns a typed not-found error when either identifier does not
    /// resolve, and rejects negative prices.
    pub fn set_line_price(
        &mut self,
        id: &QuoteId,
        product_id: &ProductId,
        negotiated_price: Option<Decimal>,
    ) -> Result<(), QuoteError> {
        if let Some(price) = negotiated_price {
            if price < Decimal::ZERO {
                return Err(QuoteError::NegativePrice {
                    product_id: product_id.clone(),
                    price,
                });
            }
        }

        let quote = self
            .quotes
            .iter_mut()
            .find(|quote| &quote.id == id)
            .ok_or_else(|| QuoteError::NotFound(id.clone()))?;

        let line = quote
            .line_items
            .iter_mut()
            .find(|line| &line.product_id == product_id)
            .ok_or_else(|| QuoteError::LineNotFound {
                quote_id: id.clone(),
                product_id: product_id.clone(),
            })?;

        line.negotiated_price = negotiated_price;
        Ok(())
    }

    /// Generate an id of the form `Q-XXXXXX` that is unused in this book.
    fn fresh_id(&self) -> QuoteId {
        loop {
            let raw = Uuid::new_v4().simple().to_string();
            let short: String = raw.chars().take(6).collect();
            let id = QuoteId::new(format!("Q-{}", short.to_uppercase()));
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    fn business() -> BusinessInfo {
        BusinessInfo {
            company_name: "Apex Retail Pvt Ltd".to_owned(),
            contact_name: "R. Iyer".to_owned(),
            email: Email::parse("purchasing@apexretail.example").unwrap(),
            phone: "9876543210".to_owned(),
            tax_id: Some("29AAACA1234F1Z5".to_owned()),
            address: None,
        }
    }

    fn line(product_id: &str, quantity: u32, list_price: i64) -> QuoteLineItem {
        QuoteLineItem {
            product_id: ProductId::new(product_id),
            title: format!("Laptop {product_id}"),
            brand: "Dell".to_owned(),
            quantity,
            list_price: dec(list_price),
            negotiated_price: None,
        }
    }

    #[test]
    fn test_create_assigns_fresh_id_and_requested_status() {
        let mut book = QuoteBook::new();
        let quote = book
            .create(vec![line("p1", 2, 10_000)], business(), None)
            .unwrap();
        assert_eq!(quote.status, QuoteStatus::Requested);
        assert!(quote.id.as_str().starts_with("Q-"));
        assert_eq!(book.len(), 1);
        assert_eq!(book.get(&quote.id).unwrap().id, quote.id);
    }

    #[test]
    fn test_create_rejects_empty_lines() {
        let mut book = QuoteBook::new();
        assert_eq!(
            book.create(vec![], business(), None),
            Err(QuoteError::EmptyLineItems)
        );
        assert!(book.is_empty());
    }

    #[test]
    fn test_create_newest_first() {
        let mut book = QuoteBook::new();
        let first = book
            .create(vec![line("p1", 1, 10_000)], business(), None)
            .unwrap();
        let second = book
            .create(vec![line("p2", 1, 20_000)], business(), None)
            .unwrap();
        let ids: Vec<_> = book.all().iter().map(|q| q.id.clone()).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_forward_walk_succeeds() {
        let mut book = QuoteBook::new();
        let quote = book
            .create(vec![line("p1", 3, 10_000)], business(), None)
            .unwrap();

        book.transition(&quote.id, QuoteStatus::Review).unwrap();
        book.transition(&quote.id, QuoteStatus::Quoted).unwrap();
        book.transition(&quote.id, QuoteStatus::Approved).unwrap();
        assert_eq!(book.get(&quote.id).unwrap().status, QuoteStatus::Approved);
    }

    #[test]
    fn test_skipping_a_state_fails_without_mutation() {
        let mut book = QuoteBook::new();
        let quote = book
            .create(vec![line("p1", 3, 10_000)], business(), None)
            .unwrap();
        book.transition(&quote.id, QuoteStatus::Review).unwrap();

        let err = book
            .transition(&quote.id, QuoteStatus::Approved)
            .unwrap_err();
        assert_eq!(
            err,
            QuoteError::InvalidTransition {
                from: QuoteStatus::Review,
                to: QuoteStatus::Approved,
            }
        );
        assert_eq!(book.get(&quote.id).unwrap().status, QuoteStatus::Review);
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        let mut book = QuoteBook::new();
        let quote = book
            .create(vec![line("p1", 3, 10_000)], business(), None)
            .unwrap();
        book.transition(&quote.id, QuoteStatus::Review).unwrap();
        book.transition(&quote.id, QuoteStatus::Quoted).unwrap();
        book.transition(&quote.id, QuoteStatus::Approved).unwrap();

        for next in [
            QuoteStatus::Requested,
            QuoteStatus::Review,
            QuoteStatus::Quoted,
            QuoteStatus::Rejected,
        ] {
            assert!(book.transition(&quote.id, next).is_err());
        }
        assert_eq!(book.get(&quote.id).unwrap().status, QuoteStatus::Approved);
    }

    #[test]
    fn test_backward_moves_rejected() {
        assert!(!QuoteStatus::Review.can_transition_to(QuoteStatus::Requested));
        assert!(!QuoteStatus::Quoted.can_transition_to(QuoteStatus::Review));
        assert!(!QuoteStatus::Requested.can_transition_to(QuoteStatus::Quoted));
        assert!(QuoteStatus::Quoted.can_transition_to(QuoteStatus::Rejected));
        assert!(QuoteStatus::Approved.is_terminal());
        assert!(QuoteStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_transition_unknown_quote() {
        let mut book = QuoteBook::new();
        let missing = QuoteId::new("Q-NOPE00");
        assert_eq!(
            book.transition(&missing, QuoteStatus::Review),
            Err(QuoteError::NotFound(missing))
        );
    }

    #[test]
    fn test_set_line_price_overrides_and_clears() {
        let mut book = QuoteBook::new();
        let quote = book
            .create(vec![line("p1", 2, 10_000)], business(), None)
            .unwrap();

        book.set_line_price(&quote.id, &ProductId::new("p1"), Some(dec(9_000)))
            .unwrap();
        let stored = book.get(&quote.id).unwrap();
        assert_eq!(
            stored.line_items[0].effective_unit_price(),
            dec(9_000)
        );

        book.set_line_price(&quote.id, &ProductId::new("p1"), None)
            .unwrap();
        let stored = book.get(&quote.id).unwrap();
        assert_eq!(stored.line_items[0].effective_unit_price(), dec(10_000));
    }

    #[test]
    fn test_set_line_price_unknown_line() {
        let mut book = QuoteBook::new();
        let quote = book
            .create(vec![line("p1", 2, 10_000)], business(), None)
            .unwrap();
        let err = book
            .set_line_price(&quote.id, &ProductId::new("p9"), Some(dec(1)))
            .unwrap_err();
        assert!(matches!(err, QuoteError::LineNotFound { .. }));
    }

    #[test]
    fn test_set_line_price_allowed_after_approval() {
        // Deliberately permissive: edits are not blocked by terminal status.
        let mut book = QuoteBook::new();
        let quote = book
            .create(vec![line("p1", 3, 10_000)], business(), None)
            .unwrap();
        book.transition(&quote.id, QuoteStatus::Review).unwrap();
        book.transition(&quote.id, QuoteStatus::Quoted).unwrap();
        book.transition(&quote.id, QuoteStatus::Approved).unwrap();

        book.set_line_price(&quote.id, &ProductId::new("p1"), Some(dec(9_500)))
            .unwrap();
        assert_eq!(
            book.get(&quote.id).unwrap().line_items[0].negotiated_price,
            Some(dec(9_500))
        );
    }

    #[test]
    fn test_totals_with_negotiated_price() {
        // Two lines: qty 2 @ 10000 list, qty 1 @ 5000 list negotiated to 4000.
        // Subtotal 24000, qty 3 -> 5% = 1200, taxable 22800, GST 4104,
        // total 26904.
        let mut book = QuoteBook::new();
        let mut second = line("p2", 1, 5_000);
        second.negotiated_price = Some(dec(4_000));
        let quote = book
            .create(vec![line("p1", 2, 10_000), second], business(), None)
            .unwrap();

        let totals = book.get(&quote.id).unwrap().totals();
        assert_eq!(totals.subtotal, dec(24_000));
        assert_eq!(totals.discount_percent, dec(5));
        assert_eq!(totals.discount_amount, dec(1_200));
        assert_eq!(totals.taxable_value, dec(22_800));
        assert_eq!(totals.tax_amount, dec(4_104));
        assert_eq!(totals.total, dec(26_904));
    }

    #[test]
    fn test_totals_identities_hold() {
        let mut book = QuoteBook::new();
        let quote = book
            .create(
                vec![line("p1", 4, 19_999), line("p2", 3, 7_501)],
                business(),
                None,
            )
            .unwrap();
        let totals = book.get(&quote.id).unwrap().totals();
        assert_eq!(totals.total, totals.taxable_value + totals.tax_amount);
        assert_eq!(totals.taxable_value, totals.subtotal - totals.discount_amount);
        assert!(totals.discount_amount <= totals.subtotal);
    }

    #[test]
    fn test_serde_roundtrip_preserves_book() {
        let mut book = QuoteBook::new();
        book.create(vec![line("p1", 3, 10_000)], business(), Some("ASAP".to_owned()))
            .unwrap();
        let json = serde_json::to_string(&book).unwrap();
        let restored: QuoteBook = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, book);
    }
}
