//! Cart, wishlist, and compare collection state.
//!
//! These are the in-memory halves of the storefront's state containers. All
//! invariants (one cart line per product, compare cap, dedup) are enforced
//! here, so the session/remote plumbing in the storefront crate stays a thin
//! adapter and the rules stay testable without any I/O.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::{self, BulkDiscount, NextTier};
use crate::types::ProductId;

/// Maximum number of products in a comparison at once.
pub const COMPARE_CAP: usize = 4;

// =============================================================================
// Cart
// =============================================================================

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub title: String,
    pub brand: String,
    pub image: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    /// Id of the mirrored line in the remote per-identity store, when one
    /// exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_line_id: Option<String>,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A cart: at most one line per product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from lines, merging duplicates by product id.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.add(line);
        }
        cart
    }

    /// All lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Add a line, merging into an existing line for the same product.
    ///
    /// Adding a product already in the cart increments its quantity rather
    /// than creating a second line. Returns the resulting quantity.
    pub fn add(&mut self, line: CartLine) -> u32 {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            if line.remote_line_id.is_some() {
                existing.remote_line_id = line.remote_line_id;
            }
            existing.quantity
        } else {
            let quantity = line.quantity;
            self.lines.push(line);
            quantity
        }
    }

    /// Remove a product's line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        self.lines.len() != before
    }

    /// Set a line's quantity, clamped to a minimum of one.
    ///
    /// Returns `false` when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        match self
            .lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
        {
            Some(line) => {
                line.quantity = quantity.max(1);
                true
            }
            None => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Bulk discount for the current subtotal and quantity.
    #[must_use]
    pub fn bulk_discount(&self) -> BulkDiscount {
        pricing::discount_amount_for(self.subtotal(), self.total_quantity())
    }

    /// Progress messaging toward the next discount tier.
    #[must_use]
    pub fn next_tier(&self) -> Option<NextTier> {
        pricing::next_tier_info(self.total_quantity())
    }
}

// =============================================================================
// Wishlist
// =============================================================================

/// A saved product in the wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishItem {
    pub product_id: ProductId,
    pub title: String,
    pub brand: String,
    pub image: String,
    pub price: Decimal,
}

/// A wishlist: a product appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistState {
    items: Vec<WishItem>,
}

impl WishlistState {
    /// Create an empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a wishlist from items, dropping duplicates by product id.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = WishItem>) -> Self {
        let mut wishlist = Self::new();
        for item in items {
            wishlist.add(item);
        }
        wishlist
    }

    /// All items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[WishItem] {
        &self.items
    }

    /// Whether a product is wishlisted.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    /// Add an item; a duplicate product id is a no-op.
    ///
    /// Returns whether the item was actually added.
    pub fn add(&mut self, item: WishItem) -> bool {
        if self.contains(&item.product_id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove a product. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() != before
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether the wishlist holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Compare
// =============================================================================

/// A product pinned for side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareItem {
    pub product_id: ProductId,
    pub title: String,
    pub brand: String,
    pub image: String,
    pub price: Decimal,
}

/// A named snapshot of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCompareSet {
    pub name: String,
    pub product_ids: Vec<ProductId>,
}

/// Outcome of an attempted compare add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareAddOutcome {
    /// The product joined the comparison.
    Added,
    /// Already present; nothing changed.
    Duplicate,
    /// The comparison already holds [`COMPARE_CAP`] products; the add is
    /// silently ignored.
    CapReached,
}

/// The comparison tray: at most [`COMPARE_CAP`] distinct products, plus
/// named saved sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareState {
    items: Vec<CompareItem>,
    #[serde(default)]
    saved: Vec<SavedCompareSet>,
}

impl CompareState {
    /// Create an empty comparison.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            saved: Vec::new(),
        }
    }

    /// Build a comparison from items, respecting dedup and the cap; extra
    /// items beyond [`COMPARE_CAP`] are dropped. Saved sets carry over from
    /// `saved`.
    #[must_use]
    pub fn from_items(
        items: impl IntoIterator<Item = CompareItem>,
        saved: Vec<SavedCompareSet>,
    ) -> Self {
        let mut compare = Self::new();
        for item in items {
            compare.add(item);
        }
        compare.saved = saved;
        compare
    }

    /// Products currently under comparison.
    #[must_use]
    pub fn items(&self) -> &[CompareItem] {
        &self.items
    }

    /// Ids of the products under comparison.
    #[must_use]
    pub fn ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|item| item.product_id.clone()).collect()
    }

    /// Whether a product is under comparison.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    /// Add a product, subject to dedup and the cap.
    pub fn add(&mut self, item: CompareItem) -> CompareAddOutcome {
        if self.contains(&item.product_id) {
            return CompareAddOutcome::Duplicate;
        }
        if self.items.len() >= COMPARE_CAP {
            return CompareAddOutcome::CapReached;
        }
        self.items.push(item);
        CompareAddOutcome::Added
    }

    /// Remove a product. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() != before
    }

    /// Remove every product (saved sets are kept).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether no products are under comparison.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Named saved sets, newest first.
    #[must_use]
    pub fn saved(&self) -> &[SavedCompareSet] {
        &self.saved
    }

    /// Snapshot the current comparison under a name.
    ///
    /// Saving under an existing name replaces that set; the newest set sits
    /// at the front. A blank name is rejected.
    pub fn save_set(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.saved.retain(|set| set.name != name);
        self.saved.insert(
            0,
            SavedCompareSet {
                name: name.to_owned(),
                product_ids: self.ids(),
            },
        );
        true
    }

    /// Delete a saved set by name. Returns whether anything was removed.
    pub fn remove_set(&mut self, name: &str) -> bool {
        let before = self.saved.len();
        self.saved.retain(|set| set.name != name);
        self.saved.len() != before
    }
}

// =============================================================================
// Wishlist alerts
// =============================================================================

/// Delivery channel for wishlist alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    Email,
    #[default]
    Messaging,
}

/// Per-product alert preferences for a wishlisted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AlertPreference {
    pub price_drop: bool,
    pub back_in_stock: bool,
    pub channel: AlertChannel,
}

/// Alert preferences keyed by product id.
///
/// Stored separately from the wishlist entries themselves and never
/// synchronized remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertBook(BTreeMap<ProductId, AlertPreference>);

impl AlertBook {
    /// Create an empty book.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Preferences for a product; defaults (all alerts off, messaging
    /// channel) when none have been saved.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> AlertPreference {
        self.0.get(product_id).copied().unwrap_or_default()
    }

    /// Save preferences for a product.
    pub fn set(&mut self, product_id: ProductId, preference: AlertPreference) {
        self.0.insert(product_id, preference);
    }

    /// Drop preferences for a product.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.0.remove(product_id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    fn cart_line(product_id: &str, quantity: u32, unit_price: i64) -> CartLine {
        CartLine {
            product_id: ProductId::new(product_id),
            title: format!("Laptop {product_id}"),
            brand: "Lenovo".to_owned(),
            image: format!("/products/{product_id}.png"),
            unit_price: dec(unit_price),
            quantity,
            remote_line_id: None,
        }
    }

    fn compare_item(product_id: &str) -> CompareItem {
        CompareItem {
            product_id: ProductId::new(product_id),
            title: format!("Laptop {product_id}"),
            brand: "HP".to_owned(),
            image: format!("/products/{product_id}.png"),
            price: dec(39_999),
        }
    }

    #[test]
    fn test_cart_add_merges_by_product() {
        let mut cart = CartState::new();
        cart.add(cart_line("p1", 1, 42_999));
        let quantity = cart.add(cart_line("p1", 2, 42_999));
        assert_eq!(quantity, 3);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_cart_set_quantity_clamps_to_one() {
        let mut cart = CartState::new();
        cart.add(cart_line("p1", 5, 42_999));
        assert!(cart.set_quantity(&ProductId::new("p1"), 0));
        assert_eq!(cart.get(&ProductId::new("p1")).unwrap().quantity, 1);
        assert!(!cart.set_quantity(&ProductId::new("p9"), 2));
    }

    #[test]
    fn test_cart_subtotal_and_discount() {
        let mut cart = CartState::new();
        cart.add(cart_line("p1", 2, 10_000));
        cart.add(cart_line("p2", 1, 4_000));
        assert_eq!(cart.subtotal(), dec(24_000));
        let discount = cart.bulk_discount();
        assert_eq!(discount.percent, dec(5));
        assert_eq!(discount.amount, dec(1_200));
    }

    #[test]
    fn test_cart_next_tier_messaging() {
        let mut cart = CartState::new();
        cart.add(cart_line("p1", 4, 10_000));
        let next = cart.next_tier().unwrap();
        assert_eq!(next.quantity_needed, 1);
    }

    #[test]
    fn test_cart_remove_and_clear() {
        let mut cart = CartState::new();
        cart.add(cart_line("p1", 1, 10_000));
        cart.add(cart_line("p2", 1, 20_000));
        assert!(cart.remove(&ProductId::new("p1")));
        assert!(!cart.remove(&ProductId::new("p1")));
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_wishlist_dedup() {
        let mut wishlist = WishlistState::new();
        let item = WishItem {
            product_id: ProductId::new("p1"),
            title: "Laptop".to_owned(),
            brand: "Dell".to_owned(),
            image: "/p1.png".to_owned(),
            price: dec(42_999),
        };
        assert!(wishlist.add(item.clone()));
        assert!(!wishlist.add(item));
        assert_eq!(wishlist.items().len(), 1);
        assert!(wishlist.contains(&ProductId::new("p1")));
    }

    #[test]
    fn test_compare_cap_silently_ignores_fifth() {
        let mut compare = CompareState::new();
        for id in ["p1", "p2", "p3", "p4"] {
            assert_eq!(compare.add(compare_item(id)), CompareAddOutcome::Added);
        }
        assert_eq!(
            compare.add(compare_item("p5")),
            CompareAddOutcome::CapReached
        );
        assert_eq!(compare.items().len(), COMPARE_CAP);
        assert!(!compare.contains(&ProductId::new("p5")));
    }

    #[test]
    fn test_compare_dedup() {
        let mut compare = CompareState::new();
        assert_eq!(compare.add(compare_item("p1")), CompareAddOutcome::Added);
        assert_eq!(
            compare.add(compare_item("p1")),
            CompareAddOutcome::Duplicate
        );
        assert_eq!(compare.items().len(), 1);
    }

    #[test]
    fn test_compare_saved_sets_replace_by_name() {
        let mut compare = CompareState::new();
        compare.add(compare_item("p1"));
        assert!(compare.save_set("office"));
        compare.add(compare_item("p2"));
        assert!(compare.save_set("office"));

        assert_eq!(compare.saved().len(), 1);
        assert_eq!(compare.saved()[0].product_ids.len(), 2);

        assert!(compare.save_set("gaming"));
        assert_eq!(compare.saved()[0].name, "gaming");

        assert!(!compare.save_set("   "));
        assert!(compare.remove_set("office"));
        assert!(!compare.remove_set("office"));
    }

    #[test]
    fn test_compare_clear_keeps_saved_sets() {
        let mut compare = CompareState::new();
        compare.add(compare_item("p1"));
        compare.save_set("office");
        compare.clear();
        assert!(compare.is_empty());
        assert_eq!(compare.saved().len(), 1);
    }

    #[test]
    fn test_alert_defaults() {
        let book = AlertBook::new();
        let preference = book.get(&ProductId::new("p1"));
        assert!(!preference.price_drop);
        assert!(!preference.back_in_stock);
        assert_eq!(preference.channel, AlertChannel::Messaging);
    }

    #[test]
    fn test_alert_set_get_remove() {
        let mut book = AlertBook::new();
        book.set(
            ProductId::new("p1"),
            AlertPreference {
                price_drop: true,
                back_in_stock: false,
                channel: AlertChannel::Email,
            },
        );
        assert!(book.get(&ProductId::new("p1")).price_drop);
        book.remove(&ProductId::new("p1"));
        assert!(!book.get(&ProductId::new("p1")).price_drop);
    }
}
