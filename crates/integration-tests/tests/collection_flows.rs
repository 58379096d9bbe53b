//! Cart/wishlist/compare integration: collection invariants, derived cart
//! discounts, and the local/remote additive merge policy.

use rust_decimal::Decimal;

use renewly_core::ProductId;
use renewly_core::collections::{
    CartLine, CartState, COMPARE_CAP, CompareAddOutcome, CompareItem, CompareState, WishItem,
    WishlistState,
};
use renewly_core::sync::{SyncOutcome, plan_additive_merge};

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn cart_line(product_id: &str, quantity: u32, unit_price: i64) -> CartLine {
    CartLine {
        product_id: ProductId::new(product_id),
        title: format!("Laptop {product_id}"),
        brand: "HP".to_owned(),
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
        brand: "Lenovo".to_owned(),
        image: format!("/products/{product_id}.png"),
        price: dec(35_999),
    }
}

// =============================================================================
// Cart invariants
// =============================================================================

#[test]
fn test_repeated_adds_collapse_into_one_line() {
    let mut cart = CartState::new();
    cart.add(cart_line("pA", 1, 42_999));
    cart.add(cart_line("pA", 2, 42_999));

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.total_quantity(), 3);
    assert_eq!(cart.subtotal(), dec(128_997));
}

#[test]
fn test_cart_discount_follows_aggregate_quantity() {
    let mut cart = CartState::new();
    cart.add(cart_line("pA", 2, 10_000));
    assert_eq!(cart.bulk_discount().percent, Decimal::ZERO);

    cart.add(cart_line("pB", 1, 4_000));
    let discount = cart.bulk_discount();
    assert_eq!(discount.percent, dec(5));
    assert_eq!(discount.amount, dec(1_200));

    // Crossing into the 7.5% tier
    cart.set_quantity(&ProductId::new("pA"), 4);
    assert_eq!(cart.bulk_discount().percent, Decimal::new(75, 1));
}

#[test]
fn test_quantity_floor_is_one() {
    let mut cart = CartState::new();
    cart.add(cart_line("pA", 3, 10_000));
    cart.set_quantity(&ProductId::new("pA"), 0);
    assert_eq!(
        cart.get(&ProductId::new("pA")).expect("line present").quantity,
        1
    );
}

// =============================================================================
// Wishlist & compare invariants
// =============================================================================

#[test]
fn test_wishlist_is_a_set_by_product() {
    let mut wishlist = WishlistState::new();
    let item = WishItem {
        product_id: ProductId::new("pA"),
        title: "Laptop".to_owned(),
        brand: "Dell".to_owned(),
        image: "/pA.png".to_owned(),
        price: dec(42_999),
    };
    assert!(wishlist.add(item.clone()));
    assert!(!wishlist.add(item));
    assert_eq!(wishlist.items().len(), 1);
}

#[test]
fn test_compare_cap_holds_at_four() {
    let mut compare = CompareState::new();
    for id in ["p1", "p2", "p3", "p4"] {
        assert_eq!(compare.add(compare_item(id)), CompareAddOutcome::Added);
    }
    assert_eq!(compare.add(compare_item("p5")), CompareAddOutcome::CapReached);
    assert_eq!(compare.items().len(), COMPARE_CAP);

    // Removing one opens a slot again
    assert!(compare.remove(&ProductId::new("p2")));
    assert_eq!(compare.add(compare_item("p5")), CompareAddOutcome::Added);
}

#[test]
fn test_saved_sets_survive_clearing_the_tray() {
    let mut compare = CompareState::new();
    compare.add(compare_item("p1"));
    compare.add(compare_item("p2"));
    assert!(compare.save_set("office fleet"));

    compare.clear();
    assert!(compare.is_empty());
    assert_eq!(compare.saved().len(), 1);
    assert_eq!(compare.saved()[0].product_ids.len(), 2);
}

// =============================================================================
// Merge policy
// =============================================================================

#[test]
fn test_sign_in_merge_pushes_guest_lines_and_keeps_remote() {
    // Guest collected pA and pB; the account already has pB and pC remotely.
    let local = vec![
        cart_line("pA", 1, 42_999),
        cart_line("pB", 2, 28_499),
    ];
    let mut remote_b = cart_line("pB", 5, 28_499);
    remote_b.remote_line_id = Some("r-b".to_owned());
    let mut remote_c = cart_line("pC", 1, 64_999);
    remote_c.remote_line_id = Some("r-c".to_owned());
    let remote = vec![remote_b, remote_c];

    let plan = plan_additive_merge(&local, &remote, |line| line.product_id.clone());

    // Only the guest-only line is pushed; remote entries are never deleted
    assert_eq!(plan.to_push.len(), 1);
    assert_eq!(plan.to_push[0].product_id, ProductId::new("pA"));

    let merged = CartState::from_lines(plan.merged);
    assert_eq!(merged.lines().len(), 3);
    // The overlapping line kept the remote quantity (fetched record wins)
    assert_eq!(
        merged.get(&ProductId::new("pB")).expect("line present").quantity,
        5
    );
}

#[test]
fn test_merge_of_empty_local_is_a_pure_download() {
    let local: Vec<CartLine> = Vec::new();
    let remote = vec![cart_line("pA", 1, 42_999)];
    let plan = plan_additive_merge(&local, &remote, |line| line.product_id.clone());
    assert!(plan.to_push.is_empty());
    assert_eq!(plan.merged.len(), 1);
}

#[test]
fn test_merged_compare_respects_the_cap() {
    // Five distinct products across local and remote still cap at four.
    let local = vec![compare_item("p1"), compare_item("p2"), compare_item("p3")];
    let remote = vec![compare_item("p4"), compare_item("p5")];
    let plan = plan_additive_merge(&local, &remote, |item| item.product_id.clone());

    let merged = CompareState::from_items(plan.merged, Vec::new());
    assert_eq!(merged.items().len(), COMPARE_CAP);
}

#[test]
fn test_sync_outcome_reports_propagation() {
    // The outcome type is how callers observe best-effort writes; make sure
    // the distinctions survive serialization for the JSON surface.
    let encoded = serde_json::to_string(&SyncOutcome::RemoteFailed).expect("serialize");
    assert_eq!(encoded, "\"remote_failed\"");
    assert!(SyncOutcome::Synced.is_synced());
    assert!(!SyncOutcome::LocalOnly.is_synced());
}
