//! Quote lifecycle integration: creation, the strict status walk, negotiated
//! prices flowing into totals, and fail-soft persistence.

use rust_decimal::Decimal;

use renewly_core::quote::{
    BusinessInfo, QuoteBook, QuoteError, QuoteLineItem, QuoteStatus,
};
use renewly_core::sync::fail_soft;
use renewly_core::{Email, ProductId};

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn business() -> BusinessInfo {
    BusinessInfo {
        company_name: "Meridian Systems LLP".to_owned(),
        contact_name: "S. Rao".to_owned(),
        email: Email::parse("it@meridian.example").expect("valid email"),
        phone: "9812345678".to_owned(),
        tax_id: None,
        address: Some("14 MG Road, Bengaluru".to_owned()),
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

// =============================================================================
// Status machine
// =============================================================================

#[test]
fn test_full_walk_to_approval() {
    let mut book = QuoteBook::new();
    let quote = book
        .create(vec![line("p1", 3, 42_999)], business(), None)
        .expect("create");

    // requested -> review succeeds
    book.transition(&quote.id, QuoteStatus::Review).expect("to review");

    // review -> approved directly fails, status stays review
    let err = book
        .transition(&quote.id, QuoteStatus::Approved)
        .expect_err("skip must fail");
    assert!(matches!(err, QuoteError::InvalidTransition { .. }));
    assert_eq!(
        book.get(&quote.id).expect("present").status,
        QuoteStatus::Review
    );

    // review -> quoted -> approved succeeds
    book.transition(&quote.id, QuoteStatus::Quoted).expect("to quoted");
    book.transition(&quote.id, QuoteStatus::Approved).expect("to approved");

    // approved is terminal: approved -> rejected fails
    let err = book
        .transition(&quote.id, QuoteStatus::Rejected)
        .expect_err("terminal");
    assert!(matches!(err, QuoteError::InvalidTransition { .. }));
}

#[test]
fn test_rejection_branch_is_terminal_too() {
    let mut book = QuoteBook::new();
    let quote = book
        .create(vec![line("p1", 5, 30_000)], business(), None)
        .expect("create");
    book.transition(&quote.id, QuoteStatus::Review).expect("to review");
    book.transition(&quote.id, QuoteStatus::Quoted).expect("to quoted");
    book.transition(&quote.id, QuoteStatus::Rejected).expect("to rejected");

    for next in [
        QuoteStatus::Requested,
        QuoteStatus::Review,
        QuoteStatus::Quoted,
        QuoteStatus::Approved,
    ] {
        assert!(book.transition(&quote.id, next).is_err());
    }
}

#[test]
fn test_unknown_quote_is_a_typed_not_found() {
    let mut book = QuoteBook::new();
    let missing = renewly_core::QuoteId::new("Q-ABSENT");
    assert!(matches!(
        book.transition(&missing, QuoteStatus::Review),
        Err(QuoteError::NotFound(_))
    ));
    assert!(matches!(
        book.set_line_price(&missing, &ProductId::new("p1"), Some(dec(1))),
        Err(QuoteError::NotFound(_))
    ));
}

// =============================================================================
// Totals
// =============================================================================

#[test]
fn test_negotiated_price_supersedes_list_price_in_totals() {
    let mut book = QuoteBook::new();
    let mut negotiated = line("p2", 1, 5_000);
    negotiated.negotiated_price = Some(dec(4_000));
    let quote = book
        .create(vec![line("p1", 2, 10_000), negotiated], business(), None)
        .expect("create");

    let totals = book.get(&quote.id).expect("present").totals();
    assert_eq!(totals.subtotal, dec(24_000));
    assert_eq!(totals.discount_percent, dec(5));
    assert_eq!(totals.discount_amount, dec(1_200));
    assert_eq!(totals.taxable_value, dec(22_800));
    assert_eq!(totals.tax_amount, dec(4_104));
    assert_eq!(totals.total, dec(26_904));
}

#[test]
fn test_totals_identities_across_configurations() {
    let configurations: Vec<Vec<QuoteLineItem>> = vec![
        vec![line("p1", 1, 42_999)],
        vec![line("p1", 3, 42_999), line("p2", 1, 28_499)],
        vec![
            line("p1", 4, 19_999),
            line("p2", 3, 7_501),
            line("p3", 5, 64_999),
        ],
    ];

    for lines in configurations {
        let mut book = QuoteBook::new();
        let quote = book.create(lines, business(), None).expect("create");
        let totals = book.get(&quote.id).expect("present").totals();

        assert_eq!(totals.total, totals.taxable_value + totals.tax_amount);
        assert_eq!(totals.taxable_value, totals.subtotal - totals.discount_amount);
        assert!(totals.discount_amount <= totals.subtotal);
    }
}

#[test]
fn test_clearing_a_negotiated_price_restores_list_math() {
    let mut book = QuoteBook::new();
    let quote = book
        .create(vec![line("p1", 3, 10_000)], business(), None)
        .expect("create");
    let pid = ProductId::new("p1");

    book.set_line_price(&quote.id, &pid, Some(dec(9_000))).expect("set");
    assert_eq!(book.get(&quote.id).expect("present").totals().subtotal, dec(27_000));

    book.set_line_price(&quote.id, &pid, None).expect("clear");
    assert_eq!(book.get(&quote.id).expect("present").totals().subtotal, dec(30_000));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_book_roundtrips_through_storage_shape() {
    let mut book = QuoteBook::new();
    book.create(vec![line("p1", 3, 42_999)], business(), Some("urgent".to_owned()))
        .expect("create");
    book.create(vec![line("p2", 10, 28_499)], business(), None)
        .expect("create");

    // Serialized wholesale, as the session store does on every mutation
    let stored = serde_json::to_value(&book).expect("serialize");
    let restored: QuoteBook = fail_soft(Some(stored));
    assert_eq!(restored, book);
}

#[test]
fn test_corrupt_storage_loads_as_empty_book() {
    let restored: QuoteBook = fail_soft(Some(serde_json::json!("not a book")));
    assert!(restored.is_empty());

    let restored: QuoteBook = fail_soft(None);
    assert!(restored.is_empty());
}
