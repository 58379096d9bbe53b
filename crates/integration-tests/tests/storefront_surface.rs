//! Storefront-layer integration: form validation, the catalog fallback, and
//! the filter expressions sent to the hosted index.

use rust_decimal::Decimal;

use renewly_core::ProductId;
use renewly_core::pricing;
use renewly_storefront::catalog::Catalog;
use renewly_storefront::models::forms::{
    validate_email, validate_phone, validate_pincode, validate_required,
};
use renewly_storefront::services::search::{SearchFilters, SearchSort};

// =============================================================================
// Inquiry form validation
// =============================================================================

#[test]
fn test_inquiry_field_validation_catches_each_field() {
    assert!(validate_required("company", "").is_err());
    assert!(validate_phone("phone", "12345").is_err());
    assert!(validate_pincode("pincode", "01234").is_err());
    assert!(validate_email("email", "not-an-email").is_err());

    assert!(validate_required("company", "Apex Retail").is_ok());
    assert!(validate_phone("phone", "98765 43210").is_ok());
    assert!(validate_pincode("pincode", "560001").is_ok());
    assert!(validate_email("email", "purchasing@apex.example").is_ok());
}

#[test]
fn test_field_errors_name_the_offending_field() {
    let error = validate_phone("business.phone", "abc").expect_err("invalid phone");
    assert_eq!(error.field, "business.phone");
    assert!(!error.message.is_empty());
}

// =============================================================================
// Catalog fallback
// =============================================================================

#[test]
fn test_sample_catalog_supports_browse_and_detail() {
    let catalog = Catalog::sample();
    assert!(!catalog.all().is_empty());

    let first = &catalog.all()[0];
    let found = catalog.get(&first.id).expect("lookup by id");
    assert_eq!(found.title, first.title);

    // Every sample product should clear the EMI eligibility bar or not,
    // consistently with its price.
    for product in catalog.all() {
        assert_eq!(
            pricing::emi_eligible(product.price),
            product.price >= Decimal::new(15_000, 0)
        );
    }
}

#[test]
fn test_catalog_search_is_case_insensitive() {
    let catalog = Catalog::sample();
    let lower = catalog.search("dell");
    let upper = catalog.search("DELL");
    assert_eq!(lower.len(), upper.len());
    assert!(!lower.is_empty());
}

#[test]
fn test_unknown_product_resolves_to_none() {
    let catalog = Catalog::sample();
    assert!(catalog.get(&ProductId::new("does-not-exist")).is_none());
}

// =============================================================================
// Index filter expressions
// =============================================================================

#[test]
fn test_filters_render_as_simple_conjunctions() {
    let filters = SearchFilters {
        brands: vec!["Dell".to_owned()],
        ram: vec!["16GB".to_owned(), "32GB".to_owned()],
        min_price: Some(Decimal::new(30_000, 0)),
        max_price: None,
        in_stock: Some(true),
    };

    let clauses = filters.clauses();
    assert!(clauses.contains(&"brand IN [\"Dell\"]".to_owned()));
    assert!(clauses.contains(&"ram IN [\"16GB\", \"32GB\"]".to_owned()));
    assert!(clauses.contains(&"price >= 30000".to_owned()));
    assert!(clauses.contains(&"stock > 0".to_owned()));
    assert_eq!(clauses.len(), 4);
}

#[test]
fn test_sort_parameter_round_trip() {
    assert_eq!(SearchSort::parse("price-ascending"), SearchSort::PriceAsc);
    assert_eq!(SearchSort::parse("relevance"), SearchSort::Relevance);
    assert_eq!(SearchSort::PriceDesc.clauses(), vec!["price:desc"]);
}
