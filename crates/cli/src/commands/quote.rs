//! Inspect exported quote books offline.
//!
//! The storefront keeps quote books in per-visitor storage; support exports
//! them as JSON when a buyer asks questions about an old inquiry. These
//! commands read such a file with the same core types the storefront uses,
//! so the derived totals match exactly.

use std::fs;

use renewly_core::QuoteId;
use renewly_core::quote::QuoteBook;

fn load_book(path: &str) -> Result<QuoteBook, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    let book: QuoteBook = serde_json::from_str(&raw)?;
    Ok(book)
}

/// List quotes in an export file, newest first.
///
/// # Errors
///
/// Fails when the file is missing or not a quote book.
pub fn list(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let book = load_book(path)?;
    for quote in book.all() {
        let totals = quote.totals();
        tracing::info!(
            id = %quote.id,
            status = %quote.status,
            company = %quote.business.company_name,
            lines = quote.line_items.len(),
            total = %totals.total,
            "quote"
        );
    }
    tracing::info!(count = book.len(), "quotes in export");
    Ok(())
}

/// Show one quote with its derived totals.
///
/// # Errors
///
/// Fails when the file is unreadable or the id is not present.
pub fn show(path: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let book = load_book(path)?;
    let quote_id = QuoteId::new(id);
    let quote = book
        .get(&quote_id)
        .ok_or_else(|| format!("quote {id} not found in {path}"))?;

    let totals = quote.totals();
    tracing::info!(
        id = %quote.id,
        status = %quote.status,
        created_at = %quote.created_at,
        company = %quote.business.company_name,
        "quote"
    );
    for line in &quote.line_items {
        tracing::info!(
            product = %line.product_id,
            title = %line.title,
            quantity = line.quantity,
            unit_price = %line.effective_unit_price(),
            negotiated = line.negotiated_price.is_some(),
            "line"
        );
    }
    tracing::info!(
        subtotal = %totals.subtotal,
        discount_percent = %totals.discount_percent,
        discount = %totals.discount_amount,
        taxable = %totals.taxable_value,
        tax = %totals.tax_amount,
        total = %totals.total,
        "totals"
    );
    Ok(())
}
