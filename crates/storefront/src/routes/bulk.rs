//! Bulk-quote route handlers: inquiry submission, the status machine, line
//! price negotiation, and invoice figures.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use renewly_core::quote::{
    BusinessInfo, GST_RATE_PERCENT, Quote, QuoteLineItem, QuoteStatus, QuoteTotals,
};
use renewly_core::{ProductId, QuoteId};

use crate::error::{AppError, Result};
use crate::models::forms::{validate_email, validate_phone, validate_required};
use crate::routes::products::resolve_product;
use crate::state::AppState;
use crate::stores::quotes::QuoteStore;

/// One requested line on the inquiry form.
#[derive(Debug, Deserialize)]
pub struct InquiryLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Business details on the inquiry form.
#[derive(Debug, Deserialize)]
pub struct InquiryBusiness {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

/// The bulk inquiry submission.
#[derive(Debug, Deserialize)]
pub struct InquiryBody {
    pub items: Vec<InquiryLine>,
    pub business: InquiryBusiness,
    pub notes: Option<String>,
}

/// A quote with its derived figures and the moves available next.
#[derive(Debug, Serialize)]
pub struct QuoteView {
    #[serde(flatten)]
    pub quote: Quote,
    pub totals: QuoteTotals,
    pub next_statuses: Vec<QuoteStatus>,
}

impl From<Quote> for QuoteView {
    fn from(quote: Quote) -> Self {
        let totals = quote.totals();
        let next_statuses = quote.status.successors().to_vec();
        Self {
            quote,
            totals,
            next_statuses,
        }
    }
}

/// A row in the quote list.
#[derive(Debug, Serialize)]
pub struct QuoteSummary {
    pub id: QuoteId,
    pub created_at: DateTime<Utc>,
    pub status: QuoteStatus,
    pub company_name: String,
    pub line_count: usize,
    pub total_quantity: u32,
    pub total: Decimal,
}

/// Validate the business block into a typed [`BusinessInfo`].
fn validate_business(input: &InquiryBusiness) -> Result<BusinessInfo> {
    let mut errors = Vec::new();

    if let Err(error) = validate_required("business.company_name", &input.company_name) {
        errors.push(error);
    }
    if let Err(error) = validate_required("business.contact_name", &input.contact_name) {
        errors.push(error);
    }
    if let Err(error) = validate_phone("business.phone", &input.phone) {
        errors.push(error);
    }
    let email = match validate_email("business.email", &input.email) {
        Ok(email) => Some(email),
        Err(error) => {
            errors.push(error);
            None
        }
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // errors is empty, so email parsed
    let email = email.ok_or_else(|| AppError::Internal("email validation".to_owned()))?;
    Ok(BusinessInfo {
        company_name: input.company_name.trim().to_owned(),
        contact_name: input.contact_name.trim().to_owned(),
        email,
        phone: input.phone.trim().to_owned(),
        tax_id: input.tax_id.clone().filter(|value| !value.trim().is_empty()),
        address: input.address.clone().filter(|value| !value.trim().is_empty()),
    })
}

/// Submit a bulk inquiry, creating a quote in `requested` status.
#[instrument(skip(state, session, body))]
pub async fn create_inquiry(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<InquiryBody>,
) -> Result<Json<QuoteView>> {
    let business = validate_business(&body.business)?;

    let mut line_items = Vec::with_capacity(body.items.len());
    for line in &body.items {
        let product = resolve_product(&state, &line.product_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("product {}", line.product_id)))?;
        line_items.push(QuoteLineItem {
            product_id: product.id,
            title: product.title,
            brand: product.brand,
            quantity: line.quantity,
            list_price: product.price,
            negotiated_price: None,
        });
    }

    let quote = QuoteStore::new(&session)
        .create(line_items, business, body.notes)
        .await?;
    Ok(Json(quote.into()))
}

/// List quotes, newest first.
#[instrument(skip(session))]
pub async fn list_quotes(session: Session) -> Json<Vec<QuoteSummary>> {
    let book = QuoteStore::new(&session).load().await;
    let summaries = book
        .all()
        .iter()
        .map(|quote| QuoteSummary {
            id: quote.id.clone(),
            created_at: quote.created_at,
            status: quote.status,
            company_name: quote.business.company_name.clone(),
            line_count: quote.line_items.len(),
            total_quantity: quote.total_quantity(),
            total: quote.totals().total,
        })
        .collect();
    Json(summaries)
}

/// Show one quote with derived totals.
#[instrument(skip(session))]
pub async fn show_quote(session: Session, Path(id): Path<QuoteId>) -> Result<Json<QuoteView>> {
    let quote = QuoteStore::new(&session)
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("quote {id}")))?;
    Ok(Json(quote.into()))
}

/// Status transition request.
#[derive(Debug, Deserialize)]
pub struct TransitionBody {
    pub status: QuoteStatus,
}

/// Advance a quote to its next status. Skips and backward moves are
/// rejected with `409` and the record is left unchanged.
#[instrument(skip(session))]
pub async fn transition_status(
    session: Session,
    Path(id): Path<QuoteId>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<QuoteView>> {
    let quote = QuoteStore::new(&session).transition(&id, body.status).await?;
    Ok(Json(quote.into()))
}

/// Line price request; omitting `negotiated_price` clears the override.
#[derive(Debug, Deserialize)]
pub struct LinePriceBody {
    pub product_id: ProductId,
    pub negotiated_price: Option<Decimal>,
}

/// Set or clear a negotiated unit price on one line.
#[instrument(skip(session))]
pub async fn set_line_price(
    session: Session,
    Path(id): Path<QuoteId>,
    Json(body): Json<LinePriceBody>,
) -> Result<Json<QuoteView>> {
    let quote = QuoteStore::new(&session)
        .set_line_price(&id, &body.product_id, body.negotiated_price)
        .await?;
    Ok(Json(quote.into()))
}

/// One invoice row.
#[derive(Debug, Serialize)]
pub struct InvoiceLine {
    pub title: String,
    pub brand: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

/// Invoice figures derived from a quote.
#[derive(Debug, Serialize)]
pub struct InvoiceView {
    pub quote_id: QuoteId,
    pub status: QuoteStatus,
    pub bill_to: BusinessInfo,
    pub lines: Vec<InvoiceLine>,
    pub gst_rate_percent: Decimal,
    pub totals: QuoteTotals,
}

/// Invoice for a quote: same line items and totals computation as the quote
/// detail, so the two can never disagree.
#[instrument(skip(session))]
pub async fn invoice(session: Session, Path(id): Path<QuoteId>) -> Result<Json<InvoiceView>> {
    let quote = QuoteStore::new(&session)
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("quote {id}")))?;

    let lines = quote
        .line_items
        .iter()
        .map(|line| InvoiceLine {
            title: line.title.clone(),
            brand: line.brand.clone(),
            quantity: line.quantity,
            unit_price: line.effective_unit_price(),
            amount: line.effective_unit_price() * Decimal::from(line.quantity),
        })
        .collect();

    Ok(Json(InvoiceView {
        quote_id: quote.id.clone(),
        status: quote.status,
        bill_to: quote.business.clone(),
        lines,
        gst_rate_percent: *GST_RATE_PERCENT,
        totals: quote.totals(),
    }))
}
