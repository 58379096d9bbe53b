//! Product listing, detail, and EMI handlers.
//!
//! Listings come from the hosted search index when one is configured and
//! fall back to the in-process sample catalog otherwise; index failures
//! degrade to the catalog rather than erroring.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use renewly_core::ProductId;
use renewly_core::pricing::{self, EmiQuote, EmiTenure};

use crate::catalog::Product;
use crate::error::{AppError, Result};
use crate::services::search::{SearchFilters, SearchRequest, SearchResults, SearchSort};
use crate::state::AppState;

/// Resolve a product by id: hosted index first, catalog as fallback.
pub(crate) async fn resolve_product(state: &AppState, id: &ProductId) -> Option<Product> {
    if let Some(search) = state.search() {
        match search.get_document(id).await {
            Ok(Some(product)) => return Some(product),
            Ok(None) => {}
            Err(error) => {
                warn!(%error, product = %id, "index lookup failed, falling back to catalog");
            }
        }
    }
    state.catalog().get(id).cloned()
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// Comma-separated brand filter.
    pub brand: Option<String>,
    /// Comma-separated RAM filter.
    pub ram: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub sort: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListingQuery {
    fn to_request(&self) -> SearchRequest {
        let split = |value: &Option<String>| -> Vec<String> {
            value
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_owned)
                .collect()
        };
        SearchRequest {
            query: self.q.clone().unwrap_or_default(),
            filters: SearchFilters {
                brands: split(&self.brand),
                ram: split(&self.ram),
                min_price: self.min_price,
                max_price: self.max_price,
                in_stock: self.in_stock,
            },
            sort: self.sort.as_deref().map(SearchSort::parse).unwrap_or_default(),
            limit: self.limit.unwrap_or(20).min(100),
            offset: self.offset.unwrap_or(0),
        }
    }
}

/// Run a listing query against the index, degrading to the catalog.
pub(crate) async fn run_listing(state: &AppState, query: &ListingQuery) -> SearchResults {
    let request = query.to_request();

    if let Some(search) = state.search() {
        match search.search(&request).await {
            Ok(results) => return results,
            Err(error) => {
                warn!(%error, "index search failed, falling back to catalog");
            }
        }
    }

    catalog_listing(state, &request)
}

/// Filter and sort the sample catalog the way the index would.
fn catalog_listing(state: &AppState, request: &SearchRequest) -> SearchResults {
    let mut hits: Vec<Product> = state
        .catalog()
        .search(&request.query)
        .into_iter()
        .filter(|product| {
            let filters = &request.filters;
            (filters.brands.is_empty() || filters.brands.contains(&product.brand))
                && (filters.ram.is_empty() || filters.ram.contains(&product.ram))
                && filters.min_price.is_none_or(|min| product.price >= min)
                && filters.max_price.is_none_or(|max| product.price <= max)
                && filters.in_stock.is_none_or(|wanted| product.in_stock() == wanted)
        })
        .cloned()
        .collect();

    match request.sort {
        SearchSort::PriceAsc => hits.sort_by(|a, b| a.price.cmp(&b.price)),
        SearchSort::PriceDesc => hits.sort_by(|a, b| b.price.cmp(&a.price)),
        SearchSort::Relevance => {}
    }

    let total = hits.len() as u64;
    let hits: Vec<Product> = hits
        .into_iter()
        .skip(request.offset)
        .take(request.limit)
        .collect();

    let mut facets = std::collections::HashMap::new();
    let mut brand_counts: std::collections::HashMap<String, u64> =
        std::collections::HashMap::new();
    for product in state.catalog().all() {
        *brand_counts.entry(product.brand.clone()).or_default() += 1;
    }
    facets.insert("brand".to_owned(), brand_counts);

    SearchResults {
        hits,
        total_hits: total,
        facets,
    }
}

/// Product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Json<SearchResults> {
    Json(run_listing(&state, &query).await)
}

/// Product detail payload.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub emi_eligible: bool,
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let product = resolve_product(&state, &id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let emi_eligible = pricing::emi_eligible(product.price);
    Ok(Json(ProductView {
        product,
        emi_eligible,
    }))
}

/// One EMI plan row.
#[derive(Debug, Serialize)]
pub struct EmiPlanView {
    pub tenure_months: u32,
    pub annual_rate_percent: u32,
    #[serde(flatten)]
    pub quote: EmiQuote,
}

/// EMI payload for a product.
#[derive(Debug, Serialize)]
pub struct EmiView {
    pub eligible: bool,
    pub min_order_value: Decimal,
    pub principal: Decimal,
    pub plans: Vec<EmiPlanView>,
}

/// EMI plans for a product's price across all offered tenures.
#[instrument(skip(state))]
pub async fn emi(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<EmiView>> {
    let product = resolve_product(&state, &id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let mut plans = Vec::with_capacity(EmiTenure::ALL.len());
    for tenure in EmiTenure::ALL {
        let quote = pricing::installment_for_tenure(product.price, tenure)
            .map_err(|error| AppError::BadRequest(error.to_string()))?;
        plans.push(EmiPlanView {
            tenure_months: tenure.months(),
            annual_rate_percent: tenure.annual_rate_percent(),
            quote,
        });
    }

    Ok(Json(EmiView {
        eligible: pricing::emi_eligible(product.price),
        min_order_value: *pricing::EMI_MIN_PRINCIPAL,
        principal: product.price,
        plans,
    }))
}
