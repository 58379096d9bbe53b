//! Hosted search index client.
//!
//! Product browsing and full-text search are delegated to a hosted
//! search-as-a-service index. Filter expressions are simple conjunctions of
//! `field IN [...]` and `field >= / <= value` clauses. Documents fetched by
//! id are cached for five minutes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use renewly_core::ProductId;

use crate::catalog::Product;
use crate::config::SearchConfig;

/// Document cache TTL.
const DOCUMENT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors that can occur when talking to the search index.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Sort orders the product listing supports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSort {
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
}

impl SearchSort {
    /// Parse from URL parameter value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price-ascending" | "price_asc" => Self::PriceAsc,
            "price-descending" | "price_desc" => Self::PriceDesc,
            _ => Self::Relevance,
        }
    }

    /// Index sort clauses for this order.
    #[must_use]
    pub fn clauses(self) -> Vec<String> {
        match self {
            Self::Relevance => Vec::new(),
            Self::PriceAsc => vec!["price:asc".to_owned()],
            Self::PriceDesc => vec!["price:desc".to_owned()],
        }
    }
}

/// Structured filters translated into index filter expressions.
#[derive(Debug, Default, Clone)]
pub struct SearchFilters {
    /// Brands to include (`brand IN [...]`).
    pub brands: Vec<String>,
    /// RAM configurations to include (`ram IN [...]`).
    pub ram: Vec<String>,
    /// Minimum price (inclusive).
    pub min_price: Option<Decimal>,
    /// Maximum price (inclusive).
    pub max_price: Option<Decimal>,
    /// Restrict to in-stock units.
    pub in_stock: Option<bool>,
}

impl SearchFilters {
    /// Render as conjunction clauses for the index.
    #[must_use]
    pub fn clauses(&self) -> Vec<String> {
        let mut clauses = Vec::new();
        if !self.brands.is_empty() {
            clauses.push(in_clause("brand", &self.brands));
        }
        if !self.ram.is_empty() {
            clauses.push(in_clause("ram", &self.ram));
        }
        if let Some(min) = self.min_price {
            clauses.push(format!("price >= {min}"));
        }
        if let Some(max) = self.max_price {
            clauses.push(format!("price <= {max}"));
        }
        if let Some(in_stock) = self.in_stock {
            clauses.push(format!("stock {} 0", if in_stock { ">" } else { "=" }));
        }
        clauses
    }
}

fn in_clause(field: &str, values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|value| format!("\"{}\"", value.replace('"', "")))
        .collect();
    format!("{field} IN [{}]", quoted.join(", "))
}

/// A search request against the products index.
#[derive(Debug, Default, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub filters: SearchFilters,
    pub sort: SearchSort,
    pub limit: usize,
    pub offset: usize,
}

/// Hits plus totals and facet counts.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<Product>,
    pub total_hits: u64,
    /// Facet value counts keyed by field then value.
    pub facets: HashMap<String, HashMap<String, u64>>,
}

#[derive(Debug, Serialize)]
struct IndexSearchBody {
    q: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    filter: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sort: Vec<String>,
    limit: usize,
    offset: usize,
    facets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IndexSearchResponse {
    hits: Vec<Product>,
    #[serde(default, alias = "estimatedTotalHits")]
    estimated_total_hits: u64,
    #[serde(default, alias = "facetDistribution")]
    facet_distribution: HashMap<String, HashMap<String, u64>>,
}

/// Client for the hosted products index.
///
/// Cheap to clone; the HTTP client and document cache are shared.
#[derive(Clone)]
pub struct SearchClient {
    inner: Arc<SearchClientInner>,
}

struct SearchClientInner {
    client: reqwest::Client,
    base_url: String,
    index: String,
    documents: Cache<ProductId, Product>,
}

impl SearchClient {
    /// Create a new search client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&bearer)
                .map_err(|e| SearchError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let documents = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(DOCUMENT_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(SearchClientInner {
                client,
                base_url: config.url.trim_end_matches('/').to_owned(),
                index: config.products_index.clone(),
                documents,
            }),
        })
    }

    /// Run a search against the products index.
    ///
    /// # Errors
    ///
    /// Returns error if the request or response parsing fails; callers
    /// degrade to empty results.
    #[instrument(skip(self, request), fields(q = %request.query))]
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults, SearchError> {
        let url = format!(
            "{}/indexes/{}/search",
            self.inner.base_url, self.inner.index
        );
        let body = IndexSearchBody {
            q: request.query.clone(),
            filter: request.filters.clauses(),
            sort: request.sort.clauses(),
            limit: if request.limit == 0 { 20 } else { request.limit },
            offset: request.offset,
            facets: vec!["brand".to_owned(), "ram".to_owned(), "storage".to_owned()],
        };

        let response = self.inner.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: IndexSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        Ok(SearchResults {
            hits: parsed.hits,
            total_hits: parsed.estimated_total_hits,
            facets: parsed.facet_distribution,
        })
    }

    /// Fetch one product document, or `None` when the index has no such id.
    ///
    /// Documents are cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails for a reason other than not-found.
    #[instrument(skip(self))]
    pub async fn get_document(&self, id: &ProductId) -> Result<Option<Product>, SearchError> {
        if let Some(product) = self.inner.documents.get(id).await {
            return Ok(Some(product));
        }

        let url = format!(
            "{}/indexes/{}/documents/{}",
            self.inner.base_url,
            self.inner.index,
            urlencoding::encode(id.as_str())
        );
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let product: Product = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;
        self.inner.documents.insert(id.clone(), product.clone()).await;
        Ok(Some(product))
    }

    /// Push product documents into the index (used by the CLI seeder).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn add_documents(&self, products: &[Product]) -> Result<(), SearchError> {
        let url = format!(
            "{}/indexes/{}/documents",
            self.inner.base_url, self.inner.index
        );
        let response = self.inner.client.post(&url).json(products).send().await?;
        let status = response.status();
        if !status.is_success() && status.as_u16() != 202 {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Probe the service health endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the service is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), SearchError> {
        let url = format!("{}/health", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: "health check failed".to_owned(),
            });
        }
        Ok(())
    }
}
