//! Search handlers: full search and typeahead suggestions.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::routes::products::{ListingQuery, run_listing};
use crate::services::search::SearchResults;
use crate::state::AppState;

/// Full search with facets; identical contract to the product listing.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Json<SearchResults> {
    Json(run_listing(&state, &query).await)
}

/// Suggestion query parameters.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// One typeahead suggestion.
#[derive(Debug, Serialize)]
pub struct Suggestion {
    pub product_id: String,
    pub title: String,
    pub brand: String,
}

/// Typeahead suggestions: top matches by title.
///
/// The UI debounces keystrokes (last-input-wins) before calling this, so a
/// small limit is enough.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Json<Vec<Suggestion>> {
    if query.q.trim().is_empty() {
        return Json(Vec::new());
    }

    let listing = ListingQuery {
        q: Some(query.q),
        limit: Some(5),
        ..Default::default()
    };
    let results = run_listing(&state, &listing).await;

    Json(
        results
            .hits
            .into_iter()
            .map(|product| Suggestion {
                product_id: product.id.into_inner(),
                title: product.title,
                brand: product.brand,
            })
            .collect(),
    )
}
