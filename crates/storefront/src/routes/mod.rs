//! HTTP route handlers for the storefront JSON surface.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness (reports configured services)
//!
//! # Products & search
//! GET  /products                   - Product listing (hosted index, catalog fallback)
//! GET  /products/{id}              - Product detail
//! GET  /products/{id}/emi          - EMI plans for the product price
//! GET  /search                     - Full search with facets
//! GET  /search/suggest             - Typeahead suggestions
//!
//! # Cart
//! GET    /cart                     - Cart with derived discount totals
//! POST   /cart/add                 - Add product (merges by product id)
//! POST   /cart/update              - Set line quantity
//! POST   /cart/remove              - Remove line
//! POST   /cart/clear               - Empty the cart
//! GET    /cart/count               - Item count badge
//!
//! # Wishlist
//! GET    /wishlist                 - Wishlist
//! POST   /wishlist/add             - Add product (dedup no-op)
//! POST   /wishlist/remove          - Remove product
//! POST   /wishlist/clear           - Empty the wishlist
//! GET    /wishlist/alerts/{id}     - Alert preferences for a product
//! PUT    /wishlist/alerts/{id}     - Save alert preferences
//!
//! # Compare
//! GET    /compare                  - Tray + saved sets
//! POST   /compare/add              - Add product (cap 4, silent ignore)
//! POST   /compare/remove           - Remove product
//! POST   /compare/clear            - Empty the tray
//! POST   /compare/sets             - Save the tray under a name
//! DELETE /compare/sets/{name}      - Delete a saved set
//!
//! # Bulk quotes
//! POST /bulk/inquiry               - Create a quote (status: requested)
//! GET  /bulk/quotes                - List quotes, newest first
//! GET  /bulk/quotes/{id}           - Quote with derived totals
//! POST /bulk/quotes/{id}/status    - Advance the status machine
//! POST /bulk/quotes/{id}/line-price- Set/clear a negotiated line price
//! GET  /bulk/quotes/{id}/invoice   - Invoice figures for the quote
//!
//! # Account (requires auth)
//! GET    /account/addresses        - Saved addresses
//! POST   /account/addresses        - Create address
//! POST   /account/addresses/{id}   - Update address
//! DELETE /account/addresses/{id}   - Delete address
//! GET    /account/preferences      - Preferences
//! PUT    /account/preferences      - Save preferences
//!
//! # Auth
//! POST /auth/sign-in               - Password sign-in (runs collection sync)
//! POST /auth/sign-up               - Registration (runs collection sync)
//! POST /auth/sign-out              - Sign out, drop synced collections
//! GET  /auth/session               - Current session + configured flag
//! POST /auth/reset                 - Request a password reset email
//! ```

pub mod account;
pub mod auth;
pub mod bulk;
pub mod cart;
pub mod compare;
pub mod products;
pub mod search;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/emi", get(products::emi))
}

/// Create the search routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search::search))
        .route("/suggest", get(search::suggest))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/clear", post(wishlist::clear))
        .route(
            "/alerts/{id}",
            get(wishlist::get_alerts).put(wishlist::set_alerts),
        )
}

/// Create the compare routes router.
pub fn compare_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(compare::show))
        .route("/add", post(compare::add))
        .route("/remove", post(compare::remove))
        .route("/clear", post(compare::clear))
        .route("/sets", post(compare::save_set))
        .route("/sets/{name}", delete(compare::remove_set))
}

/// Create the bulk-quote routes router.
pub fn bulk_routes() -> Router<AppState> {
    Router::new()
        .route("/inquiry", post(bulk::create_inquiry))
        .route("/quotes", get(bulk::list_quotes))
        .route("/quotes/{id}", get(bulk::show_quote))
        .route("/quotes/{id}/status", post(bulk::transition_status))
        .route("/quotes/{id}/line-price", post(bulk::set_line_price))
        .route("/quotes/{id}/invoice", get(bulk::invoice))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/addresses",
            get(account::list_addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            post(account::update_address).delete(account::delete_address),
        )
        .route(
            "/preferences",
            get(account::get_preferences).put(account::set_preferences),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-out", post(auth::sign_out))
        .route("/session", get(auth::session))
        .route("/reset", post(auth::reset))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/search", search_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/compare", compare_routes())
        .nest("/bulk", bulk_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
}
