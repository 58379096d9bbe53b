//! Renewly Storefront - public e-commerce service.
//!
//! This binary serves the storefront JSON surface on port 3000.
//!
//! # Architecture
//!
//! - Axum with session-backed state containers (cart, wishlist, compare,
//!   bulk quotes)
//! - Pricing and quote lifecycle rules from `renewly-core`
//! - Hosted identity provider for authentication
//! - Hosted search index for the product catalog
//! - Hosted per-identity data store for cross-device cart/wishlist/compare
//!
//! Every hosted service is optional: an unconfigured deployment runs in
//! guest mode against the sample catalog with session-only collections.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{Router, routing::get};
use axum::{Json, extract::State};
use sentry::integrations::tracing as sentry_tracing;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use renewly_storefront::config::StorefrontConfig;
use renewly_storefront::middleware::create_session_layer;
use renewly_storefront::routes;
use renewly_storefront::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "renewly_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Build application state: every hosted-service client is constructed
    // here, once, and injected - nothing is lazily initialized elsewhere.
    let state = AppState::new(config.clone()).expect("Failed to initialize application state");
    tracing::info!(
        identity = state.identity().is_some(),
        search = state.search().is_some(),
        user_data = state.user_data().is_some(),
        "hosted services configured"
    );

    // Create session layer
    let session_layer = create_session_layer(state.config());

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// The storefront has no required dependencies - every hosted service
/// degrades - so readiness reports which collaborators are configured
/// rather than gating on them.
async fn readiness(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ready": true,
        "identity": state.identity().is_some(),
        "search": state.search().is_some(),
        "user_data": state.user_data().is_some(),
    }))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
