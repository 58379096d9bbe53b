//! Integration tests for Renewly.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p renewly-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `pricing_scenarios` - Discount tiers and EMI math end to end
//! - `quote_lifecycle` - Quote creation, the status machine, derived totals,
//!   and persistence round-trips
//! - `collection_flows` - Cart/wishlist/compare invariants and the
//!   local/remote merge policy
//!
//! These exercise cross-crate behavior through the public APIs without any
//! network or server; the hosted-service clients are covered separately by
//! their own unit tests.
