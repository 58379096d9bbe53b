//! Clients for the hosted services the storefront delegates to.
//!
//! Identity, search, and per-identity data storage are external
//! collaborators consumed over HTTP. Clients are constructed once at startup
//! from config and injected through [`crate::state::AppState`]; nothing here
//! is a lazily-initialized module global.

pub mod identity;
pub mod search;
pub mod user_data;

pub use identity::{IdentityClient, IdentityError};
pub use search::{SearchClient, SearchError};
pub use user_data::{UserDataClient, UserDataError};
