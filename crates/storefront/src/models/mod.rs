//! Request/response models and session types.

pub mod forms;
pub mod session;

pub use session::{CurrentUser, session_keys};
