//! HTTP surface: identity extraction, multipart handling, and the v1
//! routes.

pub mod error;
pub mod extract;
pub mod routes;

pub use error::ApiError;
pub use extract::CallerIdentity;
pub use routes::{AppState, router};
