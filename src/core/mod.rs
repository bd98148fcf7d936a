//! Core types - pure abstractions shared across the codebase.

mod route;
mod url;

pub use route::{ADMIN_PREFIX, AdminView, Route};
pub use url::UrlPath;
