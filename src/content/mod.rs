//! Content query layer.
//!
//! # Module Structure
//!
//! ```text
//! content/
//! ├── collection.rs  # Collection names and relations
//! ├── query.rs       # Query builder (PostgREST string + in-memory evaluation)
//! ├── backend.rs     # Backend trait, BackendError
//! ├── rest.rs        # RestBackend (HTTP, also object storage)
//! ├── memory.rs      # MemoryBackend
//! ├── cache.rs       # QueryCache with generation-based invalidation
//! ├── model.rs       # Typed records
//! └── service.rs     # ContentService
//! ```

mod backend;
mod cache;
mod collection;
mod memory;
mod model;
mod query;
mod rest;
mod service;

pub use backend::{Backend, BackendError};
pub use cache::{CacheScope, CachedRows, QueryCache};
pub use collection::Collection;
pub use memory::MemoryBackend;
pub use model::{
    Article, Category, ClientLogo, LeadershipProfile, Magazine, MagazineArticle, PressRelease,
    Record, SettingRecord, Slugged, UpcomingEdition,
};
pub use query::{Direction, Filter, FilterOp, Order, Query};
pub use rest::RestBackend;
pub use service::{ContentService, DashboardStats};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("malformed {collection} row")]
    Decode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("{collection} '{key}' not found")]
    NotFound { collection: Collection, key: String },
}

impl ContentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
