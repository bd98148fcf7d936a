//! Configuration section definitions.
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://example.com"
//! description = "Leadership stories and industry news"
//! twitter = "@example"
//! same_as = ["https://www.linkedin.com/company/example"]
//!
//! [backend]
//! url = "https://abcd1234.supabase.co"
//!
//! [storage]
//! bucket = "media"
//!
//! [local]
//! path = "~/.masthead/local.json"
//!
//! [sitemap]
//! path = "public/sitemap.xml"
//! ```

mod backend;
mod local;
pub(crate) mod site;
mod sitemap;
mod storage;

pub use backend::{BACKEND_KEY_ENV, BackendConfig};
pub use local::LocalConfig;
pub use site::SiteSectionConfig;
pub use sitemap::SitemapConfig;
pub use storage::StorageConfig;
