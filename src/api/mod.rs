//! Axum handlers emulating the Bakaláři v3 mobile API.
//!
//! Only the endpoints a client touches while logging in and opening the
//! dashboard are served. Any username and password pair is accepted; the
//! password is echoed back as the user's class name.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dummy_bakalari::{HttpDirectory, MemoryStore, VersionCache, api};
//!
//! let versions = VersionCache::start(HttpDirectory::default());
//! let app = api::router(versions, MemoryStore::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

mod error;
mod extractor;
mod routes;
mod state;
mod types;

pub use error::ApiError;
pub use extractor::BearerUser;
pub use routes::{DONATE_URL, router};
pub use state::AppState;
