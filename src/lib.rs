#![doc = include_str!("../README.md")]

#[cfg(feature = "server")]
pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod store;
pub mod token;
pub mod types;
pub mod version;

// Re-exports for convenient access
pub use config::ServerConfig;
pub use directory::{City, CityDetails, Directory, HttpDirectory, School, SchoolInfo};
pub use error::Error;
pub use store::{MemoryStore, UserStore};
pub use token::{campaign_category_code, generate_token};
pub use types::{AccessToken, RefreshToken, User, Versions};
pub use version::VersionCache;
