//! # fastedge-api
//!
//! Client for the FastEdge REST API (`/fastedge/v1`).
//!
//! This crate provides:
//! - Typed application, binary and secret resources
//! - [`FastEdgeClient`] with get, list, find-by-name, create and update calls
//! - [`EnhancedApp`], a pending application fetch that can hydrate its binary
//!
//! ## Example
//!
//! ```ignore
//! use fastedge_api::{ApiConfig, FastEdgeClient};
//!
//! let client = FastEdgeClient::new(ApiConfig::new("https://api.example.com", "key"))?;
//!
//! // Plain fetch
//! let app = client.apps().get(42).await?;
//!
//! // Fetch with the binary resolved in place of its id
//! let app = client.apps().get_by_name("my-app").include_binary().await?;
//! if let Some(binary) = app.binary.as_ref().and_then(|b| b.resolved()) {
//!     println!("checksum: {:?}", binary.checksum);
//! }
//! ```

mod client;
mod enhance;
mod error;
mod types;

pub use client::{Apps, Binaries, FastEdgeClient, Secrets};
pub use enhance::EnhancedApp;
pub use error::{Error, Result};
pub use types::{
    ApiConfig, ApiType, AppResource, AppSecret, Application, AppsQuery, Binary, BinaryRef, Secret,
    SecretResource, SecretSlot, SecretsQuery,
};
