//! HTTP adapters for the SafePath engine
//!
//! Implements the engine's collaborator ports over real services:
//!
//! - **Hazard broadcast**: `GET /danger-status` polling and `POST /danger` trigger
//! - **Safe places**: Overpass API query for hospitals and shelters
//! - **Walking routes**: OSRM `route/v1/foot`
//!
//! Every request carries a fresh `X-Request-ID` and the process-wide
//! `X-Session-ID` for correlation with the logs.
//!
//! # Example
//!
//! ```rust,no_run
//! use safepath_api_client::{ClientConfig, SafePathClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SafePathClient::with_config(ClientConfig::from_env())?;
//!
//!     let status = client.hazard().status().await?;
//!     println!("danger zone active: {}", status.danger_zone);
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;

pub use client::SafePathClient;
pub use config::ClientConfig;
pub use endpoints::{HazardApi, PlacesApi, RoutingApi};
pub use error::{ApiError, ApiResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::SafePathClient;
    pub use crate::config::ClientConfig;
    pub use crate::endpoints::{HazardApi, PlacesApi, RoutingApi};
    pub use crate::error::{ApiError, ApiResult};
}
