//! Configuration for the SafePath service adapters
//!
//! Built from the `[services]` and `[places]` tables of the config file, with
//! environment variable overrides on top.

use crate::error::{ApiError, ApiResult};
use safepath_core::config::ConfigSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Hazard service base URL override
pub const ENV_HAZARD_URL: &str = "SAFEPATH_HAZARD_URL";
/// Routing service base URL override
pub const ENV_ROUTING_URL: &str = "SAFEPATH_ROUTING_URL";
/// Overpass interpreter URL override
pub const ENV_OVERPASS_URL: &str = "SAFEPATH_OVERPASS_URL";
/// Request timeout override, in seconds
pub const ENV_TIMEOUT_SECS: &str = "SAFEPATH_TIMEOUT_SECS";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the hazard broadcast service
    pub hazard_url: String,
    /// Base URL of an OSRM-compatible routing service
    pub routing_url: String,
    /// Overpass API interpreter endpoint
    pub overpass_url: String,
    /// OSM `amenity` values queried as safe places
    pub amenities: Vec<String>,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_schema(&ConfigSchema::default())
    }
}

impl ClientConfig {
    /// Take endpoints and timeout from a loaded configuration
    pub fn from_schema(schema: &ConfigSchema) -> Self {
        Self {
            hazard_url: schema.services.hazard_url.clone(),
            routing_url: schema.services.routing_url.clone(),
            overpass_url: schema.services.overpass_url.clone(),
            amenities: schema.places.amenities.clone(),
            timeout: Duration::from_secs(schema.services.timeout_secs),
        }
    }

    /// Default configuration with environment overrides applied
    ///
    /// Reads `SAFEPATH_HAZARD_URL`, `SAFEPATH_ROUTING_URL`,
    /// `SAFEPATH_OVERPASS_URL` and `SAFEPATH_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this configuration
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment in production)
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_HAZARD_URL) {
            self.hazard_url = url;
        }
        if let Some(url) = lookup(ENV_ROUTING_URL) {
            self.routing_url = url;
        }
        if let Some(url) = lookup(ENV_OVERPASS_URL) {
            self.overpass_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.trim().parse().ok()) {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Builder-style method to set the hazard service URL
    #[must_use]
    pub fn with_hazard_url(mut self, url: impl Into<String>) -> Self {
        self.hazard_url = url.into();
        self
    }

    /// Builder-style method to set the routing service URL
    #[must_use]
    pub fn with_routing_url(mut self, url: impl Into<String>) -> Self {
        self.routing_url = url.into();
        self
    }

    /// Builder-style method to set the Overpass URL
    #[must_use]
    pub fn with_overpass_url(mut self, url: impl Into<String>) -> Self {
        self.overpass_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        for (name, url) in [
            ("hazard_url", &self.hazard_url),
            ("routing_url", &self.routing_url),
            ("overpass_url", &self.overpass_url),
        ] {
            if url.is_empty() {
                return Err(ApiError::config(format!("{name} cannot be empty")));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ApiError::InvalidUrl(format!(
                    "{name} must start with http:// or https://, got {url}"
                )));
            }
        }

        if self.amenities.is_empty() {
            return Err(ApiError::config("amenities cannot be empty"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}
