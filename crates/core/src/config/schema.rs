//! Configuration schema definitions
//!
//! Every section has serde defaults, so an empty file is a valid configuration.

use safepath_geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    #[serde(default)]
    pub hazard: HazardConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub services: ServicesConfig,

    #[serde(default)]
    pub places: PlacesConfig,
}

/// Fixed-origin hazard declaration and polling cadence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HazardConfig {
    /// Declared hazard center. When absent, the hazard is declared at the
    /// user's initial position.
    #[serde(default)]
    pub center: Option<Coordinate>,

    /// Hazard radius in meters
    #[serde(default = "default_radius_meters")]
    pub radius_meters: f64,

    /// Seconds between hazard-signal polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            center: None,
            radius_meters: default_radius_meters(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl HazardConfig {
    /// Polling interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Hazard center, falling back to the given initial position
    pub fn center_or(&self, initial_position: Coordinate) -> Coordinate {
        self.center.unwrap_or(initial_position)
    }
}

fn default_radius_meters() -> f64 {
    5000.0
}

fn default_poll_interval_secs() -> u64 {
    3
}

/// Target selection and route request tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Extra distance beyond the hazard radius a safe place must clear
    #[serde(default = "default_safety_buffer_meters")]
    pub safety_buffer_meters: f64,

    /// Distance beyond the hazard radius at which fallback exits are placed
    #[serde(default = "default_exit_margin_meters")]
    pub exit_margin_meters: f64,

    /// Seconds before an unanswered route request is reported as failed
    #[serde(default = "default_route_timeout_secs")]
    pub route_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            safety_buffer_meters: default_safety_buffer_meters(),
            exit_margin_meters: default_exit_margin_meters(),
            route_timeout_secs: default_route_timeout_secs(),
        }
    }
}

impl EngineConfig {
    pub fn route_timeout(&self) -> Duration {
        Duration::from_secs(self.route_timeout_secs)
    }
}

fn default_safety_buffer_meters() -> f64 {
    100.0
}

fn default_exit_margin_meters() -> f64 {
    300.0
}

fn default_route_timeout_secs() -> u64 {
    20
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServicesConfig {
    /// Base URL of the hazard broadcast service
    #[serde(default = "default_hazard_url")]
    pub hazard_url: String,

    /// Base URL of an OSRM-compatible routing service
    #[serde(default = "default_routing_url")]
    pub routing_url: String,

    /// Overpass API interpreter endpoint
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            hazard_url: default_hazard_url(),
            routing_url: default_routing_url(),
            overpass_url: default_overpass_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_hazard_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_routing_url() -> String {
    "https://routing.openstreetmap.de/routed-foot".to_string()
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Nearby-places query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacesConfig {
    /// Search radius around the initial position, in meters
    #[serde(default = "default_search_radius_meters")]
    pub search_radius_meters: f64,

    /// Maximum number of candidates kept after distance ordering
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// OSM `amenity` values treated as safe places
    #[serde(default = "default_amenities")]
    pub amenities: Vec<String>,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            search_radius_meters: default_search_radius_meters(),
            limit: default_limit(),
            amenities: default_amenities(),
        }
    }
}

fn default_search_radius_meters() -> f64 {
    5000.0
}

fn default_limit() -> usize {
    5
}

fn default_amenities() -> Vec<String> {
    vec!["hospital".to_string(), "shelter".to_string()]
}
