//! CLI commands

pub mod run;
pub mod select;
pub mod status;
pub mod trigger;

use anyhow::Result;
use safepath_api_client::{ClientConfig, SafePathClient};
use safepath_core::config::Config;
use safepath_engine::Coordinate;

/// HTTP client from the loaded config plus `SAFEPATH_*` overrides
pub fn client(config: &Config) -> Result<SafePathClient> {
    let client_config = ClientConfig::from_schema(&config.schema).with_env_overrides();
    Ok(SafePathClient::with_config(client_config)?)
}

/// Validate a latitude/longitude pair from the command line
pub fn coordinate(lat: f64, lon: f64) -> Result<Coordinate> {
    Coordinate::try_new(lat, lon).map_err(|e| safepath_core::Error::from(e).into())
}

/// Hazard radius from `--radius`, else the config, rejected unless positive
pub fn radius(flag: Option<f64>, config: &Config) -> Result<f64> {
    let checked = match flag {
        Some(value) => safepath_core::check_radius("--radius", value)?,
        None => safepath_core::check_radius("hazard.radius_meters", config.schema.hazard.radius_meters)?,
    };
    Ok(checked)
}
