//! Core utilities for the SafePath evacuation engine
//!
//! This crate provides the pieces shared by every other SafePath crate:
//!
//! - **Error handling**: coded errors with context and recovery suggestions
//! - **Configuration**: TOML-based configuration with defaults and validation
//!
//! # Example
//!
//! ```rust,no_run
//! use safepath_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("hazard radius: {} m", config.schema.hazard.radius_meters);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;

pub use error::{check_radius, Error, ErrorCode, ErrorReport, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, EngineConfig, HazardConfig, PlacesConfig, ServicesConfig};
    pub use crate::error::{check_radius, exit_codes, Error, ErrorCode, Result, ResultExt};
}
