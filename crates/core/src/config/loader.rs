//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{check_radius, Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or the standard locations, falling
    /// back to defaults when no file exists.
    ///
    /// An explicit path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        let config = Self {
            schema,
            path: config_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let schema: ConfigSchema = toml::from_str(content)?;
        let config = Self { schema, path: None };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let hazard = &self.schema.hazard;
        check_radius("hazard.radius_meters", hazard.radius_meters)?;
        if hazard.poll_interval_secs == 0 {
            return Err(Error::invalid_config("hazard.poll_interval_secs", "cannot be zero"));
        }
        if let Some(center) = hazard.center {
            if !center.is_valid() {
                return Err(Error::invalid_coordinate(format!(
                    "hazard.center {} is out of range",
                    center
                )));
            }
        }

        let engine = &self.schema.engine;
        if !(engine.safety_buffer_meters.is_finite() && engine.safety_buffer_meters >= 0.0) {
            return Err(Error::invalid_config("engine.safety_buffer_meters", "must be >= 0"));
        }
        if !(engine.exit_margin_meters.is_finite() && engine.exit_margin_meters > 0.0) {
            return Err(Error::invalid_config("engine.exit_margin_meters", "must be positive"));
        }
        if engine.route_timeout_secs == 0 {
            return Err(Error::invalid_config("engine.route_timeout_secs", "cannot be zero"));
        }

        let services = &self.schema.services;
        for (field, url) in [
            ("services.hazard_url", &services.hazard_url),
            ("services.routing_url", &services.routing_url),
            ("services.overpass_url", &services.overpass_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::invalid_config(field, "must start with http:// or https://"));
            }
        }
        if services.timeout_secs == 0 {
            return Err(Error::invalid_config("services.timeout_secs", "cannot be zero"));
        }

        if self.schema.places.limit == 0 {
            return Err(Error::invalid_config("places.limit", "cannot be zero"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("safepath.toml"),
        PathBuf::from(".safepath.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("safepath").join("config.toml"));
    }

    candidates.into_iter().find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.hazard.radius_meters, 5000.0);
        assert_eq!(config.schema.hazard.poll_interval_secs, 3);
        assert_eq!(config.schema.engine.safety_buffer_meters, 100.0);
        assert_eq!(config.schema.engine.exit_margin_meters, 300.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/safepath.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[hazard]
center = {{ latitude = 12.9716, longitude = 77.5946 }}
radius_meters = 2000.0

[places]
limit = 3
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        let center = config.schema.hazard.center.unwrap();
        assert_eq!(center.latitude, 12.9716);
        assert_eq!(config.schema.hazard.radius_meters, 2000.0);
        assert_eq!(config.schema.places.limit, 3);
        // Untouched sections keep their defaults
        assert_eq!(config.schema.hazard.poll_interval_secs, 3);
        assert_eq!(config.schema.places.amenities, vec!["hospital", "shelter"]);
        assert_eq!(config.path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_config_parse_error_has_context() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hazard\nradius_meters = ").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = Config::from_toml("[hazard]\nradius_meters = 0.0").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRadius);

        let err = Config::from_toml("[hazard]\npoll_interval_secs = 0").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);

        let err = Config::from_toml("[services]\nrouting_url = \"ftp://example\"").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);

        let err = Config::from_toml("[hazard]\ncenter = { latitude = 95.0, longitude = 0.0 }")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoordinate);
    }

    #[test]
    fn test_center_fallback() {
        let config = Config::default();
        let initial = safepath_geo::Coordinate::new(1.0, 2.0);
        assert_eq!(config.schema.hazard.center_or(initial), initial);
    }
}
