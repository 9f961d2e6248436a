//! Safe places and evacuation targets

use safepath_geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name of computed exit points
pub const EXIT_POINT_NAME: &str = "Safe Exit";

/// Category of a safe place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    #[default]
    Hospital,
    Shelter,
    Other,
}

impl PlaceKind {
    /// Parse an OSM `amenity` tag value
    pub fn from_amenity(amenity: &str) -> Self {
        match amenity {
            "hospital" | "clinic" => Self::Hospital,
            "shelter" | "emergency_shelter" => Self::Shelter,
            _ => Self::Other,
        }
    }

    /// Name used when the source has none
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Hospital => "Hospital",
            Self::Shelter => "Shelter",
            Self::Other => "Safe Place",
        }
    }
}

/// A known hospital or shelter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafePlace {
    /// Unique identifier from the source
    pub id: String,
    /// Display name
    pub name: String,
    /// Location
    pub location: Coordinate,
    /// Category
    #[serde(default)]
    pub kind: PlaceKind,
}

impl SafePlace {
    /// Create a new safe place
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: Coordinate,
        kind: PlaceKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            kind,
        }
    }
}

/// Fallback target projected out of the hazard zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitPoint {
    pub location: Coordinate,
}

/// Where the user is sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvacuationTarget {
    /// A real place outside the buffered hazard boundary
    SafePlace(SafePlace),
    /// A computed point past the hazard boundary
    ExitPoint(ExitPoint),
}

impl EvacuationTarget {
    /// Target location
    pub fn location(&self) -> Coordinate {
        match self {
            Self::SafePlace(place) => place.location,
            Self::ExitPoint(exit) => exit.location,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        match self {
            Self::SafePlace(place) => &place.name,
            Self::ExitPoint(_) => EXIT_POINT_NAME,
        }
    }

    /// Whether this is the computed fallback
    pub fn is_exit_point(&self) -> bool {
        matches!(self, Self::ExitPoint(_))
    }

    /// Deep link for handing the target to an external turn-by-turn navigator
    pub fn navigation_url(&self) -> String {
        let at = self.location();
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}&travelmode=walking",
            at.latitude, at.longitude
        )
    }
}

impl fmt::Display for EvacuationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_amenity() {
        assert_eq!(PlaceKind::from_amenity("hospital"), PlaceKind::Hospital);
        assert_eq!(PlaceKind::from_amenity("shelter"), PlaceKind::Shelter);
        assert_eq!(PlaceKind::from_amenity("school"), PlaceKind::Other);
    }

    #[test]
    fn test_target_accessors() {
        let place = SafePlace::new("42", "Victoria Hospital", Coordinate::new(12.96, 77.57), PlaceKind::Hospital);
        let target = EvacuationTarget::SafePlace(place);
        assert_eq!(target.name(), "Victoria Hospital");
        assert!(!target.is_exit_point());

        let exit = EvacuationTarget::ExitPoint(ExitPoint { location: Coordinate::new(1.0, 2.0) });
        assert_eq!(exit.name(), EXIT_POINT_NAME);
        assert_eq!(exit.location(), Coordinate::new(1.0, 2.0));
        assert!(exit.is_exit_point());
    }

    #[test]
    fn test_navigation_url() {
        let exit = EvacuationTarget::ExitPoint(ExitPoint { location: Coordinate::new(12.5, 77.25) });
        assert_eq!(
            exit.navigation_url(),
            "https://www.google.com/maps/dir/?api=1&destination=12.5,77.25&travelmode=walking"
        );
    }

    #[test]
    fn test_place_deserialize_defaults_kind() {
        let json = r#"{"id": "1", "name": "Clinic", "location": {"latitude": 1.0, "longitude": 2.0}}"#;
        let place: SafePlace = serde_json::from_str(json).unwrap();
        assert_eq!(place.kind, PlaceKind::Hospital);
    }

    #[test]
    fn test_target_serialization_is_tagged() {
        let exit = EvacuationTarget::ExitPoint(ExitPoint { location: Coordinate::new(1.0, 2.0) });
        let json = serde_json::to_value(&exit).unwrap();
        assert_eq!(json["type"], "exit_point");
        assert_eq!(json["location"]["latitude"], 1.0);
    }
}
