//! Hazard zone tracking
//!
//! The zone is declared once, at a fixed center and radius. The polled
//! hazard signal only toggles whether it is active; it never recenters.

use crate::error::{EngineError, EngineResult};
use safepath_geo::{distance_meters, Coordinate};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fixed origin and extent of the hazard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardDeclaration {
    pub center: Coordinate,
    pub radius_meters: f64,
}

impl HazardDeclaration {
    /// Create a declaration, rejecting invalid centers and non-positive radii
    pub fn new(center: Coordinate, radius_meters: f64) -> EngineResult<Self> {
        if !center.is_valid() {
            return Err(EngineError::InvalidDeclaration(format!(
                "center {center} is out of range"
            )));
        }
        if !(radius_meters.is_finite() && radius_meters > 0.0) {
            return Err(EngineError::InvalidDeclaration(format!(
                "radius must be positive, got {radius_meters}"
            )));
        }
        Ok(Self {
            center,
            radius_meters,
        })
    }
}

/// Circular hazard region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardZone {
    pub center: Coordinate,
    pub radius_meters: f64,
    pub active: bool,
}

impl HazardZone {
    /// True iff the zone is active and `point` is strictly within the radius.
    /// A point exactly on the boundary is outside.
    pub fn contains_point(&self, point: &Coordinate) -> bool {
        self.active && distance_meters(point, &self.center) < self.radius_meters
    }
}

/// Change in the zone's `active` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneTransition {
    /// The declared hazard started broadcasting
    Activated,
    /// The hazard was cleared
    Cleared,
}

/// Owns the hazard zone and turns raw signals into transitions
#[derive(Debug, Clone)]
pub struct HazardZoneTracker {
    declaration: HazardDeclaration,
    zone: Option<HazardZone>,
}

impl HazardZoneTracker {
    /// Create a tracker; the zone stays absent until the first signal
    pub fn new(declaration: HazardDeclaration) -> Self {
        Self {
            declaration,
            zone: None,
        }
    }

    pub fn declaration(&self) -> &HazardDeclaration {
        &self.declaration
    }

    /// Current zone, if any signal has been received
    pub fn zone(&self) -> Option<&HazardZone> {
        self.zone.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.zone.is_some_and(|zone| zone.active)
    }

    /// Record a hazard signal.
    ///
    /// Returns a transition only when `active` flips. An absent zone counts as
    /// inactive, so a first `true` signal activates.
    pub fn ingest_signal(&mut self, active: bool) -> Option<ZoneTransition> {
        let was_active = self.is_active();
        let declaration = self.declaration;

        let zone = self.zone.get_or_insert(HazardZone {
            center: declaration.center,
            radius_meters: declaration.radius_meters,
            active,
        });
        zone.active = active;

        let transition = match (was_active, active) {
            (false, true) => Some(ZoneTransition::Activated),
            (true, false) => Some(ZoneTransition::Cleared),
            _ => None,
        };

        if let Some(transition) = transition {
            info!(
                ?transition,
                center = %declaration.center,
                radius_m = declaration.radius_meters,
                "Hazard zone transition"
            );
        }

        transition
    }

    /// True iff the zone is active and contains `point`
    pub fn contains_point(&self, point: &Coordinate) -> bool {
        self.zone.is_some_and(|zone| zone.contains_point(point))
    }
}
