//! Routes and route request bookkeeping

use crate::place::EvacuationTarget;
use safepath_geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw walking path as returned by a routing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub polyline: Vec<Coordinate>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Walking path to a named evacuation target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub polyline: Vec<Coordinate>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub target_name: String,
}

impl Route {
    pub fn new(leg: RouteLeg, target_name: impl Into<String>) -> Self {
        Self {
            polyline: leg.polyline,
            distance_meters: leg.distance_meters,
            duration_seconds: leg.duration_seconds,
            target_name: target_name.into(),
        }
    }

    /// Status line shown while the route is active, e.g. `1.2 km · 15 min`
    pub fn summary(&self) -> String {
        format!(
            "{} · {}",
            format_distance(self.distance_meters),
            format_eta(self.duration_seconds)
        )
    }
}

/// Why a route request did not produce a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteFailure {
    /// The service answered but found no walkable path
    NoRoute,
    /// No answer within the configured timeout
    Timeout,
    /// Transport or service error
    Service(String),
}

impl RouteFailure {
    /// Status line shown to the user
    pub fn status_message(&self, target_name: &str) -> String {
        match self {
            Self::NoRoute => format!("No route found to {target_name}"),
            Self::Timeout => format!("Route to {target_name} timed out"),
            Self::Service(_) => format!("Could not reach routing service for {target_name}"),
        }
    }
}

impl fmt::Display for RouteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRoute => write!(f, "no route"),
            Self::Timeout => write!(f, "timed out"),
            Self::Service(reason) => write!(f, "service error: {reason}"),
        }
    }
}

/// Result of one route request
pub type RouteOutcome = Result<RouteLeg, RouteFailure>;

/// State of the most recent route request
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RouteRequestState {
    #[default]
    Idle,
    Pending {
        generation: u64,
    },
    Resolved(Route),
    Failed(RouteFailure),
}

impl RouteRequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Resolved route, if any
    pub fn route(&self) -> Option<&Route> {
        match self {
            Self::Resolved(route) => Some(route),
            _ => None,
        }
    }
}

/// A route request issued by the coordinator, to be executed by the runtime
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Sequence number; only the latest generation may be applied
    pub generation: u64,
    pub origin: Coordinate,
    pub target: EvacuationTarget,
}

/// Format a distance for display
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters.max(0.0))
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Format a walking time for display, rounding up to whole minutes
pub fn format_eta(seconds: f64) -> String {
    let minutes = (seconds.max(0.0) / 60.0).ceil().max(1.0) as u64;
    if minutes < 60 {
        format!("{minutes} min")
    } else if minutes % 60 == 0 {
        format!("{} h", minutes / 60)
    } else {
        format!("{} h {} min", minutes / 60, minutes % 60)
    }
}
