//! Endpoint-specific API implementations
//!
//! Each module wraps one external service and implements the matching
//! engine port.
//!
//! | Module | Service | Port |
//! |--------|---------|------|
//! | `hazard` | `GET /danger-status`, `POST /danger` | `HazardSignalSource` |
//! | `places` | Overpass API interpreter | `PlacesSource` |
//! | `routing` | OSRM `route/v1/foot` | `RouteService` |

pub mod hazard;
pub mod places;
pub mod routing;

pub use hazard::{DangerStatus, HazardApi, TriggerResponse};
pub use places::{overpass_query, OverpassElement, OverpassResponse, PlacesApi};
pub use routing::{OsrmResponse, RoutingApi};
