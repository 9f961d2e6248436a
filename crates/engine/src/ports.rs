//! Collaborator capabilities
//!
//! The engine reaches the outside world only through these traits. HTTP
//! adapters live in `safepath-api-client`; tests use scripted fakes.

use crate::error::EngineResult;
use crate::place::SafePlace;
use crate::route::RouteLeg;
use safepath_geo::Coordinate;
use std::future::Future;

/// Binary hazard broadcast
pub trait HazardSignalSource: Send + Sync + 'static {
    /// Read the current flag. Errors are transient; the caller keeps its state.
    fn poll(&self) -> impl Future<Output = EngineResult<bool>> + Send;
}

/// Nearby hospitals and shelters
pub trait PlacesSource: Send + Sync + 'static {
    /// Places within `radius_meters` of `origin`, in any order
    fn nearby(
        &self,
        origin: Coordinate,
        radius_meters: f64,
    ) -> impl Future<Output = EngineResult<Vec<SafePlace>>> + Send;
}

/// Walking directions
pub trait RouteService: Send + Sync + 'static {
    /// Walking route between two points; `Ok(None)` when no route exists
    fn walking_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = EngineResult<Option<RouteLeg>>> + Send;
}

impl<T: HazardSignalSource> HazardSignalSource for std::sync::Arc<T> {
    fn poll(&self) -> impl Future<Output = EngineResult<bool>> + Send {
        (**self).poll()
    }
}

impl<T: PlacesSource> PlacesSource for std::sync::Arc<T> {
    fn nearby(
        &self,
        origin: Coordinate,
        radius_meters: f64,
    ) -> impl Future<Output = EngineResult<Vec<SafePlace>>> + Send {
        (**self).nearby(origin, radius_meters)
    }
}

impl<T: RouteService> RouteService for std::sync::Arc<T> {
    fn walking_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = EngineResult<Option<RouteLeg>>> + Send {
        (**self).walking_route(origin, destination)
    }
}
