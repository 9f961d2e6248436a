//! Danger-zone evacuation engine
//!
//! Tracks a fixed-origin hazard zone driven by a polled signal, chooses the
//! nearest safe place outside a buffered boundary (or projects an exit
//! point), and coordinates walking-route requests so only the latest result
//! is ever rendered.
//!
//! # Layers
//!
//! - [`hazard`]: zone state and signal transitions
//! - [`selector`]: pure target selection
//! - [`coordinator`]: synchronous state machine over a [`RenderSurface`]
//! - [`runtime`]: tokio event loop wiring the coordinator to the [`ports`]
//!
//! # Example
//!
//! ```
//! use safepath_engine::{select_target, HazardZone, Coordinate};
//!
//! let center = Coordinate::new(12.9716, 77.5946);
//! let zone = HazardZone { center, radius_meters: 2000.0, active: true };
//! let target = select_target(&center, &zone, &[]);
//! assert!(target.is_exit_point());
//! ```

pub mod coordinator;
pub mod error;
pub mod hazard;
pub mod place;
pub mod ports;
pub mod render;
pub mod route;
pub mod runtime;
pub mod selector;

pub use coordinator::{Phase, RouteCoordinator, OUTSIDE_STATUS};
pub use error::{EngineError, EngineResult};
pub use hazard::{HazardDeclaration, HazardZone, HazardZoneTracker, ZoneTransition};
pub use place::{EvacuationTarget, ExitPoint, PlaceKind, SafePlace, EXIT_POINT_NAME};
pub use ports::{HazardSignalSource, PlacesSource, RouteService};
pub use render::{RecordingSurface, RenderCommand, RenderSurface};
pub use route::{
    format_distance, format_eta, Route, RouteFailure, RouteLeg, RouteOutcome, RouteRequest,
    RouteRequestState,
};
pub use runtime::{Engine, EngineEvent, EngineHandle, EngineSettings};
pub use selector::{select_target, select_target_with, SelectionPolicy};

pub use safepath_geo::Coordinate;
