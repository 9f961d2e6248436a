//! Route coordination state machine
//!
//! Turns hazard transitions, position changes and route responses into
//! render commands and route requests. It never performs I/O itself: every
//! `on_*` method returns the [`RouteRequest`] the runtime should execute, if
//! any, and route results are fed back with the generation they were issued
//! under. Results for any generation other than the pending one are dropped.

use crate::hazard::{HazardZoneTracker, ZoneTransition};
use crate::place::{EvacuationTarget, SafePlace};
use crate::render::RenderSurface;
use crate::route::{Route, RouteFailure, RouteOutcome, RouteRequest, RouteRequestState};
use crate::selector::{select_target_with, SelectionPolicy};
use safepath_geo::Coordinate;
use tracing::{debug, info, warn};

/// Status shown while the hazard is active but the user is outside it
pub const OUTSIDE_STATUS: &str = "outside danger zone";

/// Coordinator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing engaged yet
    Idle,
    /// A route request is in flight
    RouteRequested,
    /// A route is rendered
    RouteActive,
    /// The latest request failed; no polyline is rendered
    RouteFailed,
    /// Route, target and alarm were torn down
    Cleared,
}

impl Phase {
    fn is_engaged(self) -> bool {
        matches!(self, Self::RouteRequested | Self::RouteActive | Self::RouteFailed)
    }
}

/// Owns the route state and is the sole writer of the render surface
pub struct RouteCoordinator<S: RenderSurface> {
    tracker: HazardZoneTracker,
    policy: SelectionPolicy,
    places: Vec<SafePlace>,
    position: Option<Coordinate>,
    phase: Phase,
    request: RouteRequestState,
    target: Option<EvacuationTarget>,
    generation: u64,
    surface: S,
}

impl<S: RenderSurface> RouteCoordinator<S> {
    pub fn new(tracker: HazardZoneTracker, policy: SelectionPolicy, surface: S) -> Self {
        Self {
            tracker,
            policy,
            places: Vec::new(),
            position: None,
            phase: Phase::Idle,
            request: RouteRequestState::Idle,
            target: None,
            generation: 0,
            surface,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn request_state(&self) -> &RouteRequestState {
        &self.request
    }

    /// Currently rendered route
    pub fn route(&self) -> Option<&Route> {
        self.request.route()
    }

    pub fn target(&self) -> Option<&EvacuationTarget> {
        self.target.as_ref()
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    pub fn places(&self) -> &[SafePlace] {
        &self.places
    }

    pub fn tracker(&self) -> &HazardZoneTracker {
        &self.tracker
    }

    /// Latest generation issued
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Whether the tracked position is inside the active zone
    pub fn is_inside(&self) -> bool {
        self.position
            .is_some_and(|position| self.tracker.contains_point(&position))
    }

    /// Replace the candidate list (loaded once per session).
    ///
    /// While a route is engaged the target is re-selected, since a real place
    /// may now beat the fallback exit.
    pub fn set_places(&mut self, places: Vec<SafePlace>) -> Option<RouteRequest> {
        let total = places.len();
        self.places = places
            .into_iter()
            .filter(|place| place.location.is_valid())
            .collect();
        info!(
            received = total,
            kept = self.places.len(),
            "Safe places loaded"
        );

        if !(self.tracker.is_active() && self.phase.is_engaged()) {
            return None;
        }
        let (Some(position), Some(zone)) = (self.position, self.tracker.zone()) else {
            return None;
        };

        let target = select_target_with(&self.policy, &position, zone, &self.places);
        if self.target.as_ref() == Some(&target) {
            debug!(target = %target, "Target unchanged after places load");
            return None;
        }
        self.reevaluate()
    }

    /// Feed one polled hazard signal
    pub fn on_hazard_signal(&mut self, active: bool) -> Option<RouteRequest> {
        match self.tracker.ingest_signal(active)? {
            ZoneTransition::Activated => {
                if let Some(zone) = self.tracker.zone() {
                    self.surface.show_hazard(zone);
                }
                self.reevaluate()
            }
            ZoneTransition::Cleared => {
                self.disengage();
                None
            }
        }
    }

    /// Feed a new user position (initial fix or marker drag)
    pub fn on_position(&mut self, position: Coordinate) -> Option<RouteRequest> {
        if !position.is_valid() {
            warn!(%position, "Ignoring invalid position");
            return None;
        }

        self.position = Some(position);
        self.surface.show_user(position);

        if self.tracker.is_active() {
            self.reevaluate()
        } else {
            self.sync_alarm();
            None
        }
    }

    /// Apply a route response. Returns false if it was stale and discarded.
    pub fn on_route_result(&mut self, generation: u64, outcome: RouteOutcome) -> bool {
        let current = matches!(
            self.request,
            RouteRequestState::Pending { generation: pending } if pending == generation
        );
        if !current || generation != self.generation {
            debug!(
                generation,
                latest = self.generation,
                "Discarding stale route response"
            );
            return false;
        }

        let target_name = self
            .target
            .as_ref()
            .map_or_else(|| "target".to_string(), |t| t.name().to_string());

        let outcome = match outcome {
            Ok(leg) if leg.polyline.is_empty() => Err(RouteFailure::NoRoute),
            other => other,
        };

        match outcome {
            Ok(leg) => {
                let route = Route::new(leg, target_name);
                info!(
                    generation,
                    target = %route.target_name,
                    distance_m = route.distance_meters,
                    duration_s = route.duration_seconds,
                    "Route resolved"
                );
                self.surface.show_route(&route);
                self.surface.set_status(Some(&route.summary()));
                self.request = RouteRequestState::Resolved(route);
                self.phase = Phase::RouteActive;
            }
            Err(failure) => {
                warn!(generation, target = %target_name, %failure, "Route request failed");
                self.surface.clear_route();
                self.surface
                    .set_status(Some(&failure.status_message(&target_name)));
                self.request = RouteRequestState::Failed(failure);
                self.phase = Phase::RouteFailed;
            }
        }

        self.sync_alarm();
        true
    }

    /// Inside an active zone: select and request. Otherwise: stand down.
    fn reevaluate(&mut self) -> Option<RouteRequest> {
        let request = match (self.position, self.tracker.zone()) {
            (Some(position), Some(zone)) if zone.contains_point(&position) => {
                let target = select_target_with(&self.policy, &position, zone, &self.places);
                Some(self.issue_request(position, target))
            }
            _ => {
                self.leave_zone();
                None
            }
        };

        self.sync_alarm();
        request
    }

    fn issue_request(&mut self, origin: Coordinate, target: EvacuationTarget) -> RouteRequest {
        self.generation += 1;
        let generation = self.generation;

        info!(
            generation,
            origin = %origin,
            target = %target,
            fallback = target.is_exit_point(),
            "Requesting evacuation route"
        );

        self.surface.clear_route();
        self.surface.show_target(&target);
        self.surface
            .set_status(Some(&format!("Finding route to {}…", target.name())));

        self.request = RouteRequestState::Pending { generation };
        self.phase = Phase::RouteRequested;
        self.target = Some(target.clone());

        RouteRequest {
            generation,
            origin,
            target,
        }
    }

    /// Hazard active, user outside: drop route and target, keep the circle
    fn leave_zone(&mut self) {
        if self.phase.is_engaged() {
            info!("User left the danger zone");
            self.phase = Phase::Cleared;
        }
        self.target = None;
        self.request = RouteRequestState::Idle;
        self.surface.clear_route();
        self.surface.clear_target();
        self.surface.set_status(Some(OUTSIDE_STATUS));
    }

    /// Hazard cleared: tear everything down regardless of phase
    fn disengage(&mut self) {
        self.target = None;
        self.request = RouteRequestState::Idle;
        self.phase = Phase::Cleared;
        self.surface.clear_route();
        self.surface.clear_target();
        self.surface.hide_hazard();
        self.surface.set_status(None);
        self.sync_alarm();
    }

    /// Alarm plays iff the hazard is active and the user is inside it.
    /// Derived from scratch on every call.
    fn sync_alarm(&mut self) {
        if self.is_inside() {
            self.surface.play_alarm();
        } else {
            self.surface.pause_alarm();
        }
    }
}
