//! End-to-end engine scenarios with scripted collaborators and paused time

use safepath_engine::{
    select_target, Coordinate, Engine, EngineError, EngineHandle, EngineResult, EngineSettings,
    EvacuationTarget, HazardDeclaration, HazardSignalSource, HazardZone, Phase, PlaceKind,
    PlacesSource, RecordingSurface, RenderCommand, RenderSurface, Route, RouteCoordinator,
    RouteLeg, RouteService, SafePlace, EXIT_POINT_NAME, OUTSIDE_STATUS,
};
use safepath_geo::{distance_meters, meters_per_degree};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_test::assert_ok;

const CENTER: Coordinate = Coordinate { latitude: 12.9716, longitude: 77.5946 };
const RADIUS: f64 = 2000.0;

fn north(meters: f64) -> Coordinate {
    Coordinate::new(CENTER.latitude + meters / meters_per_degree(), CENTER.longitude)
}

/// Surface shared between the engine and the test
#[derive(Clone, Default)]
struct SharedSurface(Arc<Mutex<RecordingSurface>>);

impl SharedSurface {
    fn get(&self) -> MutexGuard<'_, RecordingSurface> {
        self.0.lock().unwrap()
    }
}

impl RenderSurface for SharedSurface {
    fn show_hazard(&mut self, zone: &HazardZone) {
        self.get().show_hazard(zone);
    }
    fn hide_hazard(&mut self) {
        self.get().hide_hazard();
    }
    fn show_user(&mut self, position: Coordinate) {
        self.get().show_user(position);
    }
    fn show_route(&mut self, route: &Route) {
        self.get().show_route(route);
    }
    fn clear_route(&mut self) {
        self.get().clear_route();
    }
    fn show_target(&mut self, target: &EvacuationTarget) {
        self.get().show_target(target);
    }
    fn clear_target(&mut self) {
        self.get().clear_target();
    }
    fn set_status(&mut self, status: Option<&str>) {
        self.get().set_status(status);
    }
    fn play_alarm(&mut self) {
        self.get().play_alarm();
    }
    fn pause_alarm(&mut self) {
        self.get().pause_alarm();
    }
}

/// Replays a fixed sequence of poll results, repeating the last one
struct ScriptedSignal {
    script: Vec<Option<bool>>,
    polls: AtomicUsize,
}

impl ScriptedSignal {
    fn new(script: Vec<Option<bool>>) -> Self {
        Self {
            script,
            polls: AtomicUsize::new(0),
        }
    }
}

impl HazardSignalSource for ScriptedSignal {
    async fn poll(&self) -> EngineResult<bool> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.get(n).or(self.script.last()).copied().flatten();
        step.ok_or_else(|| EngineError::signal("connection refused"))
    }
}

struct FixedPlaces(Option<Vec<SafePlace>>);

impl PlacesSource for FixedPlaces {
    async fn nearby(&self, _origin: Coordinate, _radius: f64) -> EngineResult<Vec<SafePlace>> {
        self.0
            .clone()
            .ok_or_else(|| EngineError::places("overpass unavailable"))
    }
}

/// Answers each call after a scripted delay with a straight two-point leg
struct DelayedRouter {
    delays: Mutex<VecDeque<Duration>>,
}

impl DelayedRouter {
    fn new(delays: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            delays: Mutex::new(delays.into_iter().collect()),
        }
    }
}

impl RouteService for DelayedRouter {
    async fn walking_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> EngineResult<Option<RouteLeg>> {
        let delay = self.delays.lock().unwrap().pop_front().unwrap_or_default();
        tokio::time::sleep(delay).await;
        Ok(Some(RouteLeg {
            polyline: vec![origin, destination],
            distance_meters: distance_meters(&origin, &destination),
            duration_seconds: distance_meters(&origin, &destination) / 1.4,
        }))
    }
}

struct Harness {
    surface: SharedSurface,
    handle: EngineHandle,
    running: JoinHandle<RouteCoordinator<SharedSurface>>,
}

impl Harness {
    fn start(
        user: Coordinate,
        signal: ScriptedSignal,
        places: FixedPlaces,
        router: DelayedRouter,
    ) -> Self {
        let surface = SharedSurface::default();
        let (engine, handle) = Engine::new(
            HazardDeclaration::new(CENTER, RADIUS).unwrap(),
            user,
            EngineSettings::default(),
            surface.clone(),
            signal,
            places,
            router,
        )
        .unwrap();

        Self {
            surface,
            handle,
            running: tokio::spawn(engine.run()),
        }
    }

    async fn stop(self) -> RouteCoordinator<SharedSurface> {
        assert_ok!(self.handle.shutdown().await);
        self.running.await.unwrap()
    }
}

async fn advance(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[test]
fn scenario_a_place_beyond_buffer_is_chosen() {
    let zone = HazardZone { center: CENTER, radius_meters: RADIUS, active: true };
    let place = SafePlace::new("n1", "City Hospital", north(2500.0), PlaceKind::Hospital);

    let target = select_target(&CENTER, &zone, std::slice::from_ref(&place));
    assert_eq!(target, EvacuationTarget::SafePlace(place));
}

#[test]
fn scenario_b_place_inside_buffer_falls_back_to_exit() {
    let zone = HazardZone { center: CENTER, radius_meters: RADIUS, active: true };
    let place = SafePlace::new("n1", "Clinic", north(1500.0), PlaceKind::Hospital);

    let target = select_target(&CENTER, &zone, &[place]);
    assert!(target.is_exit_point());
    assert_eq!(target.name(), EXIT_POINT_NAME);
}

#[tokio::test(start_paused = true)]
async fn scenario_a_engine_routes_to_loaded_place() {
    let place = SafePlace::new("n1", "City Hospital", north(2500.0), PlaceKind::Hospital);
    let harness = Harness::start(
        CENTER,
        ScriptedSignal::new(vec![Some(true)]),
        FixedPlaces(Some(vec![place.clone()])),
        DelayedRouter::new([]),
    );

    advance(500).await;
    {
        let surface = harness.surface.get();
        assert_eq!(surface.target, Some(EvacuationTarget::SafePlace(place.clone())));
        let route = surface.route.as_ref().expect("route rendered");
        assert_eq!(route.target_name, "City Hospital");
        assert_eq!(route.polyline.last(), Some(&place.location));
        assert!(surface.alarm_playing);
    }

    let coordinator = harness.stop().await;
    assert_eq!(coordinator.phase(), Phase::RouteActive);
}

#[tokio::test(start_paused = true)]
async fn scenario_b_engine_routes_to_exit_point() {
    let clinic = SafePlace::new("n1", "Clinic", north(1500.0), PlaceKind::Hospital);
    let harness = Harness::start(
        CENTER,
        ScriptedSignal::new(vec![Some(true)]),
        FixedPlaces(Some(vec![clinic])),
        DelayedRouter::new([]),
    );

    advance(500).await;
    {
        let surface = harness.surface.get();
        let target = surface.target.as_ref().expect("target shown");
        assert!(target.is_exit_point());
        assert!(distance_meters(&target.location(), &CENTER) > RADIUS);
        assert!(surface.route.is_some());
    }

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn scenario_c_drag_outside_clears_route() {
    let harness = Harness::start(
        CENTER,
        ScriptedSignal::new(vec![Some(true)]),
        FixedPlaces(Some(Vec::new())),
        DelayedRouter::new([]),
    );

    advance(500).await;
    assert!(harness.surface.get().route.is_some());
    assert!(harness.surface.get().alarm_playing);

    assert_ok!(harness.handle.move_user(north(3000.0)).await);
    advance(100).await;
    {
        let surface = harness.surface.get();
        assert!(surface.route.is_none());
        assert!(surface.target.is_none());
        assert!(!surface.alarm_playing);
        assert_eq!(surface.status.as_deref(), Some(OUTSIDE_STATUS));
        assert!(surface.hazard.is_some());
        assert_eq!(surface.user, Some(north(3000.0)));
    }

    let coordinator = harness.stop().await;
    assert_eq!(coordinator.phase(), Phase::Cleared);
}

#[tokio::test(start_paused = true)]
async fn scenario_d_late_first_response_is_discarded() {
    let moved = north(400.0);
    let harness = Harness::start(
        CENTER,
        ScriptedSignal::new(vec![Some(true)]),
        FixedPlaces(Some(Vec::new())),
        DelayedRouter::new([Duration::from_secs(5), Duration::from_secs(1)]),
    );

    // R1 issued on activation, R2 after the drag
    advance(100).await;
    assert_ok!(harness.handle.move_user(moved).await);

    advance(2_000).await;
    {
        let surface = harness.surface.get();
        let route = surface.route.as_ref().expect("R2 applied");
        assert_eq!(route.polyline.first(), Some(&moved));
    }

    // R1 lands at t=5s and must not replace R2
    advance(4_000).await;
    {
        let surface = harness.surface.get();
        let route = surface.route.as_ref().expect("route still shown");
        assert_eq!(route.polyline.first(), Some(&moved));

        let shown = surface
            .log
            .iter()
            .filter(|c| matches!(c, RenderCommand::ShowRoute(_)))
            .count();
        assert_eq!(shown, 1);
    }

    let coordinator = harness.stop().await;
    assert_eq!(coordinator.generation(), 2);
    assert_eq!(coordinator.phase(), Phase::RouteActive);
}

#[tokio::test(start_paused = true)]
async fn scenario_e_failed_polls_keep_last_state() {
    let harness = Harness::start(
        CENTER,
        ScriptedSignal::new(vec![Some(true), None, None, None]),
        FixedPlaces(Some(Vec::new())),
        DelayedRouter::new([]),
    );

    // Polls at 0 s, 3 s, 6 s and 9 s; the last three fail
    advance(9_500).await;
    {
        let surface = harness.surface.get();
        assert!(surface.hazard.is_some());
        assert!(surface.alarm_playing);
        assert!(!surface.log.contains(&RenderCommand::HideHazard));
    }

    let coordinator = harness.stop().await;
    assert!(coordinator.tracker().is_active());
    assert_eq!(coordinator.phase(), Phase::RouteActive);
}

#[tokio::test(start_paused = true)]
async fn hazard_clear_tears_down_everything() {
    let harness = Harness::start(
        CENTER,
        ScriptedSignal::new(vec![Some(true), Some(false)]),
        FixedPlaces(Some(Vec::new())),
        DelayedRouter::new([]),
    );

    advance(3_500).await;
    {
        let surface = harness.surface.get();
        assert!(surface.hazard.is_none());
        assert!(surface.route.is_none());
        assert!(surface.target.is_none());
        assert!(surface.status.is_none());
        assert!(!surface.alarm_playing);
    }

    let coordinator = harness.stop().await;
    assert_eq!(coordinator.phase(), Phase::Cleared);
}

#[tokio::test(start_paused = true)]
async fn slow_route_times_out() {
    let harness = Harness::start(
        CENTER,
        ScriptedSignal::new(vec![Some(true)]),
        FixedPlaces(Some(Vec::new())),
        DelayedRouter::new([Duration::from_secs(60)]),
    );

    advance(21_000).await;
    {
        let surface = harness.surface.get();
        assert!(surface.route.is_none());
        assert_eq!(surface.status.as_deref(), Some("Route to Safe Exit timed out"));
        assert!(surface.alarm_playing);
    }

    let coordinator = harness.stop().await;
    assert_eq!(coordinator.phase(), Phase::RouteFailed);
}

#[tokio::test(start_paused = true)]
async fn failed_places_lookup_falls_back_to_exit() {
    let harness = Harness::start(
        CENTER,
        ScriptedSignal::new(vec![Some(true)]),
        FixedPlaces(None),
        DelayedRouter::new([]),
    );

    advance(500).await;
    let target = harness.surface.get().target.clone().expect("target shown");
    assert!(target.is_exit_point());

    let coordinator = harness.stop().await;
    assert!(coordinator.places().is_empty());
}

#[tokio::test(start_paused = true)]
async fn user_outside_never_requests_route() {
    let harness = Harness::start(
        north(4000.0),
        ScriptedSignal::new(vec![Some(true)]),
        FixedPlaces(Some(Vec::new())),
        DelayedRouter::new([]),
    );

    advance(500).await;
    {
        let surface = harness.surface.get();
        assert!(surface.hazard.is_some());
        assert!(surface.target.is_none());
        assert!(!surface.alarm_playing);
        assert_eq!(surface.status.as_deref(), Some(OUTSIDE_STATUS));
    }

    let coordinator = harness.stop().await;
    assert_eq!(coordinator.generation(), 0);
    assert_eq!(coordinator.phase(), Phase::Idle);
}
