//! Async runtime driving the coordinator
//!
//! One task owns the [`RouteCoordinator`] and consumes [`EngineEvent`]s.
//! Producers are the hazard poller, the one-shot places fetch, spawned route
//! tasks and any number of [`EngineHandle`]s. The loop stops on
//! [`EngineEvent::Shutdown`] or once every handle is dropped.

use crate::coordinator::{Phase, RouteCoordinator};
use crate::error::{EngineError, EngineResult};
use crate::hazard::{HazardDeclaration, HazardZoneTracker};
use crate::place::SafePlace;
use crate::ports::{HazardSignalSource, PlacesSource, RouteService};
use crate::render::RenderSurface;
use crate::route::{RouteFailure, RouteOutcome, RouteRequest};
use crate::selector::SelectionPolicy;
use safepath_core::config::ConfigSchema;
use safepath_geo::{sort_by_distance, Coordinate};
use safepath_telemetry::{metrics, names, Timer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const CHANNEL_CAPACITY: usize = 64;

/// Timing and selection settings for a running engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub poll_interval: Duration,
    pub route_timeout: Duration,
    pub places_radius_meters: f64,
    pub places_limit: usize,
    pub policy: SelectionPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&ConfigSchema::default())
    }
}

impl EngineSettings {
    pub fn from_config(schema: &ConfigSchema) -> Self {
        Self {
            poll_interval: schema.hazard.poll_interval(),
            route_timeout: schema.engine.route_timeout(),
            places_radius_meters: schema.places.search_radius_meters,
            places_limit: schema.places.limit,
            policy: SelectionPolicy::from(&schema.engine),
        }
    }
}

/// Input to the engine loop
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Polled hazard flag
    HazardSignal(bool),
    /// User marker moved
    PositionChanged(Coordinate),
    /// Result of the one-shot places lookup
    PlacesLoaded(Vec<SafePlace>),
    /// A route task finished
    RouteCompleted { generation: u64, outcome: RouteOutcome },
    /// Stop the loop
    Shutdown,
}

/// Cloneable sender for driving a running engine
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineEvent>,
}

impl EngineHandle {
    /// Send a raw event
    pub async fn send(&self, event: EngineEvent) -> EngineResult<()> {
        self.tx.send(event).await.map_err(|_| EngineError::Stopped)
    }

    /// Move the user marker
    pub async fn move_user(&self, position: Coordinate) -> EngineResult<()> {
        if !position.is_valid() {
            return Err(EngineError::InvalidPosition(position));
        }
        self.send(EngineEvent::PositionChanged(position)).await
    }

    /// Ask the loop to stop. Succeeds if it has already stopped.
    pub async fn shutdown(&self) -> EngineResult<()> {
        match self.send(EngineEvent::Shutdown).await {
            Err(EngineError::Stopped) | Ok(()) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Whether the engine loop has exited
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Collaborators plus the coordinator, owned by the loop
struct Core<S, H, P, R>
where
    S: RenderSurface,
{
    coordinator: RouteCoordinator<S>,
    signal: Arc<H>,
    places: Arc<P>,
    router: Arc<R>,
    settings: EngineSettings,
    initial_position: Coordinate,
    internal_tx: mpsc::Sender<EngineEvent>,
}

/// A configured, not yet running engine
pub struct Engine<S, H, P, R>
where
    S: RenderSurface,
{
    core: Core<S, H, P, R>,
    commands: mpsc::Receiver<EngineEvent>,
    internal: mpsc::Receiver<EngineEvent>,
}

impl<S, H, P, R> Engine<S, H, P, R>
where
    S: RenderSurface,
    H: HazardSignalSource,
    P: PlacesSource,
    R: RouteService,
{
    /// Build an engine and the handle that controls it
    pub fn new(
        declaration: HazardDeclaration,
        initial_position: Coordinate,
        settings: EngineSettings,
        surface: S,
        signal: H,
        places: P,
        router: R,
    ) -> EngineResult<(Self, EngineHandle)> {
        if !initial_position.is_valid() {
            return Err(EngineError::InvalidPosition(initial_position));
        }

        let (tx, commands) = mpsc::channel(CHANNEL_CAPACITY);
        let (internal_tx, internal) = mpsc::channel(CHANNEL_CAPACITY);

        let coordinator = RouteCoordinator::new(
            HazardZoneTracker::new(declaration),
            settings.policy,
            surface,
        );

        let engine = Self {
            core: Core {
                coordinator,
                signal: Arc::new(signal),
                places: Arc::new(places),
                router: Arc::new(router),
                settings,
                initial_position,
                internal_tx,
            },
            commands,
            internal,
        };

        Ok((engine, EngineHandle { tx }))
    }

    /// Run until shutdown and hand back the coordinator in its final state
    pub async fn run(self) -> RouteCoordinator<S> {
        let Self {
            mut core,
            mut commands,
            mut internal,
        } = self;
        let mut tasks = JoinSet::new();

        info!(
            origin = %core.initial_position,
            center = %core.coordinator.tracker().declaration().center,
            radius_m = core.coordinator.tracker().declaration().radius_meters,
            "Engine started"
        );

        core.dispatch(EngineEvent::PositionChanged(core.initial_position), &mut tasks);
        core.spawn_poller(&mut tasks);
        core.spawn_places_fetch(&mut tasks);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(EngineEvent::Shutdown) | None => break,
                    Some(event) => core.dispatch(event, &mut tasks),
                },
                Some(event) = internal.recv() => core.dispatch(event, &mut tasks),
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            warn!(error = %e, "Engine task panicked");
                        }
                    }
                }
            }
        }

        tasks.shutdown().await;
        info!(phase = ?core.coordinator.phase(), "Engine stopped");
        core.coordinator
    }
}

impl<S, H, P, R> Core<S, H, P, R>
where
    S: RenderSurface,
    H: HazardSignalSource,
    P: PlacesSource,
    R: RouteService,
{
    fn dispatch(&mut self, event: EngineEvent, tasks: &mut JoinSet<()>) {
        let request = match event {
            EngineEvent::HazardSignal(active) => {
                let was_active = self.coordinator.tracker().is_active();
                let request = self.coordinator.on_hazard_signal(active);
                if was_active != self.coordinator.tracker().is_active() {
                    metrics().increment(names::HAZARD_TRANSITIONS);
                }
                request
            }
            EngineEvent::PositionChanged(position) => self.coordinator.on_position(position),
            EngineEvent::PlacesLoaded(places) => self.coordinator.set_places(places),
            EngineEvent::RouteCompleted { generation, outcome } => {
                if self.coordinator.on_route_result(generation, outcome) {
                    if self.coordinator.phase() == Phase::RouteActive {
                        metrics().increment(names::ROUTE_RESOLVED);
                    } else {
                        metrics().increment(names::ROUTE_FAILED);
                    }
                } else {
                    metrics().increment(names::ROUTE_STALE);
                }
                None
            }
            EngineEvent::Shutdown => None,
        };

        if let Some(request) = request {
            self.spawn_route(request, tasks);
        }
    }

    fn spawn_poller(&self, tasks: &mut JoinSet<()>) {
        let signal = Arc::clone(&self.signal);
        let tx = self.internal_tx.clone();
        let period = self.settings.poll_interval;

        tasks.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                metrics().increment(names::HAZARD_POLLS);

                match signal.poll().await {
                    Ok(active) => {
                        debug!(active, "Hazard signal polled");
                        if tx.send(EngineEvent::HazardSignal(active)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        metrics().increment(names::HAZARD_POLL_FAILURES);
                        debug!(error = %e, "Hazard poll failed, keeping previous state");
                    }
                }
            }
        });
    }

    fn spawn_places_fetch(&self, tasks: &mut JoinSet<()>) {
        let source = Arc::clone(&self.places);
        let tx = self.internal_tx.clone();
        let origin = self.initial_position;
        let radius = self.settings.places_radius_meters;
        let limit = self.settings.places_limit;

        tasks.spawn(async move {
            let places = match source.nearby(origin, radius).await {
                Ok(found) => {
                    let mut nearest = sort_by_distance(&origin, found, |place| place.location);
                    nearest.truncate(limit);
                    metrics().increment_by(names::PLACES_LOADED, nearest.len() as u64);
                    nearest
                }
                Err(e) => {
                    metrics().increment(names::PLACES_FAILURES);
                    warn!(error = %e, "Places lookup failed, exit points only");
                    Vec::new()
                }
            };

            if tx.send(EngineEvent::PlacesLoaded(places)).await.is_err() {
                debug!("Engine stopped before places arrived");
            }
        });
    }

    fn spawn_route(&self, request: RouteRequest, tasks: &mut JoinSet<()>) {
        let router = Arc::clone(&self.router);
        let tx = self.internal_tx.clone();
        let limit = self.settings.route_timeout;

        metrics().increment(names::ROUTE_REQUESTS);
        metrics().gauge(names::ROUTE_GENERATION, request.generation);

        tasks.spawn(async move {
            let RouteRequest {
                generation,
                origin,
                target,
            } = request;

            let timer = Timer::start(names::ROUTE_LATENCY_MS);
            let outcome = match tokio::time::timeout(
                limit,
                router.walking_route(origin, target.location()),
            )
            .await
            {
                Ok(Ok(Some(leg))) => Ok(leg),
                Ok(Ok(None)) => Err(RouteFailure::NoRoute),
                Ok(Err(e)) => Err(RouteFailure::Service(e.to_string())),
                Err(_) => Err(RouteFailure::Timeout),
            };
            timer.stop();

            let event = EngineEvent::RouteCompleted { generation, outcome };
            if tx.send(event).await.is_err() {
                debug!(generation, "Engine stopped before route completed");
            }
        });
    }
}
