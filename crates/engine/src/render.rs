//! Render surface capability
//!
//! The coordinator is the only writer of the surface. Implementations decide
//! how commands are shown: a web map, a native map view or a console.

use crate::hazard::HazardZone;
use crate::place::EvacuationTarget;
use crate::route::Route;
use safepath_geo::Coordinate;
use serde::Serialize;

/// Draw, clear and alarm commands consumed by a renderer
pub trait RenderSurface: Send {
    /// Draw the hazard boundary circle
    fn show_hazard(&mut self, zone: &HazardZone);
    /// Remove the hazard boundary circle
    fn hide_hazard(&mut self);
    /// Move the draggable user marker
    fn show_user(&mut self, position: Coordinate);
    /// Draw the route polyline
    fn show_route(&mut self, route: &Route);
    fn clear_route(&mut self);
    /// Draw the evacuation target marker
    fn show_target(&mut self, target: &EvacuationTarget);
    fn clear_target(&mut self);
    /// Set the status line; `None` hides it
    fn set_status(&mut self, status: Option<&str>);
    /// Start (or keep) the audible alarm
    fn play_alarm(&mut self);
    /// Pause the alarm and rewind it to the start
    fn pause_alarm(&mut self);
}

/// A single command, as recorded by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", content = "data", rename_all = "snake_case")]
pub enum RenderCommand {
    ShowHazard(HazardZone),
    HideHazard,
    ShowUser(Coordinate),
    ShowRoute(Route),
    ClearRoute,
    ShowTarget(EvacuationTarget),
    ClearTarget,
    SetStatus(Option<String>),
    PlayAlarm,
    PauseAlarm,
}

/// In-memory surface that keeps what is currently visible plus a command log
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub hazard: Option<HazardZone>,
    pub user: Option<Coordinate>,
    pub route: Option<Route>,
    pub target: Option<EvacuationTarget>,
    pub status: Option<String>,
    pub alarm_playing: bool,
    pub log: Vec<RenderCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget recorded commands, keeping the visible state
    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn show_hazard(&mut self, zone: &HazardZone) {
        self.hazard = Some(*zone);
        self.log.push(RenderCommand::ShowHazard(*zone));
    }

    fn hide_hazard(&mut self) {
        self.hazard = None;
        self.log.push(RenderCommand::HideHazard);
    }

    fn show_user(&mut self, position: Coordinate) {
        self.user = Some(position);
        self.log.push(RenderCommand::ShowUser(position));
    }

    fn show_route(&mut self, route: &Route) {
        self.route = Some(route.clone());
        self.log.push(RenderCommand::ShowRoute(route.clone()));
    }

    fn clear_route(&mut self) {
        self.route = None;
        self.log.push(RenderCommand::ClearRoute);
    }

    fn show_target(&mut self, target: &EvacuationTarget) {
        self.target = Some(target.clone());
        self.log.push(RenderCommand::ShowTarget(target.clone()));
    }

    fn clear_target(&mut self) {
        self.target = None;
        self.log.push(RenderCommand::ClearTarget);
    }

    fn set_status(&mut self, status: Option<&str>) {
        self.status = status.map(str::to_string);
        self.log.push(RenderCommand::SetStatus(self.status.clone()));
    }

    fn play_alarm(&mut self) {
        self.alarm_playing = true;
        self.log.push(RenderCommand::PlayAlarm);
    }

    fn pause_alarm(&mut self) {
        self.alarm_playing = false;
        self.log.push(RenderCommand::PauseAlarm);
    }
}
