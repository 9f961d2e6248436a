//! Terminal render surface

use crate::OutputFormat;
use chrono::Local;
use owo_colors::OwoColorize;
use safepath_engine::{
    format_distance, Coordinate, EvacuationTarget, HazardZone, RenderCommand, RenderSurface, Route,
};

/// Prints render commands as coloured lines, or as JSON lines with `--format json`
pub struct ConsoleSurface {
    format: OutputFormat,
    alarm_playing: bool,
    status: Option<String>,
}

impl ConsoleSurface {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            alarm_playing: false,
            status: None,
        }
    }

    fn emit(&self, command: RenderCommand, text: impl FnOnce() -> String) {
        match self.format {
            OutputFormat::Json => match serde_json::to_string(&command) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "Could not encode render command"),
            },
            OutputFormat::Text => {
                let time = Local::now().format("%H:%M:%S");
                println!("{} {}", time.dimmed(), text());
            }
        }
    }
}

impl RenderSurface for ConsoleSurface {
    fn show_hazard(&mut self, zone: &HazardZone) {
        self.emit(RenderCommand::ShowHazard(*zone), || {
            format!(
                "{} danger zone: {} around {}",
                "⚠".red().bold(),
                format_distance(zone.radius_meters),
                zone.center
            )
        });
    }

    fn hide_hazard(&mut self) {
        self.emit(RenderCommand::HideHazard, || {
            format!("{} danger zone cleared", "✓".green().bold())
        });
    }

    fn show_user(&mut self, position: Coordinate) {
        self.emit(RenderCommand::ShowUser(position), || {
            format!("{} you are at {}", "•".cyan(), position)
        });
    }

    fn show_route(&mut self, route: &Route) {
        self.emit(RenderCommand::ShowRoute(route.clone()), || {
            format!(
                "{} route to {}: {} points",
                "➜".green().bold(),
                route.target_name.bold(),
                route.polyline.len()
            )
        });
    }

    fn clear_route(&mut self) {
        // Cleared on every new request; only worth a line in JSON mode
        if self.format == OutputFormat::Json {
            self.emit(RenderCommand::ClearRoute, String::new);
        }
    }

    fn show_target(&mut self, target: &EvacuationTarget) {
        self.emit(RenderCommand::ShowTarget(target.clone()), || {
            let label = if target.is_exit_point() {
                "exit point"
            } else {
                "safe place"
            };
            format!(
                "{} heading to {} ({label}) at {}\n         {}",
                "◎".yellow(),
                target.name().bold(),
                target.location(),
                target.navigation_url().underline()
            )
        });
    }

    fn clear_target(&mut self) {
        if self.format == OutputFormat::Json {
            self.emit(RenderCommand::ClearTarget, String::new);
        }
    }

    fn set_status(&mut self, status: Option<&str>) {
        if self.status.as_deref() == status {
            return;
        }
        self.status = status.map(str::to_string);
        if let Some(text) = status {
            self.emit(RenderCommand::SetStatus(Some(text.to_string())), || {
                format!("{} {}", "»".blue(), text)
            });
        } else if self.format == OutputFormat::Json {
            self.emit(RenderCommand::SetStatus(None), String::new);
        }
    }

    fn play_alarm(&mut self) {
        if !self.alarm_playing {
            self.alarm_playing = true;
            self.emit(RenderCommand::PlayAlarm, || {
                format!("🔔 {}", "ALARM: you are inside the danger zone".red().bold())
            });
        }
    }

    fn pause_alarm(&mut self) {
        if self.alarm_playing {
            self.alarm_playing = false;
            self.emit(RenderCommand::PauseAlarm, || "🔕 alarm stopped".to_string());
        }
    }
}
