//! Live evacuation guidance

use crate::console::ConsoleSurface;
use crate::OutputFormat;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use safepath_core::config::Config;
use safepath_engine::{
    Coordinate, Engine, EngineHandle, EngineSettings, HazardDeclaration, Phase, RouteCoordinator,
};
use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct RunArgs {
    pub lat: f64,
    pub lon: f64,
    pub radius: Option<f64>,
    pub center: Option<(f64, f64)>,
    pub duration: Option<Duration>,
}

pub async fn run(config: &Config, args: RunArgs, format: OutputFormat) -> Result<()> {
    let mut schema = config.schema.clone();
    schema.hazard.radius_meters = super::radius(args.radius, config)?;

    let initial = super::coordinate(args.lat, args.lon)?;
    let center = match args.center {
        Some((lat, lon)) => super::coordinate(lat, lon)?,
        None => schema.hazard.center_or(initial),
    };
    let declaration = HazardDeclaration::new(center, schema.hazard.radius_meters)?;

    let client = super::client(config)?;
    let (engine, handle) = Engine::new(
        declaration,
        initial,
        EngineSettings::from_config(&schema),
        ConsoleSurface::new(format),
        client.hazard(),
        client.places(),
        client.routing(),
    )?;

    if format == OutputFormat::Text {
        println!();
        println!("  {}", "SafePath".blue().bold());
        println!(
            "  hazard {} at {}, polling {}",
            safepath_engine::format_distance(declaration.radius_meters),
            declaration.center,
            client.config().hazard_url.dimmed()
        );
        println!("  {}", "type <lat>,<lon> to move, q to quit".dimmed());
        println!();
    }

    let running = tokio::spawn(engine.run());
    drive(&handle, args.duration).await?;
    handle.shutdown().await?;
    let coordinator = running.await.context("engine task failed")?;

    print_summary(&coordinator, format);
    Ok(())
}

/// Forward stdin positions to the engine until quit, Ctrl-C or the deadline
async fn drive(handle: &EngineHandle, duration: Option<Duration>) -> Result<()> {
    let deadline = async {
        match duration {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            () = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "q" | "quit" | "exit") {
                    break;
                }
                match parse_position(line) {
                    Some(position) => {
                        if let Err(e) = handle.move_user(position).await {
                            eprintln!("{} {}", "Warning:".yellow().bold(), e);
                        }
                    }
                    None => eprintln!(
                        "{} expected `<lat>,<lon>`, got {line:?}",
                        "Warning:".yellow().bold()
                    ),
                }
            }
        }
    }

    Ok(())
}

/// Parse `lat,lon` or `lat lon`
fn parse_position(line: &str) -> Option<Coordinate> {
    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty());

    let lat = parts.next()?.parse().ok()?;
    let lon = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Coordinate::new(lat, lon))
}

fn print_summary(coordinator: &RouteCoordinator<ConsoleSurface>, format: OutputFormat) {
    let target = coordinator.target();

    if format == OutputFormat::Json {
        let summary = json!({
            "phase": format!("{:?}", coordinator.phase()),
            "position": coordinator.position(),
            "hazard_active": coordinator.tracker().is_active(),
            "target": target,
            "route": coordinator.route(),
            "navigation_url": target.map(|t| t.navigation_url()),
            "metrics": safepath_telemetry::metrics().export_json(),
        });
        println!("{summary}");
        return;
    }

    println!();
    let phase = match coordinator.phase() {
        Phase::Idle => "no evacuation needed".to_string(),
        Phase::RouteRequested => "route still pending".yellow().to_string(),
        Phase::RouteActive => "route active".green().to_string(),
        Phase::RouteFailed => "no route available".red().to_string(),
        Phase::Cleared => "cleared".green().to_string(),
    };
    println!("  {} {}", "Final state:".bold(), phase);

    if let Some(route) = coordinator.route() {
        println!("  {} {} ({})", "Route:".bold(), route.target_name, route.summary());
    }
    if let Some(target) = target {
        println!("  {} {}", "Navigate:".bold(), target.navigation_url());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("12.97,77.59"), Some(Coordinate::new(12.97, 77.59)));
        assert_eq!(parse_position("12.97 77.59"), Some(Coordinate::new(12.97, 77.59)));
        assert_eq!(parse_position("12.97, -77.59"), Some(Coordinate::new(12.97, -77.59)));
    }

    #[test]
    fn test_parse_position_rejects_garbage() {
        assert_eq!(parse_position("12.97"), None);
        assert_eq!(parse_position("north,east"), None);
        assert_eq!(parse_position("1,2,3"), None);
    }
}
