//! Offline target selection

use crate::OutputFormat;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use safepath_core::config::Config;
use safepath_engine::{
    format_distance, select_target_with, HazardDeclaration, HazardZone, SafePlace, SelectionPolicy,
};
use safepath_geo::distance_meters;
use serde_json::json;
use std::path::{Path, PathBuf};

pub struct SelectArgs {
    pub lat: f64,
    pub lon: f64,
    pub center: Option<(f64, f64)>,
    pub radius: Option<f64>,
    pub places: Option<PathBuf>,
}

pub fn run(config: &Config, args: &SelectArgs, format: OutputFormat) -> Result<()> {
    let user = super::coordinate(args.lat, args.lon)?;
    let center = match args.center {
        Some((lat, lon)) => super::coordinate(lat, lon)?,
        None => config.schema.hazard.center_or(user),
    };
    let radius = super::radius(args.radius, config)?;
    let declaration = HazardDeclaration::new(center, radius)?;

    let zone = HazardZone {
        center: declaration.center,
        radius_meters: declaration.radius_meters,
        active: true,
    };
    let places = match &args.places {
        Some(path) => load_places(path)?,
        None => Vec::new(),
    };

    let policy = SelectionPolicy::from(&config.schema.engine);
    let target = select_target_with(&policy, &user, &zone, &places);
    let inside = zone.contains_point(&user);
    let from_user = distance_meters(&user, &target.location());
    let from_center = distance_meters(&center, &target.location());

    if format == OutputFormat::Json {
        let output = json!({
            "inside": inside,
            "candidates": places.len(),
            "target": target,
            "distance_from_user_m": from_user,
            "distance_from_center_m": from_center,
            "navigation_url": target.navigation_url(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let kind = if target.is_exit_point() {
        "computed exit point"
    } else {
        "safe place"
    };
    println!("{} {} ({kind})", "Target:".bold(), target.name().green().bold());
    println!("{} {}", "Location:".bold(), target.location());
    println!(
        "{} {} from you, {} from the hazard center",
        "Distance:".bold(),
        format_distance(from_user),
        format_distance(from_center)
    );
    println!("{} {}", "Navigate:".bold(), target.navigation_url());
    if !inside {
        println!("{}", "You are outside the danger zone.".dimmed());
    }

    Ok(())
}

fn load_places(path: &Path) -> Result<Vec<SafePlace>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read places file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse places file {}", path.display()))
}
