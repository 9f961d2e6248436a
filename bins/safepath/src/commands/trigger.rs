//! Declare the hazard

use crate::OutputFormat;
use anyhow::Result;
use owo_colors::OwoColorize;
use safepath_core::config::Config;

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let client = super::client(config)?;
    let response = client.hazard().trigger().await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{} {}", "✓".green().bold(), response.alert);
    }
    Ok(())
}
