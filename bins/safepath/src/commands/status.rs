//! Hazard broadcast status

use crate::OutputFormat;
use anyhow::Result;
use owo_colors::OwoColorize;
use safepath_core::config::Config;

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let client = super::client(config)?;
    let status = client.hazard().status().await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(&status)?);
        return Ok(());
    }

    if status.danger_zone {
        println!("{} {}", "●".red(), "danger zone ACTIVE".red().bold());
    } else {
        println!("{} {}", "○".green(), "no active hazard".green());
    }
    Ok(())
}
