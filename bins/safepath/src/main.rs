//! SafePath - danger-zone evacuation CLI
//!
//! Polls a hazard broadcast, and while it is active and you are inside the
//! zone, picks the nearest safe place outside it and shows a walking route.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use safepath_api_client::ApiError;
use safepath_core::config::Config;
use safepath_core::error::exit_codes;
use safepath_telemetry::TelemetryConfig;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod console;

use commands::{run, select, status, trigger};

/// Danger-zone evacuation assistant
#[derive(Parser)]
#[command(name = "safepath")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Configuration file (default: safepath.toml, .safepath.toml or the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the hazard signal and guide you out of the danger zone.
    ///
    /// Type `<lat>,<lon>` on stdin to move your position, `q` to quit.
    Run {
        /// Your latitude
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Your longitude
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Hazard radius in meters (overrides the config)
        #[arg(short, long)]
        radius: Option<f64>,

        /// Hazard center latitude (default: config, else your position)
        #[arg(long, allow_negative_numbers = true, requires = "center_lon")]
        center_lat: Option<f64>,

        /// Hazard center longitude
        #[arg(long, allow_negative_numbers = true, requires = "center_lat")]
        center_lon: Option<f64>,

        /// Stop after this many seconds
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Pick an evacuation target offline, without contacting any service
    Select {
        /// Your latitude
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Your longitude
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Hazard center latitude (default: config, else your position)
        #[arg(long, allow_negative_numbers = true, requires = "center_lon")]
        center_lat: Option<f64>,

        /// Hazard center longitude
        #[arg(long, allow_negative_numbers = true, requires = "center_lat")]
        center_lon: Option<f64>,

        /// Hazard radius in meters (default: config)
        #[arg(short, long)]
        radius: Option<f64>,

        /// JSON file with candidate safe places
        #[arg(short, long)]
        places: Option<PathBuf>,
    },

    /// Declare the hazard active on the broadcast service
    Trigger,

    /// Show the current hazard broadcast flag
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose > 0 {
        if let Err(e) = safepath_telemetry::init_with_config(TelemetryConfig::with_verbosity(cli.verbose)) {
            eprintln!("{} {}", "Warning:".yellow().bold(), e);
        }
    }

    let result = match Config::load(cli.config.as_deref()) {
        Ok(config) => dispatch(cli.command, &config, cli.format).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, cli.format);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn report_error(error: &anyhow::Error, format: OutputFormat) {
    eprintln!("{} {:#}", "Error:".red().bold(), error);

    if let Some(api) = error.downcast_ref::<ApiError>() {
        if let Some(hint) = service_hint(api) {
            eprintln!("{} {}", "Hint:".yellow().bold(), hint);
        }
    }

    if format == OutputFormat::Json {
        if let Some(core) = error.downcast_ref::<safepath_core::Error>() {
            if let Ok(report) = serde_json::to_string(&core.to_report()) {
                eprintln!("{report}");
            }
        }
    }
}

fn service_hint(error: &ApiError) -> Option<&'static str> {
    if error.is_retryable() {
        Some("the service did not answer; try again shortly")
    } else if error.is_client_error() {
        Some("the service rejected the request; check the SAFEPATH_* URLs or the [services] config")
    } else {
        None
    }
}

async fn dispatch(command: Commands, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            lat,
            lon,
            radius,
            center_lat,
            center_lon,
            duration,
        } => {
            let args = run::RunArgs {
                lat,
                lon,
                radius,
                center: center_lat.zip(center_lon),
                duration: duration.map(std::time::Duration::from_secs),
            };
            run::run(config, args, format).await
        }

        Commands::Select {
            lat,
            lon,
            center_lat,
            center_lon,
            radius,
            places,
        } => {
            let args = select::SelectArgs {
                lat,
                lon,
                center: center_lat.zip(center_lon),
                radius,
                places,
            };
            select::run(config, &args, format)
        }

        Commands::Trigger => trigger::run(config, format).await,

        Commands::Status => status::run(config, format).await,
    }
}

fn exit_code_for(error: &anyhow::Error) -> u8 {
    let code = if error.downcast_ref::<safepath_core::Error>().is_some() {
        exit_codes::CONFIG_ERROR
    } else if error.downcast_ref::<ApiError>().is_some() {
        exit_codes::SERVICE_ERROR
    } else {
        exit_codes::FAILURE
    };
    u8::try_from(code).unwrap_or(1)
}
