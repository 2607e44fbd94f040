//! `lb`: a reverse proxy / load balancer binary.

use clap::Parser;
use lb::config::{load_settings_from, validate};
use lb::logs::configure_logger;
use lb::Runtime;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// A reverse proxy / load balancer with pluggable backend-selection policies.
#[derive(Parser, Debug)]
#[command(name = "lb", version, about)]
struct Cli {
    /// Path to the YAML config file.
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
}

fn main() -> ExitCode {
    configure_logger(log::LevelFilter::Info);
    let cli = Cli::parse();

    let settings = match load_settings_from(&cli.config) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let validation = validate(&settings);
    for warning in &validation.warnings {
        log::warn!("{warning}");
    }
    if !validation.is_valid {
        for err in &validation.errors {
            error!("{err}");
        }
        return ExitCode::FAILURE;
    }

    info!(
        "starting lb on port {} with {} algorithm",
        settings.acceptor.port, settings.load_balancing.algorithm
    );

    let runtime = match Runtime::build(settings) {
        Ok(r) => r,
        Err(e) => {
            error!("failed to build runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.run() {
        Ok(()) => {
            info!("lb stopped gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("lb exited with error: {e}");
            ExitCode::FAILURE
        }
    }
}
