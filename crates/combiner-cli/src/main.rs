mod cli;
mod commands;
mod config;
mod discs;
mod replace;
mod tools;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::Config;

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {:#}", e);
    }
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gt2_combiner=info".parse()?)
                .add_directive("combiner_core=info".parse()?),
        )
        .init();
    Ok(())
}

fn run() -> Result<()> {
    let args = Cli::parse();

    let config = match Config::load(&args.config) {
        Ok(c) => {
            info!("Loaded config from {:?}", args.config);
            c
        }
        Err(e) => {
            warn!("Failed to load config: {:#}, using defaults", e);
            Config::default()
        }
    };

    match &args.command {
        Command::Unpack {
            arcade,
            simulation,
            work,
        } => commands::unpack::run(&config, arcade, simulation, work),
        Command::Patch(patch) => commands::patch::run(&config, patch),
        Command::Pack { work, descriptor } => {
            commands::pack::run(&config, work, descriptor.as_deref())
        }
    }
}
