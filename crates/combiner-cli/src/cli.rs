//! Command line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gt2-combiner")]
#[command(about = "Gran Turismo 2 combined disc builder", version)]
pub struct Cli {
    /// Configuration file with tool and resource paths
    #[arg(
        short,
        long,
        global = true,
        env = "GT2_COMBINER_CONFIG",
        default_value = "combiner.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Unpack both discs and the Simulation disc archives into a work directory
    Unpack {
        /// Path to the Arcade Mode disc (.bin)
        #[arg(short, long)]
        arcade: PathBuf,

        /// Path to the Simulation Mode disc (.bin)
        #[arg(short, long)]
        simulation: PathBuf,

        /// Work directory
        #[arg(short, long, default_value = "work")]
        work: PathBuf,
    },

    /// Patch an unpacked work directory in place
    Patch(PatchArgs),

    /// Repack archives and build the disc image
    Pack {
        /// Work directory
        #[arg(short, long, default_value = "work")]
        work: PathBuf,

        /// Disc descriptor passed to the disc builder
        /// (default: the Simulation disc's descriptor)
        #[arg(short, long)]
        descriptor: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct PatchArgs {
    /// Work directory
    #[arg(short, long, default_value = "work")]
    pub work: PathBuf,

    /// Leave movies out (skips the boot and race overlay patches)
    #[arg(short = 'f', long)]
    pub no_fmvs: bool,

    /// Turn optional step failures into warnings
    #[arg(short = 'e', long)]
    pub ignore_errors: bool,

    /// Write a JSON report of every step to this file
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}
