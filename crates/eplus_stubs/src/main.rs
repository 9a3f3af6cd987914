//! eplus_stubs launcher
//!
//! Builds `eppy-stubs` / `archetypal-stubs` packages for one EnergyPlus
//! version. Exits 0 on success, 1 on any failure.

use clap::Parser;
use eplus_stubs::layout::{DEFAULT_PACKAGES_ROOT, DEFAULT_SHARED_ROOT};
use eplus_stubs::OutputLayout;
use eplus_stubs_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "eplus_stubs")]
#[command(about = "Build eppy-stubs and archetypal-stubs packages from an EnergyPlus IDD")]
#[command(version)]
struct Cli {
    /// EnergyPlus version like 23.1
    #[arg(long)]
    eplus_version: String,

    /// Path to Energy+.idd; searched in the EnergyPlus install directories when omitted
    #[arg(long, env = "EPPY_IDD_FILE")]
    idd_file: Option<PathBuf>,

    /// Patch number appended to the package version
    #[arg(long, default_value_t = 0)]
    patch: u32,

    /// Subset of packages to build
    #[arg(long, num_args = 1.., default_values = ["eppy", "archetypal"])]
    packages: Vec<String>,

    /// Directory holding per-version shared objects and manifests
    #[arg(long, env = "EPLUS_STUBS_SHARED_ROOT", default_value = DEFAULT_SHARED_ROOT)]
    shared_root: PathBuf,

    /// Directory the packages are written into
    #[arg(long, env = "EPLUS_STUBS_PACKAGES_ROOT", default_value = DEFAULT_PACKAGES_ROOT)]
    packages_root: PathBuf,

    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print a JSON summary instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogConfig {
        app_name: "eplus_stubs",
        verbose: cli.verbose,
        log_file: cli.log_file.as_deref(),
    }) {
        eprintln!("Warning: failed to initialize logging: {:?}", err);
    }

    let json = cli.json;
    let args = cli::build::BuildArgs {
        eplus_version: cli.eplus_version,
        idd_file: cli.idd_file,
        patch: cli.patch,
        packages: cli.packages,
        layout: OutputLayout::new(cli.shared_root, cli.packages_root),
        json,
    };

    match cli::build::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
