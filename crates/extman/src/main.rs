//! extman CLI - manage third-party extensions for a command-line tool
//!
//! This is the main entry point for the extman command-line interface.

mod cli;
mod commands;
mod output;
mod utils;

use anyhow::Result;
use camino::Utf8Path;
use clap::Parser;
use extman_extensions::ClientLifecycle;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let code = {
        // Every runtime started by a command is shut down when this guard drops
        let lifecycle = ClientLifecycle::new();
        let _guard = lifecycle.guard();
        dispatch(cli.command, cli.config_dir.as_deref(), &lifecycle)?
    };

    // Only reached after teardown, so no extension outlives the exit
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Run one command, returning the process exit code
fn dispatch(
    command: Commands,
    config_dir: Option<&Utf8Path>,
    lifecycle: &ClientLifecycle,
) -> Result<i32> {
    match command {
        Commands::List(args) => commands::list::run(args, config_dir).map(|()| 0),
        Commands::Info(args) => commands::info::run(args, config_dir).map(|()| 0),
        Commands::Refresh(args) => commands::refresh::run(args, config_dir).map(|()| 0),
        Commands::Install(args) => commands::install::run(args, config_dir).map(|()| 0),
        Commands::Exec(args) => commands::exec::run(args, config_dir, lifecycle),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
