//! Treesync CLI Binary
//!
//! Mirrors a source folder into a replica folder on a fixed interval until interrupted.

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use std::process;
use treesync::cli::{format_summary_text, map_error, Cli, RunContext};
use treesync::daemon::StopHandle;
use treesync::logging::init_logging;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let stop = StopHandle::new();
    let context = match RunContext::new(&cli) {
        Ok(ctx) => ctx.with_stop_handle(stop.clone()),
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(Some(context.logging())) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    for signal in [SIGINT, SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, stop.flag()) {
            error!(signal, error = %e, "Failed to register signal handler");
        }
    }

    println!("Starting folder synchronization.");
    match context.execute(std::io::stdout()) {
        Ok(summary) => {
            info!(
                cycles = summary.cycles,
                operations = summary.operations,
                failed_cycles = summary.failed_cycles,
                "Synchronization finished"
            );
            if summary.stopped {
                println!("Stopping execution...");
            } else if cli.verbose {
                println!("{}", format_summary_text(&summary));
            }
        }
        Err(e) => {
            error!("Synchronization failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}
