//! Folder Mirror CLI
//!
//! Periodically makes a replica directory an exact copy of a source
//! directory, logging every change.

mod cli;
mod error;
mod journal;

use std::io::IsTerminal;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use mirror_core::{MirrorConfig, PartialConfig, Reconciler, Scheduler, StopReason};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::{CliError, Result};
use journal::EventLog;

fn main() {
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    // clap exits with 2 on usage errors; this tool reports 1
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        if e.wants_usage() {
            eprintln!();
            eprintln!("{}", Cli::command().render_usage());
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose);

    let config = resolve_config(&cli)?;
    debug!(
        "Mirroring {} -> {} every {:?}, log {}",
        config.source.display(),
        config.replica.display(),
        config.interval,
        config.log.display()
    );

    if cli.dry_run {
        dry_run(&config)
    } else {
        watch(&config, cli.once)
    }
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Ignore a second initialisation; diagnostics are best effort
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}

/// Merge flags and environment over the optional config file, then check
/// the paths.
fn resolve_config(cli: &Cli) -> Result<MirrorConfig> {
    let mut settings = cli.to_partial();
    if let Some(path) = &cli.config {
        settings = settings.or(PartialConfig::load(path)?);
    }
    Ok(MirrorConfig::resolve(settings)?.validate_paths()?)
}

fn dry_run(config: &MirrorConfig) -> Result<()> {
    let plan = Reconciler::new(&config.source, &config.replica).preview()?;
    let lines = plan.describe();

    if lines.is_empty() {
        println!("{} Replica is up to date", "[dry-run]".yellow());
    }
    for line in lines {
        println!("{} {}", "[dry-run]".yellow(), line);
    }
    Ok(())
}

fn watch(config: &MirrorConfig, once: bool) -> Result<()> {
    let (scheduler, shutdown) = Scheduler::new(config.interval);
    let scheduler = if once {
        scheduler.with_max_cycles(1)
    } else {
        scheduler
    };

    ctrlc::set_handler(move || shutdown.request())?;

    let reconciler = Reconciler::new(&config.source, &config.replica);
    let mut log = EventLog::new(&config.log, reconciler.replica_root());

    let summary = scheduler.run(|_| {
        status(
            "Beginning sync operation. Avoid interrupting the script, until further notice, \
             to prevent data loss or corruption.",
        );
        let result = reconciler.run_cycle(&mut log);
        status("You may now interrupt the script, safely.");
        result
    });

    info!(
        "Stopped after {} cycle(s), {} failed",
        summary.cycles, summary.failed
    );

    match summary.stopped_by {
        StopReason::Interrupted => {
            println!();
            status("Script interrupted. Exiting.");
            Ok(())
        }
        StopReason::CycleLimit if summary.failed > 0 => {
            Err(CliError::user("sync cycle failed; see the messages above"))
        }
        StopReason::CycleLimit => Ok(()),
    }
}

fn status(message: &str) {
    println!("{} {}", "STATUS:".cyan().bold(), message);
}
