use clap::Parser;
use dosnap::config::SweepConfig;
use dosnap::error::Result;
use dosnap::provider::digitalocean::DoClient;
use dosnap::provider::dry_run::DryRunProvider;
use dosnap::sweep::{Sweep, SweepReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;
use args::Cli;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = SweepConfig::from_env()?;
    if let Some(keep) = cli.keep {
        config.num_snapshots = keep;
    }
    if let Some(tag) = cli.tag {
        config.tag = tag;
    }
    if let Some(hours) = cli.threshold_hours {
        config.threshold_hours = hours;
    }
    if cli.live {
        config.dry_run = false;
    }

    let client = DoClient::new(config.api_token.clone());

    let report = if config.dry_run {
        info!("running in dry-run mode, no snapshot will be created or deleted");
        Sweep::new(DryRunProvider::new(client), config).run()?
    } else {
        Sweep::new(client, config).run()?
    };
    log_report(&report);

    Ok(())
}

fn log_report(report: &SweepReport) {
    info!(
        droplets = report.droplets_seen,
        backed_up = report.backed_up,
        skipped_untagged = report.skipped_untagged,
        skipped_recent = report.skipped_recent,
        created = report.snapshots_created,
        deleted = report.snapshots_deleted,
        create_failures = report.create_failures,
        delete_failures = report.delete_failures,
        "sweep finished"
    );
}

/// One single-line JSON object per action/decision, on stdout. Skip decisions
/// for untagged droplets log at debug and only show up with --verbose.
fn init_logging(verbose: bool) {
    let default = if verbose { "dosnap=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .init();
}
