use clap::Parser;

/// Flags override the corresponding environment variables; the environment
/// remains the primary interface for cron use.
#[derive(Parser, Debug)]
#[command(name = "dosnap")]
#[command(
    about = "Snapshot tagged DigitalOcean droplets and volumes, pruning old automatic snapshots",
    long_about = None
)]
pub struct Cli {
    /// Automatic snapshots to keep per droplet and per volume
    #[arg(short, long, value_name = "N")]
    pub keep: Option<usize>,

    /// Only back up droplets carrying this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Minimum age in hours of the newest automatic snapshot before another
    /// cycle runs for a droplet
    #[arg(long, value_name = "HOURS", value_parser = clap::value_parser!(i64).range(0..))]
    pub threshold_hours: Option<i64>,

    /// Actually issue create/delete calls (default is dry-run)
    #[arg(long)]
    pub live: bool,

    /// Verbose output (shows skipped droplets)
    #[arg(short, long)]
    pub verbose: bool,
}
