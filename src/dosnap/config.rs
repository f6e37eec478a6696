use crate::error::{DosnapError, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

pub const ENV_API_TOKEN: &str = "DO_API_TOKEN";
pub const ENV_NUM_SNAPSHOTS: &str = "NUM_SNAPSHOTS";
pub const ENV_TAG: &str = "TAG";
pub const ENV_DRYRUN: &str = "DRYRUN";
pub const ENV_THRESHOLD_HOURS: &str = "THRESHOLD_HOURS";

const DEFAULT_NUM_SNAPSHOTS: usize = 3;
const DEFAULT_TAG: &str = "snap";
const DEFAULT_THRESHOLD_HOURS: i64 = 23;

/// Runtime configuration for one sweep, resolved from the environment once at
/// startup. The sweep itself never reads environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// DigitalOcean API token. Required; validation fails before any API call.
    pub api_token: String,

    /// Automatic snapshots to keep per droplet and per volume.
    pub num_snapshots: usize,

    /// Only droplets carrying this tag are backed up.
    pub tag: String,

    /// When set, mutating API calls are logged but not issued. Defaults to
    /// true; only a literal case-insensitive "false" disables it.
    pub dry_run: bool,

    /// Minimum age, in hours, of the newest automatic snapshot before another
    /// backup cycle runs for a droplet.
    pub threshold_hours: i64,
}

impl SweepConfig {
    /// Load and validate configuration from the environment.
    ///
    /// A missing or empty API token is fatal. Unset knobs fall back to their
    /// defaults; set-but-unparsable ones are config errors rather than being
    /// silently defaulted.
    pub fn from_env() -> Result<Self> {
        let api_token = env::var(ENV_API_TOKEN)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DosnapError::Config(format!("{ENV_API_TOKEN} must be set")))?;

        let num_snapshots = parse_env(ENV_NUM_SNAPSHOTS, DEFAULT_NUM_SNAPSHOTS)?;
        let threshold_hours = parse_env(ENV_THRESHOLD_HOURS, DEFAULT_THRESHOLD_HOURS)?;
        if threshold_hours < 0 {
            return Err(DosnapError::Config(format!(
                "{ENV_THRESHOLD_HOURS} must not be negative, got {threshold_hours}"
            )));
        }
        let tag = env::var(ENV_TAG).unwrap_or_else(|_| DEFAULT_TAG.to_string());
        let dry_run = env::var(ENV_DRYRUN)
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Ok(Self {
            api_token,
            num_snapshots,
            tag,
            dry_run,
            threshold_hours,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| DosnapError::Config(format!("invalid {key} value {raw:?}: {e}"))),
        Err(_) => Ok(default),
    }
}
