//! # Retention Sweep
//!
//! The sequential batch job: list droplets, keep the tagged ones, and for each
//! run Gate → Creator → Pruner. Droplets are processed one at a time in
//! listing order, independently; a failure to create or delete one snapshot is
//! logged and never blocks the rest of that droplet's cycle.
//!
//! The gate and pruning rules live in the pure functions [`backup_due`] and
//! [`split_prunable`] so they can be tested without a provider.

use crate::config::SweepConfig;
use crate::error::Result;
use crate::model::{Droplet, Snapshot};
use crate::naming::{is_auto_snapshot, snapshot_name};
use crate::provider::SnapshotProvider;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info};

/// Counters describing what one sweep did (or, in dry-run, decided to do).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub droplets_seen: usize,
    pub backed_up: usize,
    pub skipped_untagged: usize,
    pub skipped_recent: usize,
    pub snapshots_created: usize,
    pub snapshots_deleted: usize,
    pub create_failures: usize,
    pub delete_failures: usize,
}

pub struct Sweep<P: SnapshotProvider> {
    provider: P,
    config: SweepConfig,
}

impl<P: SnapshotProvider> Sweep<P> {
    pub fn new(provider: P, config: SweepConfig) -> Self {
        Self { provider, config }
    }

    /// Consume the sweep, returning the provider (used by tests to inspect
    /// recorded calls).
    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Run one full sweep over every droplet in the account.
    ///
    /// Listing failures abort the run; per-snapshot create/delete failures are
    /// logged and counted but do not.
    pub fn run(&mut self) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        let droplets = self.provider.list_droplets()?;

        for droplet in droplets {
            report.droplets_seen += 1;

            if !droplet.has_tag(&self.config.tag) {
                debug!(droplet = %droplet.name, id = droplet.id, "skipping untagged droplet");
                report.skipped_untagged += 1;
                continue;
            }

            if !self.backup_due(&droplet)? {
                info!(
                    droplet = %droplet.name,
                    threshold_hours = self.config.threshold_hours,
                    "recent automatic snapshot exists, skipping cycle"
                );
                report.skipped_recent += 1;
                continue;
            }

            info!(droplet = %droplet.name, id = droplet.id, "backing up droplet");
            report.backed_up += 1;
            self.create_snapshots(&droplet, &mut report)?;
            self.cleanup(&droplet, &mut report)?;
        }

        Ok(report)
    }

    fn backup_due(&self, droplet: &Droplet) -> Result<bool> {
        let snapshots = self.provider.droplet_snapshots(droplet.id)?;
        Ok(backup_due(
            &snapshots,
            Utc::now(),
            self.config.threshold_hours,
        ))
    }

    fn create_snapshots(&mut self, droplet: &Droplet, report: &mut SweepReport) -> Result<()> {
        let name = snapshot_name(&droplet.name, Utc::now());
        info!(droplet = %droplet.name, name = %name, "creating droplet snapshot");
        match self.provider.snapshot_droplet(droplet.id, &name) {
            Ok(()) => report.snapshots_created += 1,
            Err(e) => {
                error!(droplet = %droplet.name, error = %e, "failed to create droplet snapshot");
                report.create_failures += 1;
            }
        }

        for volume_id in &droplet.volume_ids {
            let volume = self.provider.get_volume(volume_id)?;
            let name = snapshot_name(&volume.name, Utc::now());
            info!(volume = %volume.name, name = %name, "creating volume snapshot");
            match self.provider.snapshot_volume(volume_id, &name) {
                Ok(()) => report.snapshots_created += 1,
                Err(e) => {
                    error!(volume = %volume.name, error = %e, "failed to create volume snapshot");
                    report.create_failures += 1;
                }
            }
        }

        Ok(())
    }

    fn cleanup(&mut self, droplet: &Droplet, report: &mut SweepReport) -> Result<()> {
        let snapshots = self.provider.droplet_snapshots(droplet.id)?;
        self.prune(&droplet.name, snapshots, report);

        for volume_id in &droplet.volume_ids {
            let volume = self.provider.get_volume(volume_id)?;
            let snapshots = self.provider.volume_snapshots(volume_id)?;
            self.prune(&volume.name, snapshots, report);
        }

        Ok(())
    }

    fn prune(&mut self, resource: &str, snapshots: Vec<Snapshot>, report: &mut SweepReport) {
        let keep = self.config.num_snapshots;
        let (to_remove, survivors) = split_prunable(snapshots, keep);
        let matching = to_remove.len() + survivors.len();

        if matching == 0 {
            info!(resource, "no automatic snapshots found");
            return;
        }
        info!(resource, matching, "found automatic snapshots");
        if to_remove.is_empty() {
            info!(resource, limit = keep, "within retention limit, nothing to remove");
            return;
        }

        info!(resource, limit = keep, excess = to_remove.len(), "removing old snapshots");
        for snapshot in &to_remove {
            info!(resource, name = %snapshot.name, "removing snapshot");
            match self.provider.delete_snapshot(&snapshot.id) {
                Ok(()) => report.snapshots_deleted += 1,
                Err(e) => {
                    error!(resource, name = %snapshot.name, error = %e, "failed to delete snapshot");
                    report.delete_failures += 1;
                }
            }
        }
    }
}

/// Gate rule: a backup cycle is due when the newest matching snapshot is
/// strictly older than `threshold_hours`, or when there is none at all.
/// Non-matching snapshots never hold the gate closed.
pub fn backup_due(snapshots: &[Snapshot], now: DateTime<Utc>, threshold_hours: i64) -> bool {
    let newest = snapshots
        .iter()
        .filter(|s| is_auto_snapshot(&s.name))
        .map(|s| s.created_at)
        .max();
    match newest {
        None => true,
        Some(created_at) => created_at < now - Duration::hours(threshold_hours),
    }
}

/// Retention rule: filter to matching snapshots, sort ascending by creation
/// time (stable, so ties keep listing order), and split off the oldest excess
/// beyond `keep`. Returns `(to_remove, survivors)`, both oldest-first.
pub fn split_prunable(snapshots: Vec<Snapshot>, keep: usize) -> (Vec<Snapshot>, Vec<Snapshot>) {
    let mut matching: Vec<Snapshot> = snapshots
        .into_iter()
        .filter(|s| is_auto_snapshot(&s.name))
        .collect();
    matching.sort_by_key(|s| s.created_at);

    let excess = matching.len().saturating_sub(keep);
    let survivors = matching.split_off(excess);
    (matching, survivors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::dry_run::DryRunProvider;
    use crate::provider::memory::InMemoryProvider;

    fn config(num_snapshots: usize) -> SweepConfig {
        SweepConfig {
            api_token: "test-token".to_string(),
            num_snapshots,
            tag: "snap".to_string(),
            dry_run: false,
            threshold_hours: 23,
        }
    }

    fn hours_ago(hours: i64) -> DateTime<Utc> {
        Utc::now() - Duration::hours(hours)
    }

    fn auto_snap(id: &str, resource: &str, age_hours: i64) -> Snapshot {
        let created_at = hours_ago(age_hours);
        Snapshot::new(id, snapshot_name(resource, created_at), created_at)
    }

    // -- gate ---------------------------------------------------------------

    #[test]
    fn test_gate_due_with_no_snapshots() {
        assert!(backup_due(&[], Utc::now(), 23));
    }

    #[test]
    fn test_gate_due_when_newest_is_old_enough() {
        let snapshots = vec![auto_snap("1", "web", 24), auto_snap("2", "web", 48)];
        assert!(backup_due(&snapshots, Utc::now(), 23));
    }

    #[test]
    fn test_gate_skips_when_newest_is_recent() {
        let snapshots = vec![auto_snap("1", "web", 48), auto_snap("2", "web", 2)];
        assert!(!backup_due(&snapshots, Utc::now(), 23));
    }

    #[test]
    fn test_gate_ignores_user_snapshots() {
        // A fresh manual snapshot must not hold the gate closed.
        let snapshots = vec![
            Snapshot::new("1", "before-upgrade", hours_ago(1)),
            auto_snap("2", "web", 30),
        ];
        assert!(backup_due(&snapshots, Utc::now(), 23));
    }

    // -- pruning ------------------------------------------------------------

    #[test]
    fn test_prunable_keeps_newest_three_of_five() {
        // N=3, snapshots at days 1..5: the two oldest go.
        let snapshots: Vec<Snapshot> = (1..=5)
            .map(|day| auto_snap(&day.to_string(), "web", day * 24))
            .collect();
        let (to_remove, survivors) = split_prunable(snapshots, 3);

        let removed: Vec<&str> = to_remove.iter().map(|s| s.id.as_str()).collect();
        let kept: Vec<&str> = survivors.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(removed, ["5", "4"]);
        assert_eq!(kept, ["3", "2", "1"]);
    }

    #[test]
    fn test_prunable_everything_removed_precedes_survivors() {
        let snapshots: Vec<Snapshot> = (1..=10)
            .map(|n| auto_snap(&n.to_string(), "web", n * 7))
            .collect();
        let (to_remove, survivors) = split_prunable(snapshots, 4);
        assert_eq!(to_remove.len(), 6);
        assert_eq!(survivors.len(), 4);
        let newest_removed = to_remove.iter().map(|s| s.created_at).max().unwrap();
        let oldest_kept = survivors.iter().map(|s| s.created_at).min().unwrap();
        assert!(newest_removed <= oldest_kept);
    }

    #[test]
    fn test_prunable_nothing_at_or_under_limit() {
        let snapshots = vec![auto_snap("1", "web", 24), auto_snap("2", "web", 48)];
        let (to_remove, survivors) = split_prunable(snapshots, 3);
        assert!(to_remove.is_empty());
        assert_eq!(survivors.len(), 2);

        let snapshots = vec![
            auto_snap("1", "web", 24),
            auto_snap("2", "web", 48),
            auto_snap("3", "web", 72),
        ];
        let (to_remove, _) = split_prunable(snapshots, 3);
        assert!(to_remove.is_empty());
    }

    #[test]
    fn test_prunable_never_touches_user_snapshots() {
        let mut snapshots: Vec<Snapshot> = (1..=5)
            .map(|n| auto_snap(&n.to_string(), "web", n * 24))
            .collect();
        // Ancient manual snapshots, older than every automatic one.
        snapshots.push(Snapshot::new("golden", "golden-image", hours_ago(24 * 365)));
        snapshots.push(Snapshot::new("user", "auto-not-a-backup", hours_ago(24 * 400)));

        let (to_remove, survivors) = split_prunable(snapshots, 2);
        assert!(to_remove.iter().all(|s| is_auto_snapshot(&s.name)));
        assert_eq!(to_remove.len(), 3);
        assert_eq!(survivors.len(), 2);
    }

    // -- full sweep ---------------------------------------------------------

    #[test]
    fn test_untagged_droplet_is_skipped() {
        let provider = InMemoryProvider::new().with_droplet(1, "web-1", &["prod"], &[]);
        let mut sweep = Sweep::new(provider, config(3));
        let report = sweep.run().unwrap();

        assert_eq!(report.skipped_untagged, 1);
        assert_eq!(report.backed_up, 0);
        let provider = sweep.into_provider();
        assert!(provider.created().is_empty());
        assert!(provider.deleted().is_empty());
    }

    #[test]
    fn test_tagged_droplet_with_volume_is_backed_up_and_pruned() {
        let provider = InMemoryProvider::new()
            .with_droplet(1, "web-1", &["snap"], &["vol-1"])
            .with_volume("vol-1", "data-1")
            .with_droplet_snapshot(1, "d1", &snapshot_name("web-1", hours_ago(96)), hours_ago(96))
            .with_droplet_snapshot(1, "d2", &snapshot_name("web-1", hours_ago(72)), hours_ago(72))
            .with_droplet_snapshot(1, "d3", &snapshot_name("web-1", hours_ago(48)), hours_ago(48))
            .with_droplet_snapshot(1, "d4", &snapshot_name("web-1", hours_ago(24)), hours_ago(24))
            .with_volume_snapshot("vol-1", "v1", &snapshot_name("data-1", hours_ago(48)), hours_ago(48));
        let mut sweep = Sweep::new(provider, config(3));
        let report = sweep.run().unwrap();

        assert_eq!(report.backed_up, 1);
        assert_eq!(report.snapshots_created, 2);
        assert_eq!(report.snapshots_deleted, 1);

        let provider = sweep.into_provider();
        assert_eq!(provider.created().len(), 2);
        assert_eq!(provider.created()[0].0, "droplet:1");
        assert_eq!(provider.created()[1].0, "volume:vol-1");
        // Only the oldest droplet snapshot goes; the volume is under its limit.
        assert_eq!(provider.deleted(), ["d1"]);
    }

    #[test]
    fn test_recent_snapshot_gates_the_whole_cycle() {
        let provider = InMemoryProvider::new()
            .with_droplet(1, "web-1", &["snap"], &["vol-1"])
            .with_volume("vol-1", "data-1")
            .with_droplet_snapshot(1, "d1", &snapshot_name("web-1", hours_ago(96)), hours_ago(96))
            .with_droplet_snapshot(1, "d2", &snapshot_name("web-1", hours_ago(2)), hours_ago(2));
        let mut sweep = Sweep::new(provider, config(1));
        let report = sweep.run().unwrap();

        assert_eq!(report.skipped_recent, 1);
        assert_eq!(report.backed_up, 0);
        let provider = sweep.into_provider();
        // No creation and, even though d1 exceeds the limit, no pruning.
        assert!(provider.created().is_empty());
        assert!(provider.deleted().is_empty());
    }

    #[test]
    fn test_create_failure_does_not_block_volumes_or_pruning() {
        let provider = InMemoryProvider::new()
            .with_droplet(1, "web-1", &["snap"], &["vol-1"])
            .with_volume("vol-1", "data-1")
            .with_droplet_snapshot(1, "d1", &snapshot_name("web-1", hours_ago(96)), hours_ago(96))
            .with_droplet_snapshot(1, "d2", &snapshot_name("web-1", hours_ago(48)), hours_ago(48))
            .failing_create("droplet:1");
        let mut sweep = Sweep::new(provider, config(1));
        let report = sweep.run().unwrap();

        assert_eq!(report.create_failures, 1);
        assert_eq!(report.snapshots_created, 1);
        assert_eq!(report.snapshots_deleted, 1);

        let provider = sweep.into_provider();
        assert_eq!(provider.created().len(), 1);
        assert_eq!(provider.created()[0].0, "volume:vol-1");
        assert_eq!(provider.deleted(), ["d1"]);
    }

    #[test]
    fn test_delete_failure_does_not_block_remaining_deletions() {
        let provider = InMemoryProvider::new()
            .with_droplet(1, "web-1", &["snap"], &[])
            .with_droplet_snapshot(1, "d1", &snapshot_name("web-1", hours_ago(96)), hours_ago(96))
            .with_droplet_snapshot(1, "d2", &snapshot_name("web-1", hours_ago(72)), hours_ago(72))
            .with_droplet_snapshot(1, "d3", &snapshot_name("web-1", hours_ago(48)), hours_ago(48))
            .failing_delete("d1");
        let mut sweep = Sweep::new(provider, config(1));
        let report = sweep.run().unwrap();

        assert_eq!(report.delete_failures, 1);
        assert_eq!(report.snapshots_deleted, 1);
        assert_eq!(sweep.into_provider().deleted(), ["d2"]);
    }

    #[test]
    fn test_droplets_are_independent() {
        let provider = InMemoryProvider::new()
            .with_droplet(1, "web-1", &["snap"], &[])
            .with_droplet(2, "web-2", &["prod"], &[])
            .with_droplet(3, "web-3", &["snap"], &[])
            .with_droplet_snapshot(3, "s1", &snapshot_name("web-3", hours_ago(1)), hours_ago(1));
        let mut sweep = Sweep::new(provider, config(3));
        let report = sweep.run().unwrap();

        assert_eq!(report.droplets_seen, 3);
        assert_eq!(report.backed_up, 1);
        assert_eq!(report.skipped_untagged, 1);
        assert_eq!(report.skipped_recent, 1);
        assert_eq!(sweep.into_provider().created().len(), 1);
    }

    #[test]
    fn test_dry_run_makes_the_same_decisions_without_mutations() {
        let seed = || {
            InMemoryProvider::new()
                .with_droplet(1, "web-1", &["snap"], &[])
                .with_droplet_snapshot(1, "d1", &snapshot_name("web-1", hours_ago(96)), hours_ago(96))
                .with_droplet_snapshot(1, "d2", &snapshot_name("web-1", hours_ago(72)), hours_ago(72))
        };

        let mut live = Sweep::new(seed(), config(1));
        let live_report = live.run().unwrap();

        let mut dry = Sweep::new(DryRunProvider::new(seed()), config(1));
        let dry_report = dry.run().unwrap();

        // Identical decision counters, but nothing reached the inner provider.
        assert_eq!(live_report, dry_report);
        let live_provider = live.into_provider();
        assert_eq!(live_provider.created().len(), 1);
        assert_eq!(live_provider.deleted(), ["d1"]);
        let inner = dry.into_provider().into_inner();
        assert!(inner.created().is_empty());
        assert!(inner.deleted().is_empty());
    }
}
