//! Dry-run decorator.
//!
//! Wraps any [`SnapshotProvider`], delegating reads and replacing mutations
//! with a log line. The sweep runs the exact same branching logic either way;
//! only whether create/delete calls actually reach the provider changes.

use crate::error::Result;
use crate::model::{Droplet, Snapshot, Volume};
use crate::provider::SnapshotProvider;
use tracing::info;

pub struct DryRunProvider<P> {
    inner: P,
}

impl<P> DryRunProvider<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: SnapshotProvider> SnapshotProvider for DryRunProvider<P> {
    fn list_droplets(&self) -> Result<Vec<Droplet>> {
        self.inner.list_droplets()
    }

    fn droplet_snapshots(&self, droplet_id: u64) -> Result<Vec<Snapshot>> {
        self.inner.droplet_snapshots(droplet_id)
    }

    fn volume_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>> {
        self.inner.volume_snapshots(volume_id)
    }

    fn get_volume(&self, volume_id: &str) -> Result<Volume> {
        self.inner.get_volume(volume_id)
    }

    fn snapshot_droplet(&mut self, droplet_id: u64, name: &str) -> Result<()> {
        info!(droplet_id, name, "dry-run: droplet snapshot not created");
        Ok(())
    }

    fn snapshot_volume(&mut self, volume_id: &str, name: &str) -> Result<()> {
        info!(volume_id, name, "dry-run: volume snapshot not created");
        Ok(())
    }

    fn delete_snapshot(&mut self, snapshot_id: &str) -> Result<()> {
        info!(snapshot_id, "dry-run: snapshot not deleted");
        Ok(())
    }
}
