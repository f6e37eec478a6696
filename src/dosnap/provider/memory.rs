//! In-memory provider for tests.
//!
//! Seedable with droplets, volumes and snapshots; records every create and
//! delete call it receives and can be told to fail specific mutations, so
//! tests can assert both the happy path and the keep-going-on-error behavior.
//!
//! Mirroring the real provider, a recorded create does not appear in later
//! snapshot listings: DigitalOcean snapshot creation is asynchronous, so the
//! sweep never sees its own same-cycle snapshot either.

use crate::error::{DosnapError, Result};
use crate::model::{Droplet, Snapshot, Volume};
use crate::provider::SnapshotProvider;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct InMemoryProvider {
    droplets: Vec<Droplet>,
    volumes: HashMap<String, Volume>,
    droplet_snapshots: HashMap<u64, Vec<Snapshot>>,
    volume_snapshots: HashMap<String, Vec<Snapshot>>,
    failing_creates: HashSet<String>,
    failing_deletes: HashSet<String>,
    created: Vec<(String, String)>,
    deleted: Vec<String>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_droplet(mut self, id: u64, name: &str, tags: &[&str], volume_ids: &[&str]) -> Self {
        self.droplets.push(Droplet {
            id,
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            volume_ids: volume_ids.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn with_volume(mut self, id: &str, name: &str) -> Self {
        self.volumes.insert(
            id.to_string(),
            Volume {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_droplet_snapshot(
        mut self,
        droplet_id: u64,
        id: &str,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        self.droplet_snapshots
            .entry(droplet_id)
            .or_default()
            .push(Snapshot::new(id, name, created_at));
        self
    }

    pub fn with_volume_snapshot(
        mut self,
        volume_id: &str,
        id: &str,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        self.volume_snapshots
            .entry(volume_id.to_string())
            .or_default()
            .push(Snapshot::new(id, name, created_at));
        self
    }

    /// Make snapshot creation fail for the given resource key, e.g.
    /// `droplet:1` or `volume:vol-1`.
    pub fn failing_create(mut self, resource: &str) -> Self {
        self.failing_creates.insert(resource.to_string());
        self
    }

    /// Make deletion fail for the given snapshot id.
    pub fn failing_delete(mut self, snapshot_id: &str) -> Self {
        self.failing_deletes.insert(snapshot_id.to_string());
        self
    }

    /// Create calls received, as (resource key, snapshot name) pairs in order.
    pub fn created(&self) -> &[(String, String)] {
        &self.created
    }

    /// Snapshot ids of delete calls received, in order.
    pub fn deleted(&self) -> &[String] {
        &self.deleted
    }
}

impl SnapshotProvider for InMemoryProvider {
    fn list_droplets(&self) -> Result<Vec<Droplet>> {
        Ok(self.droplets.clone())
    }

    fn droplet_snapshots(&self, droplet_id: u64) -> Result<Vec<Snapshot>> {
        Ok(self
            .droplet_snapshots
            .get(&droplet_id)
            .cloned()
            .unwrap_or_default())
    }

    fn volume_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>> {
        Ok(self
            .volume_snapshots
            .get(volume_id)
            .cloned()
            .unwrap_or_default())
    }

    fn get_volume(&self, volume_id: &str) -> Result<Volume> {
        self.volumes
            .get(volume_id)
            .cloned()
            .ok_or_else(|| DosnapError::VolumeNotFound(volume_id.to_string()))
    }

    fn snapshot_droplet(&mut self, droplet_id: u64, name: &str) -> Result<()> {
        let resource = format!("droplet:{droplet_id}");
        if self.failing_creates.contains(&resource) {
            return Err(DosnapError::Provider(format!(
                "snapshot creation rejected for {resource}"
            )));
        }
        self.created.push((resource, name.to_string()));
        Ok(())
    }

    fn snapshot_volume(&mut self, volume_id: &str, name: &str) -> Result<()> {
        let resource = format!("volume:{volume_id}");
        if self.failing_creates.contains(&resource) {
            return Err(DosnapError::Provider(format!(
                "snapshot creation rejected for {resource}"
            )));
        }
        self.created.push((resource, name.to_string()));
        Ok(())
    }

    fn delete_snapshot(&mut self, snapshot_id: &str) -> Result<()> {
        if self.failing_deletes.contains(snapshot_id) {
            return Err(DosnapError::Provider(format!(
                "deletion rejected for snapshot {snapshot_id}"
            )));
        }
        self.deleted.push(snapshot_id.to_string());
        Ok(())
    }
}
