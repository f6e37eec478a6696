//! # Provider Layer
//!
//! The [`SnapshotProvider`] trait is the seam between the sweep logic and the
//! cloud API. Implementations:
//!
//! - [`digitalocean::DoClient`]: production client for the DigitalOcean v2 API
//! - [`dry_run::DryRunProvider`]: wraps any provider, delegating reads and
//!   logging-and-skipping mutations — the sweep itself contains no dry-run
//!   conditionals
//! - [`memory::InMemoryProvider`]: seedable in-memory provider for tests,
//!   recording every create/delete call it receives
//!
//! Reads take `&self`, mutations `&mut self`. All calls are synchronous and
//! blocking; the sweep makes one attempt per call and never retries.

use crate::error::Result;
use crate::model::{Droplet, Snapshot, Volume};

pub mod digitalocean;
pub mod dry_run;
pub mod memory;

pub trait SnapshotProvider {
    /// List every droplet in the account.
    fn list_droplets(&self) -> Result<Vec<Droplet>>;

    /// List all snapshots of a droplet.
    fn droplet_snapshots(&self, droplet_id: u64) -> Result<Vec<Snapshot>>;

    /// List all snapshots of a volume.
    fn volume_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>>;

    /// Look up a volume by id (needed for its name).
    fn get_volume(&self, volume_id: &str) -> Result<Volume>;

    /// Request a snapshot of a droplet under the given name.
    fn snapshot_droplet(&mut self, droplet_id: u64, name: &str) -> Result<()>;

    /// Request a snapshot of a volume under the given name.
    fn snapshot_volume(&mut self, volume_id: &str, name: &str) -> Result<()>;

    /// Delete a snapshot by id.
    fn delete_snapshot(&mut self, snapshot_id: &str) -> Result<()>;
}
