//! DigitalOcean API v2 client.
//!
//! A thin blocking client covering exactly the calls the sweep needs. Droplet
//! listing follows pagination; everything else is a single request. Errors are
//! surfaced as [`DosnapError::Api`] with the provider's message when the
//! response carries one.

use crate::error::{DosnapError, Result};
use crate::model::{Droplet, Snapshot, Volume};
use crate::provider::SnapshotProvider;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

const BASE_URL: &str = "https://api.digitalocean.com/v2";
const PER_PAGE: usize = 200;

pub struct DoClient {
    http: Client,
    token: String,
    base_url: String,
}

#[derive(Deserialize)]
struct DropletsPage {
    droplets: Vec<Droplet>,
}

#[derive(Deserialize)]
struct SnapshotList {
    snapshots: Vec<Snapshot>,
}

#[derive(Deserialize)]
struct VolumeEnvelope {
    volume: Volume,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

impl DoClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            token: token.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()?;
        Self::read_json(response)
    }

    fn post_json(&self, path: &str, body: serde_json::Value) -> Result<()> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()?;
        Self::check_status(response).map(|_| ())
    }

    fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check_status(response)?;
        Ok(response.json()?)
    }

    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ApiErrorBody>()
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_default();
        Err(DosnapError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Follows DigitalOcean's page-numbered pagination: fetches page 1, 2, …
/// until a page comes back shorter than [`PER_PAGE`]. Every listing goes
/// through this, so the sweep always sees the full list for a resource.
fn fetch_all_pages<T>(mut fetch_page: impl FnMut(usize) -> Result<Vec<T>>) -> Result<Vec<T>> {
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let batch = fetch_page(page)?;
        let len = batch.len();
        all.extend(batch);
        if len < PER_PAGE {
            return Ok(all);
        }
        page += 1;
    }
}

impl SnapshotProvider for DoClient {
    fn list_droplets(&self) -> Result<Vec<Droplet>> {
        fetch_all_pages(|page| {
            let batch: DropletsPage =
                self.get_json(&format!("/droplets?page={page}&per_page={PER_PAGE}"))?;
            Ok(batch.droplets)
        })
    }

    fn droplet_snapshots(&self, droplet_id: u64) -> Result<Vec<Snapshot>> {
        fetch_all_pages(|page| {
            let list: SnapshotList = self.get_json(&format!(
                "/droplets/{droplet_id}/snapshots?page={page}&per_page={PER_PAGE}"
            ))?;
            Ok(list.snapshots)
        })
    }

    fn volume_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>> {
        fetch_all_pages(|page| {
            let list: SnapshotList = self.get_json(&format!(
                "/volumes/{volume_id}/snapshots?page={page}&per_page={PER_PAGE}"
            ))?;
            Ok(list.snapshots)
        })
    }

    fn get_volume(&self, volume_id: &str) -> Result<Volume> {
        let envelope: VolumeEnvelope = self.get_json(&format!("/volumes/{volume_id}"))?;
        Ok(envelope.volume)
    }

    fn snapshot_droplet(&mut self, droplet_id: u64, name: &str) -> Result<()> {
        self.post_json(
            &format!("/droplets/{droplet_id}/actions"),
            json!({ "type": "snapshot", "name": name }),
        )
    }

    fn snapshot_volume(&mut self, volume_id: &str, name: &str) -> Result<()> {
        self.post_json(
            &format!("/volumes/{volume_id}/snapshots"),
            json!({ "name": name }),
        )
    }

    fn delete_snapshot(&mut self, snapshot_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/snapshots/{}", self.base_url, snapshot_id))
            .bearer_auth(&self.token)
            .send()?;
        Self::check_status(response).map(|_| ())
    }
}
