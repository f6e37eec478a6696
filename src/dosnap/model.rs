use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A virtual machine instance as listed by the provider.
///
/// Droplets are read-only from the sweep's perspective: the sweep never
/// creates, renames or destroys them, it only snapshots them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Droplet {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub volume_ids: Vec<String>,
}

impl Droplet {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A block-storage volume attached to a droplet. Read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
}

/// A snapshot of a droplet or a volume.
///
/// Whether a snapshot was created by this tool is determined solely by its
/// name shape (see [`crate::naming::is_auto_snapshot`]); there is no separate
/// persisted marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    // Droplet snapshots carry numeric ids, volume snapshots string ids.
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(id: impl Into<String>, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at,
        }
    }
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(u64),
        Str(String),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Num(n) => n.to_string(),
        Repr::Str(s) => s,
    })
}
