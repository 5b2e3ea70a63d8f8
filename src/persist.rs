//! Bounded Local Store: the single-record snapshot writer/reader.
//!
//! Writes are best-effort. Nothing here returns an error to the caller; every
//! failure is logged and summarized in a [`PersistOutcome`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::state::{now_ms, Snapshot};
use crate::store::{is_quota_exceeded, DeviceStore};
use crate::trim::{trim_snapshot, TrimLimits, TrimReport};

pub const STATE_KEY: &str = "fieldcompanion_state";
pub const DRAFT_KEY: &str = "fieldcompanion_note_draft";

/// Written alongside the snapshot fields. Records without it are version 1.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved {
        bytes: usize,
        trimmed: TrimReport,
    },
    /// The first write hit the capacity limit; the emergency trim made room.
    SavedAfterEmergencyTrim {
        bytes: usize,
        trimmed: TrimReport,
        emergency: TrimReport,
    },
    Failed {
        reason: String,
    },
}

impl PersistOutcome {
    pub fn is_saved(&self) -> bool {
        !matches!(self, PersistOutcome::Failed { .. })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Record<'a> {
    schema_version: u32,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
}

/// In-progress note editor fields, kept under their own key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteDraft {
    pub person: String,
    pub datetime: String,
    pub content: String,
    pub tags: String,
    pub followup: String,
    pub photo: String,
    pub timestamp: i64,
}

impl NoteDraft {
    pub fn is_empty(&self) -> bool {
        self.person.is_empty()
            && self.content.is_empty()
            && self.tags.is_empty()
            && self.followup.is_empty()
            && self.photo.is_empty()
    }
}

pub struct BoundedLocalStore<S: DeviceStore> {
    store: S,
    routine: TrimLimits,
    emergency: TrimLimits,
}

impl<S: DeviceStore> BoundedLocalStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_limits(store, TrimLimits::ROUTINE, TrimLimits::EMERGENCY)
    }

    pub fn with_limits(store: S, routine: TrimLimits, emergency: TrimLimits) -> Self {
        Self {
            store,
            routine,
            emergency,
        }
    }

    pub fn device_store(&self) -> &S {
        &self.store
    }

    pub fn persist(&self, snapshot: &mut Snapshot) -> PersistOutcome {
        self.persist_at(snapshot, now_ms())
    }

    /// Routine trim, write, and on a capacity failure one emergency-trimmed
    /// retry. Trims are applied to `snapshot` itself and stay applied even if
    /// the write fails.
    pub fn persist_at(&self, snapshot: &mut Snapshot, now_ms: i64) -> PersistOutcome {
        let trimmed = trim_snapshot(snapshot, &self.routine, now_ms);
        if trimmed.total() > 0 {
            debug!(?trimmed, "routine trim before save");
        }

        let err = match self.write(snapshot) {
            Ok(bytes) => return PersistOutcome::Saved { bytes, trimmed },
            Err(err) => err,
        };

        if !is_quota_exceeded(&err) {
            error!("error saving state: {err:#}");
            return PersistOutcome::Failed {
                reason: format!("{err:#}"),
            };
        }

        warn!("storage full, running emergency trim: {err}");
        if let Err(e) = self.store.remove(DRAFT_KEY) {
            warn!("could not drop note draft during emergency trim: {e:#}");
        }
        let emergency = trim_snapshot(snapshot, &self.emergency, now_ms);
        info!(?emergency, "emergency trim complete");

        match self.write(snapshot) {
            Ok(bytes) => PersistOutcome::SavedAfterEmergencyTrim {
                bytes,
                trimmed,
                emergency,
            },
            Err(err) => {
                error!("could not save state even after emergency trim: {err:#}");
                PersistOutcome::Failed {
                    reason: format!("{err:#}"),
                }
            }
        }
    }

    fn write(&self, snapshot: &Snapshot) -> anyhow::Result<usize> {
        let json = serde_json::to_string(&Record {
            schema_version: SCHEMA_VERSION,
            snapshot,
        })?;
        self.store.set(STATE_KEY, &json)?;
        Ok(json.len())
    }

    /// Never fails: an absent, unreadable or corrupt record yields defaults,
    /// and each field of a partially-shaped record defaults on its own.
    pub fn restore(&self) -> Snapshot {
        let raw = match self.store.get(STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Snapshot::default(),
            Err(err) => {
                warn!("error loading stored data: {err:#}");
                return Snapshot::default();
            }
        };

        let obj = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(obj)) => obj,
            Ok(_) => {
                warn!("stored state is not an object; starting empty");
                return Snapshot::default();
            }
            Err(err) => {
                warn!("stored state is not valid json; starting empty: {err}");
                return Snapshot::default();
            }
        };

        if let Some(version) = obj.get("schemaVersion").and_then(Value::as_u64) {
            if version > u64::from(SCHEMA_VERSION) {
                warn!(version, "stored state was written by a newer schema");
            }
        }

        Snapshot {
            chat_history: list_field(&obj, "chatHistory"),
            notes: list_field(&obj, "notes"),
            teleprompter_content: scalar_field(&obj, "teleprompterContent"),
            meta_suggestions: list_field(&obj, "metaSuggestions"),
            meta_location_history: list_field(&obj, "metaLocationHistory"),
            bible_version: scalar_field(&obj, "bibleVersion"),
            chat_mode: scalar_field(&obj, "chatMode"),
        }
    }

    pub fn save_draft(&self, draft: &NoteDraft) {
        let json = match serde_json::to_string(draft) {
            Ok(json) => json,
            Err(err) => {
                error!("could not encode note draft: {err}");
                return;
            }
        };
        if let Err(err) = self.store.set(DRAFT_KEY, &json) {
            warn!("could not save note draft: {err:#}");
        }
    }

    pub fn load_draft(&self) -> NoteDraft {
        match self.store.get(DRAFT_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("ignoring unreadable note draft: {err}");
                NoteDraft::default()
            }),
            Ok(None) => NoteDraft::default(),
            Err(err) => {
                warn!("could not read note draft: {err:#}");
                NoteDraft::default()
            }
        }
    }

    pub fn clear_draft(&self) {
        if let Err(err) = self.store.remove(DRAFT_KEY) {
            warn!("could not clear note draft: {err:#}");
        }
    }
}

fn scalar_field<T: DeserializeOwned + Default>(obj: &Map<String, Value>, name: &str) -> T {
    let Some(value) = obj.get(name) else {
        return T::default();
    };
    match T::deserialize(value) {
        Ok(v) => v,
        Err(err) => {
            warn!(field = name, "ignoring malformed field: {err}");
            T::default()
        }
    }
}

/// Malformed entries are dropped one by one so a single bad element cannot
/// take the rest of the list with it.
fn list_field<T: DeserializeOwned>(obj: &Map<String, Value>, name: &str) -> Vec<T> {
    let items = match obj.get(name) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            warn!(field = name, "ignoring non-array field");
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for item in items {
        match T::deserialize(item) {
            Ok(v) => out.push(v),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(field = name, skipped, "skipped malformed entries");
    }
    out
}
