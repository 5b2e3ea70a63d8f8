use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::scripture::{BibleVersion, ScriptureSet, TopicScriptures};

pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(i64::MAX)
}

/// Which of the two stored answers the chat view shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Ai,
    Scripture,
}

impl ChatMode {
    pub fn tag(&self) -> &'static str {
        match self {
            ChatMode::Ai => "ai",
            ChatMode::Scripture => "scripture",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ai" => Some(ChatMode::Ai),
            "scripture" => Some(ChatMode::Scripture),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub timestamp: i64,
    pub question: String,
    pub ai_answer: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub ai_sources: Vec<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub scripture_answer: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub scripture_data: Vec<TopicScriptures>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub bible_version: BibleVersion,
}

/// Keeps the readable elements of an array; anything else is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNote {
    pub id: String,
    #[serde(default)]
    pub person: String,
    #[serde(default)]
    pub datetime: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub created: i64,
    #[serde(default)]
    pub auto_generated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetaSuggestion {
    pub timestamp: i64,
    pub trigger: String,
    pub data: ScriptureSet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
}

/// Everything that survives a restart. Written and read as one record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
    #[serde(default)]
    pub notes: Vec<FieldNote>,
    #[serde(default)]
    pub teleprompter_content: String,
    #[serde(default)]
    pub meta_suggestions: Vec<MetaSuggestion>,
    #[serde(default)]
    pub meta_location_history: Vec<LocationSample>,
    #[serde(default)]
    pub bible_version: BibleVersion,
    #[serde(default)]
    pub chat_mode: ChatMode,
}

/// Session-only flags. Never persisted.
#[derive(Clone, Debug, Default)]
pub struct SessionFlags {
    pub is_scrolling: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub snapshot: Snapshot,
    pub session: SessionFlags,
}

/// Handle shared between the autosave worker and whoever mutates state.
#[derive(Clone, Debug, Default)]
pub struct SharedState {
    inner: Arc<Mutex<AppState>>,
}

impl SharedState {
    pub fn new(state: AppState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, AppState>> {
        self.inner.lock().map_err(|_| anyhow!("poisoned lock"))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> Result<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }
}
