//! Layered configuration: optional TOML file, then `FIELD_COMPANION__*`
//! environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use ::config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};

use crate::trim::{NoteRetention, TrimLimits};

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub trim: TrimConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default = "default_local_backend_url")]
    pub local_backend_url: String,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            store: StoreConfig::default(),
            autosave: AutosaveConfig::default(),
            trim: TrimConfig::default(),
            llm: LlmConfig::default(),
            local_backend_url: default_local_backend_url(),
            geocoder: GeocoderConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Dir,
    Memory,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_data_dir")]
    pub path: PathBuf,
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_data_dir(),
            quota_bytes: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "default_autosave_interval_ms")]
    pub interval_ms: u64,
}

impl AutosaveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_autosave_interval_ms(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TrimConfig {
    /// Leaving out `notes` here keeps the default note retention.
    #[serde(
        default = "default_routine_limits",
        deserialize_with = "deserialize_routine_limits"
    )]
    pub routine: TrimLimits,
    #[serde(default = "default_emergency_limits")]
    pub emergency: TrimLimits,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            routine: default_routine_limits(),
            emergency: default_emergency_limits(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Remote answers are only attempted when this is set.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_base_url")]
    pub base_url: String,
    #[serde(default = "default_geocoder_user_agent")]
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_base_url(),
            user_agent: default_geocoder_user_agent(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_autosave_interval_ms() -> u64 {
    3_000
}

fn default_routine_limits() -> TrimLimits {
    TrimLimits::ROUTINE
}

fn default_emergency_limits() -> TrimLimits {
    TrimLimits::EMERGENCY
}

fn default_routine_notes() -> Option<NoteRetention> {
    TrimLimits::ROUTINE.notes
}

fn deserialize_routine_limits<'de, D>(deserializer: D) -> std::result::Result<TrimLimits, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct RoutineLimits {
        chat_turns: usize,
        meta_suggestions: usize,
        location_samples: usize,
        #[serde(default = "default_routine_notes")]
        notes: Option<NoteRetention>,
    }

    let raw = RoutineLimits::deserialize(deserializer)?;
    Ok(TrimLimits {
        chat_turns: raw.chat_turns,
        meta_suggestions: raw.meta_suggestions,
        location_samples: raw.location_samples,
        notes: raw.notes,
    })
}

fn default_local_backend_url() -> String {
    "http://localhost:11013".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama-3.2-1b-preview".to_string()
}

fn default_llm_temperature() -> f32 {
    0.1
}

fn default_llm_max_tokens() -> u32 {
    512
}

fn default_geocoder_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocoder_user_agent() -> String {
    "field-companion".to_string()
}

/// Loads `path` when given (it must exist), then environment overrides such
/// as `FIELD_COMPANION__STORE__BACKEND=memory`.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix("FIELD_COMPANION")
            .prefix_separator("__")
            .separator("__")
            .ignore_empty(true),
    );

    let config = builder.build()?;
    config
        .try_deserialize()
        .map_err(|err: ConfigError| err.into())
}
