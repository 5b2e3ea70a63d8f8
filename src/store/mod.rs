use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use crate::config::{StoreBackend, StoreConfig};

pub mod localdir;
pub mod sqlite;

/// Raised by a backend when a write would exceed its capacity.
#[derive(Debug)]
pub struct QuotaExceeded {
    pub key: String,
    pub needed_bytes: usize,
    pub quota_bytes: usize,
}

impl std::fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "quota exceeded writing {}: need {} bytes, quota {}",
            self.key, self.needed_bytes, self.quota_bytes
        )
    }
}

impl std::error::Error for QuotaExceeded {}

pub fn is_quota_exceeded(err: &anyhow::Error) -> bool {
    err.downcast_ref::<QuotaExceeded>().is_some()
}

/// Key-value device storage. Values are whole records; `set` overwrites.
pub trait DeviceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: DeviceStore + ?Sized> DeviceStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: DeviceStore + ?Sized> DeviceStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Fails with [`QuotaExceeded`] when `used_by_others + key + value` would
/// exceed `quota`.
pub(crate) fn check_quota(
    quota: Option<usize>,
    used_by_others: usize,
    key: &str,
    value: &str,
) -> Result<()> {
    let Some(quota_bytes) = quota else {
        return Ok(());
    };
    let needed_bytes = used_by_others + key.len() + value.len();
    if needed_bytes > quota_bytes {
        return Err(QuotaExceeded {
            key: key.to_string(),
            needed_bytes,
            quota_bytes,
        }
        .into());
    }
    Ok(())
}

#[derive(Default)]
pub struct InMemoryDeviceStore {
    quota_bytes: Option<usize>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn used_bytes(&self) -> Result<usize> {
        let entries = self.entries.lock().map_err(|_| anyhow!("poisoned lock"))?;
        Ok(entries.iter().map(|(k, v)| k.len() + v.len()).sum())
    }
}

impl DeviceStore for InMemoryDeviceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("poisoned lock"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("poisoned lock"))?;
        let used_by_others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        check_quota(self.quota_bytes, used_by_others, key, value)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("poisoned lock"))?;
        entries.remove(key);
        Ok(())
    }
}

pub fn open_store(cfg: &StoreConfig) -> Result<Box<dyn DeviceStore>> {
    let store: Box<dyn DeviceStore> = match cfg.backend {
        StoreBackend::Memory => Box::new(match cfg.quota_bytes {
            Some(q) => InMemoryDeviceStore::with_quota(q),
            None => InMemoryDeviceStore::new(),
        }),
        StoreBackend::Dir => Box::new(localdir::LocalDirDeviceStore::new(
            cfg.path.clone(),
            cfg.quota_bytes,
        )?),
        StoreBackend::Sqlite => Box::new(sqlite::SqliteDeviceStore::open(
            &cfg.path,
            cfg.quota_bytes,
        )?),
    };
    Ok(store)
}
