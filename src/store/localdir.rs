use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};

const RECORD_EXT: &str = "json";

fn normalize_key(key: &str) -> Result<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("empty store key"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        || trimmed.starts_with('.')
    {
        return Err(anyhow!("invalid store key: {key}"));
    }
    Ok(trimmed.to_string())
}

fn record_path(root: &Path, key: &str) -> PathBuf {
    root.join(format!("{key}.{RECORD_EXT}"))
}

/// One file per key under `root`. Writes go through a temp file and a rename
/// so a reader never sees a half-written record.
#[derive(Debug)]
pub struct LocalDirDeviceStore {
    root: PathBuf,
    quota_bytes: Option<usize>,
    write_lock: Mutex<()>,
}

impl LocalDirDeviceStore {
    pub fn new(root: PathBuf, quota_bytes: Option<usize>) -> Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            quota_bytes,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn used_by_others(&self, key: &str) -> Result<usize> {
        let own = format!("{key}.{RECORD_EXT}");
        let mut total = 0usize;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name_os = entry.file_name();
            let Some(name) = name_os.to_str() else {
                continue;
            };
            if name == own {
                continue;
            }
            let Some(stem) = name.strip_suffix(&format!(".{RECORD_EXT}")) else {
                continue;
            };
            let len = usize::try_from(entry.metadata()?.len()).unwrap_or(usize::MAX);
            total = total.saturating_add(stem.len()).saturating_add(len);
        }
        Ok(total)
    }
}

impl super::DeviceStore for LocalDirDeviceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let key = normalize_key(key)?;
        match fs::read_to_string(record_path(&self.root, &key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = normalize_key(key)?;
        let _guard = self.write_lock.lock().map_err(|_| anyhow!("poisoned lock"))?;

        if self.quota_bytes.is_some() {
            let used = self.used_by_others(&key)?;
            super::check_quota(self.quota_bytes, used, &key, value)?;
        }

        let target = record_path(&self.root, &key);
        let tmp = self.root.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let key = normalize_key(key)?;
        match fs::remove_file(record_path(&self.root, &key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
