use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

fn db_path(app_dir: &Path) -> PathBuf {
    app_dir.join("fieldcompanion.sqlite3")
}

fn migrate(conn: &Connection) -> Result<()> {
    let user_version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if user_version < 1 {
        conn.execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS kv (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL
);
"#,
        )?;
        conn.execute_batch("PRAGMA user_version = 1;")?;
    }
    Ok(())
}

fn map_disk_full(err: rusqlite::Error, key: &str, needed_bytes: usize) -> anyhow::Error {
    if err.sqlite_error_code() == Some(ErrorCode::DiskFull) {
        return super::QuotaExceeded {
            key: key.to_string(),
            needed_bytes,
            quota_bytes: 0,
        }
        .into();
    }
    err.into()
}

/// `kv` table in a WAL-mode SQLite file under `app_dir`.
pub struct SqliteDeviceStore {
    conn: Mutex<Connection>,
    quota_bytes: Option<usize>,
}

impl SqliteDeviceStore {
    pub fn open(app_dir: &Path, quota_bytes: Option<usize>) -> Result<Self> {
        fs::create_dir_all(app_dir)?;
        let conn = Connection::open(db_path(app_dir))?;
        Self::from_connection(conn, quota_bytes)
    }

    pub fn open_in_memory(quota_bytes: Option<usize>) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, quota_bytes)
    }

    fn from_connection(conn: Connection, quota_bytes: Option<usize>) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(5_000))?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            quota_bytes,
        })
    }
}

fn kv_get_string(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        r#"SELECT value FROM kv WHERE key = ?1"#,
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

fn kv_used_by_others(conn: &Connection, key: &str) -> Result<usize> {
    let used: i64 = conn.query_row(
        r#"SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
           FROM kv WHERE key != ?1"#,
        params![key],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(used).unwrap_or(0))
}

impl super::DeviceStore for SqliteDeviceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| anyhow!("poisoned lock"))?;
        kv_get_string(&conn, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| anyhow!("poisoned lock"))?;
        if self.quota_bytes.is_some() {
            let used = kv_used_by_others(&conn, key)?;
            super::check_quota(self.quota_bytes, used, key, value)?;
        }
        conn.execute(
            r#"INSERT INTO kv(key, value) VALUES (?1, ?2)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value"#,
            params![key, value],
        )
        .map_err(|e| map_disk_full(e, key, key.len() + value.len()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| anyhow!("poisoned lock"))?;
        conn.execute(r#"DELETE FROM kv WHERE key = ?1"#, params![key])?;
        Ok(())
    }
}
