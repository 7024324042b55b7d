use crate::api::models::{Conversation, UserId};
use crate::error::CacheError;
use directories::ProjectDirs;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn default_db_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "example", "DriverMessages")?;
    let dir = proj.data_dir().to_path_buf();
    Some(dir.join("cache.sqlite"))
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

// Last successfully loaded snapshot per driver, so the list can be shown offline.
pub struct SnapshotCache {
    conn: Connection,
}

impl SnapshotCache {
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        ensure_dir(path)?;
        let cache = Self { conn: Connection::open(path)? };
        cache.init()?;
        Ok(cache)
    }

    pub fn open_in_memory() -> Result<Self, CacheError> {
        let cache = Self { conn: Connection::open_in_memory()? };
        cache.init()?;
        Ok(cache)
    }

    fn init(&self) -> Result<(), CacheError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS conversations (
                owner TEXT NOT NULL,
                position INTEGER NOT NULL,
                id TEXT NOT NULL,
                raw_json TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (owner, position)
            );
            "#,
        )?;
        Ok(())
    }

    /// Replace the cached snapshot for `owner`. Order is preserved.
    pub fn replace(&mut self, owner: &UserId, conversations: &[Conversation]) -> Result<(), CacheError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        let owner = owner.to_string();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM conversations WHERE owner = ?1", params![owner])?;
        for (idx, c) in conversations.iter().enumerate() {
            let raw = serde_json::to_string(c)?;
            tx.execute(
                r#"
                INSERT INTO conversations (owner, position, id, raw_json, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![owner, idx as i64, c.id.to_string(), raw, now],
            )?;
        }
        tx.commit()?;
        debug!("Cached {} conversations for {owner}", conversations.len());
        Ok(())
    }

    pub fn conversations(&self, owner: &UserId) -> Result<Vec<Conversation>, CacheError> {
        let mut stmt = self
            .conn
            .prepare("SELECT raw_json FROM conversations WHERE owner = ?1 ORDER BY position ASC")?;
        let rows = stmt.query_map(params![owner.to_string()], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(serde_json::from_str(&r?)?);
        }
        Ok(out)
    }

    /// Unix seconds of the last `replace` for `owner`.
    pub fn saved_at(&self, owner: &UserId) -> Result<Option<i64>, CacheError> {
        let ts = self
            .conn
            .query_row(
                "SELECT MAX(updated_at) FROM conversations WHERE owner = ?1",
                params![owner.to_string()],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?
            .flatten();
        Ok(ts)
    }
}
