//! Language Preference Store
//!
//! username → language tag, kept in a SQLite file opened once per process.

use crate::error::{ChatterError, ChatterResult};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

struct Inner {
    conn: Option<Connection>,
    cache: HashMap<String, String>,
}

pub struct LanguageStore {
    path: PathBuf,
    default_language: String,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for LanguageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageStore")
            .field("path", &self.path)
            .field("default_language", &self.default_language)
            .finish()
    }
}

impl LanguageStore {
    /// Open (creating if needed) the store at `path` and load every preference
    pub fn open(path: &Path, default_language: &str) -> ChatterResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_languages (
                username TEXT PRIMARY KEY,
                lang TEXT NOT NULL
            )",
            [],
        )?;

        let cache = {
            let mut stmt = conn.prepare("SELECT username, lang FROM user_languages")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            let mut cache = HashMap::new();
            for row in rows {
                let (user, lang) = row?;
                cache.insert(user, lang);
            }
            cache
        };

        info!(
            "🗂️ Language store {:?} opened with {} preferences",
            path,
            cache.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            default_language: default_language.to_string(),
            inner: Mutex::new(Inner {
                conn: Some(conn),
                cache,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Language for `username`, or the default when never set
    pub fn get(&self, username: &str) -> String {
        self.lock()
            .cache
            .get(username)
            .cloned()
            .unwrap_or_else(|| self.default_language.clone())
    }

    /// Record `lang` for `username` and flush it to disk.
    ///
    /// The in-memory value is updated even when the write fails.
    pub fn set(&self, username: &str, lang: &str) -> ChatterResult<()> {
        let mut inner = self.lock();
        inner.cache.insert(username.to_string(), lang.to_string());

        let result = match &inner.conn {
            Some(conn) => conn
                .execute(
                    "INSERT INTO user_languages (username, lang) VALUES (?1, ?2)
                     ON CONFLICT(username) DO UPDATE SET lang = excluded.lang",
                    params![username, lang],
                )
                .map(|_| ())
                .map_err(|e| ChatterError::Persistence(format!("saving {}: {}", username, e))),
            None => Err(ChatterError::Persistence(format!(
                "store {:?} is closed",
                self.path
            ))),
        };

        match &result {
            Ok(()) => debug!("💾 {} → {}", username, lang),
            Err(e) => error!("❌ Language for {} kept in memory only: {}", username, e),
        }
        result
    }

    /// Close the underlying database. Later `set` calls stay in memory.
    pub fn close(&self) -> ChatterResult<()> {
        let conn = self.lock().conn.take();
        if let Some(conn) = conn {
            conn.close()
                .map_err(|(_, e)| ChatterError::Persistence(format!("closing store: {}", e)))?;
            info!("🗂️ Language store {:?} closed", self.path);
        }
        Ok(())
    }
}
