//! Request Queue Store
//!
//! Ordered item → requester mapping persisted as a flat text file, one
//! `- <username>: <item>` line per entry. The whole file is rewritten after
//! every mutation.
//!
//! Loading is strict: a non-blank line without the `- ` prefix or without a
//! `:` separator fails the load with [`ChatterError::CorruptQueueFile`].

use crate::error::{ChatterError, ChatterResult};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

const LINE_PREFIX: &str = "- ";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct QueueState {
    order: Vec<String>,
    requesters: HashMap<String, String>,
}

impl QueueState {
    fn insert(&mut self, item: String, user: String) {
        if !self.requesters.contains_key(&item) {
            self.order.push(item.clone());
        }
        self.requesters.insert(item, user);
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .filter_map(|item| {
                self.requesters
                    .get(item)
                    .map(|user| (item.clone(), user.clone()))
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct RequestQueue {
    path: PathBuf,
    state: Mutex<QueueState>,
}

impl RequestQueue {
    /// Load the queue persisted at `path`; a missing file is an empty queue
    pub fn load(path: &Path) -> ChatterResult<Self> {
        let state = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let mut state = QueueState::default();
            for (item, user) in parse_queue(&content, path)? {
                state.insert(item, user);
            }
            state
        } else {
            debug!("No queue file at {:?}, starting empty", path);
            QueueState::default()
        };

        info!("📋 Loaded {} queued requests from {:?}", state.order.len(), path);
        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(state),
        })
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `item` as requested by `username` and rewrite the file.
    ///
    /// Both sides are trimmed and line breaks become spaces so the stored
    /// entry reads back identically. A re-requested item keeps its position
    /// and takes the new requester.
    pub fn append(&self, item: &str, username: &str) -> ChatterResult<()> {
        let item = normalize(item);
        let username = normalize(username);

        let mut state = self.lock();
        state.insert(item.clone(), username.clone());

        let rendered = render_queue(&state.entries());
        if let Err(e) = write_atomically(&self.path, &rendered) {
            error!("❌ Queue kept in memory only: {}", e);
            return Err(ChatterError::Persistence(format!(
                "writing {:?}: {}",
                self.path, e
            )));
        }

        debug!("📋 {} requested {:?}", username, item);
        Ok(())
    }

    /// Snapshot of queued items in first-request order
    pub fn list(&self) -> Vec<String> {
        self.lock().order.clone()
    }

    /// Snapshot of `(item, requester)` pairs in order
    pub fn entries(&self) -> Vec<(String, String)> {
        self.lock().entries()
    }

    pub fn requester(&self, item: &str) -> Option<String> {
        self.lock().requesters.get(&normalize(item)).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn normalize(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim().to_string()
}

/// Serialize entries to the queue file format
pub fn render_queue(entries: &[(String, String)]) -> String {
    let mut out = String::new();
    for (item, user) in entries {
        out.push_str(LINE_PREFIX);
        out.push_str(&escape_user(user));
        out.push_str(": ");
        out.push_str(item);
        out.push('\n');
    }
    out
}

/// Parse queue file content into ordered `(item, requester)` pairs
pub fn parse_queue(content: &str, path: &Path) -> ChatterResult<Vec<(String, String)>> {
    let mut entries = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }

        let corrupt = || ChatterError::CorruptQueueFile {
            path: path.to_path_buf(),
            line: idx + 1,
            content: raw.to_string(),
        };

        let line = raw.trim_start().strip_prefix(LINE_PREFIX).ok_or_else(corrupt)?;
        let (user, item) = split_user(line).ok_or_else(corrupt)?;
        entries.push((item.trim().to_string(), user.trim().to_string()));
    }

    Ok(entries)
}

// Usernames go before the first unescaped ':'; escape ':' and '\' in them.
fn escape_user(user: &str) -> String {
    let mut out = String::with_capacity(user.len());
    for c in user.chars() {
        if c == '\\' || c == ':' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn split_user(line: &str) -> Option<(String, &str)> {
    let mut user = String::new();
    let mut chars = line.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, next)) => user.push(next),
                None => user.push('\\'),
            },
            ':' => return Some((user, &line[i + 1..])),
            _ => user.push(c),
        }
    }
    None
}

fn write_atomically(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Sibling named after the full file name, e.g. `at_queue.txt.tmp`.
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "queue".into());
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)
}
