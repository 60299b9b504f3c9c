use crate::core::PollPolicy;
use crate::error::{ChatterError, ChatterResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Storage
    pub queue_file_path: String,
    pub preference_store_path: String,

    // Speech
    pub default_language: String,
    pub tts_engine: String,
    pub command_prefix: String,

    // Completion supervision
    pub poll_interval_ms: u64,
    pub poll_timeout_ms: u64,
    pub max_polls: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_file_path: "at_queue.txt".to_string(),
            preference_store_path: "tts_lang.sqlite3".to_string(),
            default_language: "en-US".to_string(),
            tts_engine: "system".to_string(),
            command_prefix: "!".to_string(),
            poll_interval_ms: 100,
            poll_timeout_ms: 10,
            max_polls: 3000,
        }
    }
}

impl Config {
    /// Load config from the default location, then apply the environment
    pub fn load() -> ChatterResult<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from `path` (defaults when missing), then apply `.env` and the environment
    pub fn load_from(path: &Path) -> ChatterResult<Self> {
        let mut config = Self::read_file(path)?;

        match dotenvy::dotenv() {
            Ok(env_path) => tracing::info!("📄 Sourced environment file {:?}", env_path),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("⚠️ Could not source .env file: {}", e),
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> ChatterResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Apply environment-style overrides through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QUEUE_FILE") {
            self.queue_file_path = v;
        }
        // Either name is honoured; the explicit one wins.
        if let Some(v) = lookup("TTS_LANG_PICKLE_PATH") {
            self.preference_store_path = v;
        }
        if let Some(v) = lookup("CHATTER_PREFERENCE_STORE") {
            self.preference_store_path = v;
        }
        if let Some(v) = lookup("CHATTER_DEFAULT_LANGUAGE") {
            self.default_language = v;
        }
        if let Some(v) = lookup("CHATTER_TTS_ENGINE") {
            self.tts_engine = v;
        }
        if let Some(v) = lookup("CHATTER_COMMAND_PREFIX") {
            self.command_prefix = v;
        }
    }

    pub fn validate(&self) -> ChatterResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(ChatterError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_polls == 0 {
            return Err(ChatterError::Config(
                "max_polls must be greater than zero".to_string(),
            ));
        }
        if self.default_language.trim().is_empty() {
            return Err(ChatterError::Config(
                "default_language must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Save config to `path`
    pub fn save(&self, path: &Path) -> ChatterResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            per_poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            max_polls: self.max_polls,
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatter")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.queue_file_path, "at_queue.txt");
        assert_eq!(config.default_language, "en-US");
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.poll_interval_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let restored: Config = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config.queue_file_path, restored.queue_file_path);
        assert_eq!(config.max_polls, restored.max_polls);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let restored: Config =
            serde_json::from_str(r#"{"default_language":"it-IT"}"#).expect("partial config");
        assert_eq!(restored.default_language, "it-IT");
        assert_eq!(restored.tts_engine, "system");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("QUEUE_FILE", "/tmp/q.txt"),
            ("TTS_LANG_PICKLE_PATH", "/tmp/legacy.db"),
            ("CHATTER_PREFERENCE_STORE", "/tmp/prefs.db"),
            ("CHATTER_TTS_ENGINE", "null"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.queue_file_path, "/tmp/q.txt");
        assert_eq!(config.preference_store_path, "/tmp/prefs.db");
        assert_eq!(config.tts_engine, "null");
        assert_eq!(config.default_language, "en-US");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ChatterError::Config(_))));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not valid json").expect("write");

        let config = Config::read_file(&path).expect("read");
        assert_eq!(config.tts_engine, "system");
        assert!(path.with_extension("json.corrupt").exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            max_polls: 7,
            ..Config::default()
        };
        config.save(&path).expect("save");

        let restored = Config::read_file(&path).expect("read");
        assert_eq!(restored.max_polls, 7);
    }
}
