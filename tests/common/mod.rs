#![allow(dead_code)]

pub mod mock_tts;

use chatter::config::Config;
use chatter::AppContext;
use mock_tts::MockTts;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub tts: Arc<MockTts>,
    pub config: Config,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_tts(MockTts::new())
    }

    pub fn with_tts(tts: MockTts) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Config {
            queue_file_path: path_string(temp_dir.path().join("at_queue.txt")),
            preference_store_path: path_string(temp_dir.path().join("tts_lang.sqlite3")),
            poll_interval_ms: 1,
            poll_timeout_ms: 1,
            max_polls: 20,
            ..Config::default()
        };

        Self {
            temp_dir,
            tts: Arc::new(tts),
            config,
        }
    }

    /// Start a fresh application context over this test's files
    pub fn open(&self) -> AppContext {
        AppContext::with_engine(self.config.clone(), self.tts.clone())
            .expect("Failed to open context")
    }

    pub fn queue_path(&self) -> PathBuf {
        PathBuf::from(&self.config.queue_file_path)
    }
}

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().to_string()
}

/// Runs the `chatter` binary against an isolated directory with a fake
/// `espeak-ng` on PATH that appends a line to `marker` when it finishes.
#[cfg(unix)]
pub struct CliContext {
    pub temp_dir: TempDir,
    pub marker: PathBuf,
}

#[cfg(unix)]
impl CliContext {
    pub fn new(speech_seconds: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let bin_dir = temp_dir.path().join("bin");
        std::fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");

        let script = bin_dir.join("espeak-ng");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nsleep {}\necho spoken >> \"$CHATTER_TEST_MARKER\"\n",
                speech_seconds
            ),
        )
        .expect("Failed to write fake espeak-ng");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to mark fake espeak-ng executable");

        let marker = temp_dir.path().join("spoken.txt");
        Self { temp_dir, marker }
    }

    pub fn command(&self, args: &[&str]) -> std::process::Command {
        let bin_path = env!("CARGO_BIN_EXE_chatter");
        let root = self.temp_dir.path();
        let path = format!(
            "{}:{}",
            root.join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );

        let mut cmd = std::process::Command::new(bin_path);
        cmd.arg("--config")
            .arg(root.join("config.json"))
            .args(args)
            .current_dir(root)
            .env("PATH", path)
            .env("CHATTER_TEST_MARKER", &self.marker)
            .env("QUEUE_FILE", root.join("at_queue.txt"))
            .env("CHATTER_PREFERENCE_STORE", root.join("tts_lang.sqlite3"))
            .env("CHATTER_TTS_ENGINE", "system")
            .env_remove("CHATTER_DEFAULT_LANGUAGE")
            .env_remove("CHATTER_COMMAND_PREFIX")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Lines the fake engine wrote so far
    pub fn spoken_count(&self) -> usize {
        std::fs::read_to_string(&self.marker)
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }
}
