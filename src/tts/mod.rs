//! TTS (Text-to-Speech) Module
//!
//! Provides a unified interface for the speech backends. Every backend
//! consumes speech markup and hands back an [`Utterance`] whose completion
//! can be polled.

use crate::config::Config;
use crate::error::ChatterResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub mod null;
pub mod sapi;
pub mod system;

/// How `speak` treats the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakMode {
    /// Return only after the utterance has finished
    Synchronous,
    /// Return as soon as the backend accepted the utterance
    Asynchronous,
}

/// Completion handle for one submitted utterance
#[async_trait]
pub trait Utterance: Send + std::fmt::Debug {
    /// Wait at most `timeout` for the utterance to finish.
    ///
    /// Returns `true` once speech is done. Calling again after completion
    /// keeps returning `true`.
    async fn wait_until_done(&mut self, timeout: Duration) -> ChatterResult<bool>;
}

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync + std::fmt::Debug {
    /// Speak the given speech markup
    async fn speak(&self, markup: &str, mode: SpeakMode) -> ChatterResult<Box<dyn Utterance>>;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// An utterance that has already finished
#[derive(Debug, Default, Clone, Copy)]
pub struct Finished;

#[async_trait]
impl Utterance for Finished {
    async fn wait_until_done(&mut self, _timeout: Duration) -> ChatterResult<bool> {
        Ok(true)
    }
}

/// Utterance backed by a speech child process
#[derive(Debug)]
pub struct ChildUtterance {
    child: tokio::process::Child,
    engine: &'static str,
}

impl ChildUtterance {
    pub fn new(child: tokio::process::Child, engine: &'static str) -> Self {
        Self { child, engine }
    }
}

#[async_trait]
impl Utterance for ChildUtterance {
    async fn wait_until_done(&mut self, timeout: Duration) -> ChatterResult<bool> {
        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(Ok(status)) => {
                if !status.success() {
                    warn!("⚠️ {} exited with {}", self.engine, status);
                }
                Ok(true)
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Ok(false),
        }
    }
}

/// Factory to create the configured TTS engine
pub async fn create_engine(config: &Config) -> ChatterResult<Arc<dyn TtsEngine>> {
    info!("🛠️ Creating TTS engine: {}", config.tts_engine);
    let engine: Arc<dyn TtsEngine> = match config.tts_engine.as_str() {
        "system" | "espeak" | "espeak-ng" => {
            info!("  - Using espeak-ng");
            Arc::new(system::SystemEngine::new())
        }
        "sapi" => {
            info!("  - Using Windows SAPI via PowerShell");
            Arc::new(sapi::SapiEngine::connect().await?)
        }
        "null" | "none" => {
            info!("  - Using silent engine");
            Arc::new(null::NullEngine::new())
        }
        _ => {
            warn!(
                "  - Unknown engine '{}', falling back to System",
                config.tts_engine
            );
            Arc::new(system::SystemEngine::new())
        }
    };
    info!("✅ TTS engine '{}' initialized", engine.name());
    Ok(engine)
}
