//! espeak-ng backend
//!
//! `espeak-ng -m` interprets its input as SSML, so the markup is passed
//! through untouched.

use super::{ChildUtterance, Finished, SpeakMode, TtsEngine, Utterance};
use crate::error::{ChatterError, ChatterResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

const PROGRAM: &str = "espeak-ng";

#[derive(Debug)]
pub struct SystemEngine {
    program: String,
}

impl Default for SystemEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemEngine {
    pub fn new() -> Self {
        Self {
            program: PROGRAM.to_string(),
        }
    }

    /// Use a different espeak-compatible binary
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl TtsEngine for SystemEngine {
    async fn speak(&self, markup: &str, mode: SpeakMode) -> ChatterResult<Box<dyn Utterance>> {
        debug!("System speaking: {}", markup);

        let mut child = Command::new(&self.program)
            .arg("-m")
            .arg(markup)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ChatterError::EngineUnavailable(format!("failed to spawn {}: {}", self.program, e))
            })?;

        match mode {
            SpeakMode::Synchronous => {
                let status = child.wait().await?;
                if !status.success() {
                    return Err(ChatterError::EngineUnavailable(format!(
                        "{} failed with status {}",
                        self.program, status
                    )));
                }
                Ok(Box::new(Finished))
            }
            SpeakMode::Asynchronous => Ok(Box::new(ChildUtterance::new(child, PROGRAM))),
        }
    }

    fn name(&self) -> &str {
        "system"
    }
}
