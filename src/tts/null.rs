//! Silent engine for headless hosts

use super::{Finished, SpeakMode, TtsEngine, Utterance};
use crate::error::ChatterResult;
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Default)]
pub struct NullEngine;

impl NullEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TtsEngine for NullEngine {
    async fn speak(&self, markup: &str, _mode: SpeakMode) -> ChatterResult<Box<dyn Utterance>> {
        info!("🔇 (silent) {}", markup);
        Ok(Box::new(Finished))
    }

    fn name(&self) -> &str {
        "null"
    }
}
