//! Mock TTS Engine for Testing
//!
//! Records all submitted markup for verification.

use async_trait::async_trait;
use chatter::error::{ChatterError, ChatterResult};
use chatter::tts::{SpeakMode, TtsEngine, Utterance};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Utterance that finishes after a fixed number of polls
#[derive(Debug)]
pub struct MockUtterance {
    remaining: u32,
}

#[async_trait]
impl Utterance for MockUtterance {
    async fn wait_until_done(&mut self, _timeout: Duration) -> ChatterResult<bool> {
        if self.remaining == 0 {
            return Ok(true);
        }
        self.remaining -= 1;
        Ok(false)
    }
}

/// Mock TTS engine that records spoken markup
#[derive(Debug)]
pub struct MockTts {
    /// All markup that was "spoken"
    pub spoken: Arc<Mutex<Vec<String>>>,
    /// Simulate an unreachable engine
    pub should_fail: Arc<Mutex<bool>>,
    /// Polls each utterance needs before it reports done
    pub polls_needed: u32,
}

impl MockTts {
    pub fn new() -> Self {
        Self::with_polls(0)
    }

    pub fn with_polls(polls_needed: u32) -> Self {
        Self {
            spoken: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
            polls_needed,
        }
    }

    /// Get all spoken markup
    pub fn get_spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    /// Check if a phrase was spoken
    pub fn was_spoken(&self, text: &str) -> bool {
        self.spoken.lock().unwrap().iter().any(|s| s.contains(text))
    }
}

impl Default for MockTts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtsEngine for MockTts {
    async fn speak(&self, markup: &str, _mode: SpeakMode) -> ChatterResult<Box<dyn Utterance>> {
        if *self.should_fail.lock().unwrap() {
            return Err(ChatterError::EngineUnavailable("Mock TTS failure".to_string()));
        }
        self.spoken.lock().unwrap().push(markup.to_string());
        Ok(Box::new(MockUtterance {
            remaining: self.polls_needed,
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
