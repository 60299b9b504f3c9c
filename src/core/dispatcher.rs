//! Speech Dispatcher
//!
//! Turns a chat message into an announcement and hands it to the TTS
//! engine without holding up the caller. Completion of each utterance is
//! watched by its own spawned task, bounded by a [`PollPolicy`].

use super::markup::speech_markup;
use super::phrasebook::Phrasebook;
use crate::error::ChatterResult;
use crate::store::LanguageStore;
use crate::tts::{SpeakMode, TtsEngine, Utterance};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How a spawned supervisor watches an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between polls
    pub interval: Duration,
    /// How long each poll may wait on the engine
    pub per_poll_timeout: Duration,
    /// Polls before the utterance is abandoned
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            per_poll_timeout: Duration::from_millis(10),
            max_polls: 3000,
        }
    }
}

/// Final state of one supervised utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    Completed { polls: u32 },
    Abandoned { polls: u32 },
    Failed(String),
}

/// A fully prepared announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub lang: String,
    /// Spoken sentence before markup wrapping
    pub text: String,
    pub markup: String,
}

/// Handle to the supervisor of an in-flight announcement.
///
/// Dropping it detaches the supervisor; the speech still runs to completion
/// or abandonment.
#[derive(Debug)]
pub struct SpeechTask {
    pub announcement: Announcement,
    handle: JoinHandle<SpeechOutcome>,
}

impl SpeechTask {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the supervisor to settle
    pub async fn outcome(self) -> SpeechOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => SpeechOutcome::Failed(format!("supervisor task failed: {}", e)),
        }
    }
}

pub struct SpeechDispatcher {
    engine: Arc<dyn TtsEngine>,
    languages: Arc<LanguageStore>,
    phrasebook: Arc<Phrasebook>,
    policy: PollPolicy,
    command_prefix: String,
}

impl SpeechDispatcher {
    pub fn new(
        engine: Arc<dyn TtsEngine>,
        languages: Arc<LanguageStore>,
        phrasebook: Arc<Phrasebook>,
        policy: PollPolicy,
        command_prefix: &str,
    ) -> Self {
        Self {
            engine,
            languages,
            phrasebook,
            policy,
            command_prefix: command_prefix.to_string(),
        }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Build the announcement for a chat message without speaking it
    pub fn prepare(&self, author: &str, content: &str, explicit_lang: Option<&str>) -> Announcement {
        let lang = match explicit_lang {
            Some(lang) => lang.to_string(),
            None => self.languages.get(author),
        };

        let content = self.strip_command(content);
        let text = self.phrasebook.compose(author, content, &lang);
        let markup = speech_markup(&text, &lang);

        Announcement { lang, text, markup }
    }

    /// Submit an announcement and return once the engine accepted it.
    ///
    /// An unavailable engine is logged and reported; the announcement is
    /// dropped.
    pub async fn announce(
        &self,
        author: &str,
        content: &str,
        explicit_lang: Option<&str>,
    ) -> ChatterResult<SpeechTask> {
        let announcement = self.prepare(author, content, explicit_lang);
        debug!("🗣️ [{}] {}", announcement.lang, announcement.text);

        let utterance = match self
            .engine
            .speak(&announcement.markup, SpeakMode::Asynchronous)
            .await
        {
            Ok(utterance) => utterance,
            Err(e) => {
                warn!("⚠️ Dropping announcement from {}: {}", author, e);
                return Err(e);
            }
        };

        let handle = tokio::spawn(supervise(utterance, self.policy));
        Ok(SpeechTask {
            announcement,
            handle,
        })
    }

    /// Speak raw text and wait for it to finish
    pub async fn speak_now(&self, text: &str, lang: &str) -> ChatterResult<()> {
        let markup = speech_markup(text, lang);
        self.engine.speak(&markup, SpeakMode::Synchronous).await?;
        Ok(())
    }

    fn strip_command<'a>(&self, content: &'a str) -> &'a str {
        if self.command_prefix.is_empty() || !content.starts_with(&self.command_prefix) {
            return content;
        }
        content
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest)
            .unwrap_or("")
    }
}

/// Poll `utterance` until it reports done or the policy runs out
pub async fn supervise(mut utterance: Box<dyn Utterance>, policy: PollPolicy) -> SpeechOutcome {
    for poll in 1..=policy.max_polls {
        match utterance.wait_until_done(policy.per_poll_timeout).await {
            Ok(true) => {
                debug!("✅ Utterance finished after {} polls", poll);
                return SpeechOutcome::Completed { polls: poll };
            }
            Ok(false) => {}
            Err(e) => {
                warn!("⚠️ Lost track of utterance: {}", e);
                return SpeechOutcome::Failed(e.to_string());
            }
        }
        tokio::time::sleep(policy.interval).await;
    }

    warn!(
        "⏱️ Utterance abandoned after {} polls ({:?} interval)",
        policy.max_polls, policy.interval
    );
    debug!("Dropping {:?}", utterance);
    SpeechOutcome::Abandoned {
        polls: policy.max_polls,
    }
}
