//! Application context
//!
//! Everything the chat front-end needs, acquired once at startup and
//! released once at shutdown. The operations here are the whole contract a
//! message router has with the core.

use crate::config::Config;
use crate::core::{Phrasebook, SpeechDispatcher, SpeechTask};
use crate::error::ChatterResult;
use crate::store::{LanguageStore, RequestQueue};
use crate::tts::{self, TtsEngine};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub struct AppContext {
    phrasebook: Arc<Phrasebook>,
    languages: Arc<LanguageStore>,
    queue: Arc<RequestQueue>,
    dispatcher: SpeechDispatcher,
}

impl AppContext {
    /// Open the stores and the configured TTS engine
    pub async fn open(config: Config) -> ChatterResult<Self> {
        let engine = tts::create_engine(&config).await?;
        Self::with_engine(config, engine)
    }

    /// Open the stores around an already constructed engine
    pub fn with_engine(config: Config, engine: Arc<dyn TtsEngine>) -> ChatterResult<Self> {
        config.validate()?;

        let phrasebook = Arc::new(Phrasebook::default());
        if !phrasebook.is_supported(&config.default_language) {
            warn!(
                "⚠️ Default language '{}' has no phrasing, English wording will be used",
                config.default_language
            );
        }

        let queue = Arc::new(RequestQueue::load(Path::new(&config.queue_file_path))?);
        let languages = Arc::new(LanguageStore::open(
            Path::new(&config.preference_store_path),
            &config.default_language,
        )?);

        let dispatcher = SpeechDispatcher::new(
            engine,
            languages.clone(),
            phrasebook.clone(),
            config.poll_policy(),
            &config.command_prefix,
        );

        info!(
            "🚀 Context ready (engine: {}, {} queued requests)",
            dispatcher.engine_name(),
            queue.len()
        );

        Ok(Self {
            phrasebook,
            languages,
            queue,
            dispatcher,
        })
    }

    pub fn phrasebook(&self) -> &Phrasebook {
        &self.phrasebook
    }

    pub fn languages(&self) -> &LanguageStore {
        &self.languages
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn dispatcher(&self) -> &SpeechDispatcher {
        &self.dispatcher
    }

    /// Store a user's language (tag or alias such as `ita`) and return the chat confirmation
    pub fn set_language(&self, username: &str, tag_or_alias: &str) -> ChatterResult<String> {
        let tag = self.phrasebook.resolve(tag_or_alias);
        if !self.phrasebook.is_supported(tag) {
            warn!("⚠️ {} picked unknown language '{}'", username, tag);
        }
        self.languages.set(username, tag)?;
        Ok(self.phrasebook.confirmation(tag, username))
    }

    /// Announce a chat message, optionally forcing a language (tag or alias)
    pub async fn announce(
        &self,
        author: &str,
        content: &str,
        explicit_lang: Option<&str>,
    ) -> ChatterResult<SpeechTask> {
        let lang = explicit_lang.map(|l| self.phrasebook.resolve(l));
        self.dispatcher.announce(author, content, lang).await
    }

    pub fn enqueue_request(&self, item: &str, username: &str) -> ChatterResult<()> {
        self.queue.append(item, username)
    }

    pub fn list_requests(&self) -> Vec<String> {
        self.queue.list()
    }

    /// Release the stores
    pub fn shutdown(self) -> ChatterResult<()> {
        info!("👋 Shutting down");
        self.languages.close()
    }
}
