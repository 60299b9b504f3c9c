//! Core announcement pipeline
//!
//! Phrasing, speech markup and the dispatcher that drives the TTS engine.

pub mod dispatcher;
pub mod markup;
pub mod phrasebook;

pub use dispatcher::{Announcement, PollPolicy, SpeechDispatcher, SpeechOutcome, SpeechTask};
pub use markup::speech_markup;
pub use phrasebook::{LanguageProfile, Phrasebook, Substitutions};
