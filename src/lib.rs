//! Chatter Library
//!
//! Chat-triggered speech announcements, per-user language preferences and a
//! persisted request queue.

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod store;
pub mod tts;

pub use context::AppContext;
pub use error::{ChatterError, ChatterResult};
