//! Durable stores
//!
//! Per-user language preferences and the request queue. Both keep an
//! in-memory copy that stays authoritative for the process, and flush every
//! mutation to disk before returning.

pub mod languages;
pub mod queue;

pub use languages::LanguageStore;
pub use queue::RequestQueue;
