//! Client-side translation cache and language resolution for the course
//! portal UI.
//!
//! A lookup walks the memory cache, the persistent cache and the
//! negative-key registry before issuing one batched backend request, and
//! always returns a string for every key.

pub mod backend;
pub mod cache;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod i18n;
pub mod reconcile;
pub mod record;
pub mod security;
pub mod server;
pub mod storage;
pub mod store;
