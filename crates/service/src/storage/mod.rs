//! Storage abstractions for service layer
//!
//! `JsonMapStore` keeps a small ordered map in memory and persists it as one
//! JSON document through a pluggable `StoreBackend` (file or memory).

pub mod backend;
pub mod json_map_store;

pub use backend::{FileBackend, MemoryBackend, StoreBackend};
pub use json_map_store::{JsonMapStore, LoadOutcome, LoadSource};
