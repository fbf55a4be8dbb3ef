//! Service layer for the tutor directory.
//! - `storage`: reusable JSON document store with pluggable backends.
//! - `file`: file-backed profile store.
//! - `directory`: registration, lookup, search and statistics.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod file;
pub mod directory;
