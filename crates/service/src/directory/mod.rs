//! Tutor directory: registration, lookup, search and statistics over a
//! `ProfileRepository`.

pub mod repository;
pub mod search;
pub mod service;

pub use repository::ProfileRepository;
pub use search::SearchQuery;
pub use service::{DirectoryService, DirectoryStats, Registration};
