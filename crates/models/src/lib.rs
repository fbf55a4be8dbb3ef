//! Domain types for the tutor directory: the `Profile` record, its registration
//! form, timestamp formatting, and the suggestion catalog.

pub mod errors;
pub mod profile;
pub mod timestamp;
pub mod catalog;

pub use profile::{Profile, ProfileInput};
