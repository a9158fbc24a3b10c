//! ModGuard domain core.
//!
//! Pure data model and logic for the moderation-request review workflow.
//! Nothing in this crate performs I/O, so it is shared by the store,
//! review and console crates alike.

pub mod analysis;
pub mod badge;
pub mod error;
pub mod request;
pub mod search;
pub mod stats;
pub mod status;
pub mod types;
