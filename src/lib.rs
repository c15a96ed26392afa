//! # Mini Version Control
//!
//! A single-timeline version control core: stage edits to tracked files,
//! group them into immutable numbered commits, and check any commit back out.

mod hex;

/// Archive of committed content, one directory per commit.
pub mod archive;
/// Numbered, timestamped groups of [`snapshot::Snapshot`]s.
pub mod commit;
pub mod config;
/// Hash-based identifier of file content.
pub mod content_id;
/// Where working files are loaded from and saved to.
pub mod content_store;
pub mod error;
/// The append-only commit sequence.
pub mod history;
/// The staging and commit state machine.
pub mod repository;
pub mod snapshot;
pub mod verification;
pub mod working_file;

pub use commit::{Commit, CommitId};
pub use config::Config;
pub use error::{Error, Result};
pub use repository::{Outcome, Repository};
