use crate::{
    commit::{Commit, CommitId},
    error::Error,
};

pub mod directory;
pub mod in_memory;

/// The durability mirror of committed content.
///
/// One entry per file per commit. The in-memory history stays authoritative;
/// nothing is ever read back from here except by verification.
pub trait ArchiveSink {
    fn write_entry(&mut self, commit: CommitId, name: &str, content: &[u8])
        -> std::io::Result<()>;

    /// Records the commit's metadata next to its entries.
    fn write_manifest(&mut self, commit: &Commit) -> Result<(), Error>;

    fn read_entry(&self, commit: CommitId, name: &str) -> std::io::Result<Option<Vec<u8>>>;

    /// Drops everything written for `commit`. Used to roll back a commit that
    /// failed part way.
    fn discard(&mut self, commit: CommitId) -> std::io::Result<()>;

    /// Removes the whole archive.
    fn teardown(&mut self) -> std::io::Result<()>;
}
