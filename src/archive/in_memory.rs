use std::collections::BTreeMap;

use crate::{
    commit::{Commit, CommitId},
    error::Error,
};

use super::ArchiveSink;

#[derive(Debug, Clone, Default)]
pub struct InMemoryArchive {
    entries: BTreeMap<(CommitId, String), Vec<u8>>,
    manifests: BTreeMap<CommitId, String>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// The names archived for `commit`, in order.
    pub fn names(&self, commit: CommitId) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|(id, _)| *id == commit)
            .map(|(_, name)| name.as_str())
            .collect()
    }

    pub fn manifest(&self, commit: CommitId) -> Option<&str> {
        self.manifests.get(&commit).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.manifests.is_empty()
    }
}

impl ArchiveSink for InMemoryArchive {
    fn write_entry(
        &mut self,
        commit: CommitId,
        name: &str,
        content: &[u8],
    ) -> std::io::Result<()> {
        self.entries
            .insert((commit, name.to_string()), Vec::from(content));
        Ok(())
    }

    fn write_manifest(&mut self, commit: &Commit) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(commit)?;
        self.manifests.insert(commit.id(), json);
        Ok(())
    }

    fn read_entry(&self, commit: CommitId, name: &str) -> std::io::Result<Option<Vec<u8>>> {
        Ok(self.entries.get(&(commit, name.to_string())).cloned())
    }

    fn discard(&mut self, commit: CommitId) -> std::io::Result<()> {
        self.entries.retain(|(id, _), _| *id != commit);
        self.manifests.remove(&commit);
        Ok(())
    }

    fn teardown(&mut self) -> std::io::Result<()> {
        self.entries.clear();
        self.manifests.clear();
        Ok(())
    }
}

#[test]
fn test_in_memory_archive() {
    let mut archive = InMemoryArchive::new();
    archive.write_entry(CommitId::FIRST, "b.txt", b"2").unwrap();
    archive.write_entry(CommitId::FIRST, "a.txt", b"1").unwrap();
    archive.write_entry(CommitId::from(2), "a.txt", b"3").unwrap();
    assert_eq!(archive.names(CommitId::FIRST), vec!["a.txt", "b.txt"]);
    archive.discard(CommitId::FIRST).unwrap();
    assert!(archive.names(CommitId::FIRST).is_empty());
    assert_eq!(
        archive.read_entry(CommitId::from(2), "a.txt").unwrap(),
        Some(b"3".to_vec())
    );
    archive.teardown().unwrap();
    assert!(archive.is_empty());
}
