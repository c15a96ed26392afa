use chrono::Local;

use crate::{
    commit::{Commit, CommitId},
    working_file::WorkingFile,
};

/// The append-only sequence of [`Commit`]s, in id order.
#[derive(Debug, Clone)]
pub struct History {
    commits: Vec<Commit>,
    next_id: CommitId,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            commits: Vec::new(),
            next_id: CommitId::FIRST,
        }
    }

    /// The id the next successful [`History::append`] will hand out.
    pub fn next_id(&self) -> CommitId {
        self.next_id
    }

    /// Freezes `files` into a new commit and appends it.
    ///
    /// Returns `None` without touching the id counter when `files` is empty.
    pub fn append<'a>(
        &mut self,
        message: &str,
        files: impl IntoIterator<Item = &'a WorkingFile>,
    ) -> Option<CommitId> {
        let snapshots: Vec<_> = files.into_iter().map(WorkingFile::snapshot).collect();
        if snapshots.is_empty() {
            return None;
        }
        let id = self.next_id;
        let commit = Commit::new(id, message, Local::now(), snapshots);
        log::debug!("appending commit {} with {} file(s)", id, commit.len());
        self.commits.push(commit);
        self.next_id = id.next();
        Some(id)
    }

    pub fn find(&self, id: CommitId) -> Option<&Commit> {
        // ids are dense and start at 1, so the position is known
        let index = usize::try_from(id.get()).ok()?.checked_sub(1)?;
        self.commits.get(index).filter(|c| c.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Commit> {
        self.commits.iter()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Commit;
    type IntoIter = std::slice::Iter<'a, Commit>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
fn dirty(name: &str, content: &[u8]) -> WorkingFile {
    let mut file = WorkingFile::new(name, Vec::new());
    file.stage(content.to_vec());
    file.commit_apply();
    file
}

#[test]
fn test_ids_count_up_from_one() {
    let mut history = History::new();
    let a = dirty("a.txt", b"a");
    for k in 1..=3u64 {
        assert_eq!(history.append("m", [&a]), Some(CommitId::from(k)));
    }
    assert_eq!(history.len(), 3);
    assert_eq!(history.next_id(), CommitId::from(4));
}

#[test]
fn test_empty_append_is_a_no_op() {
    let mut history = History::new();
    assert_eq!(history.append("empty", std::iter::empty::<&WorkingFile>()), None);
    assert!(history.is_empty());
    assert_eq!(history.next_id(), CommitId::FIRST);
}

#[test]
fn test_find() {
    let mut history = History::new();
    let a = dirty("a.txt", b"a");
    let id = history.append("first", [&a]).unwrap();
    assert_eq!(history.find(id).map(Commit::message), Some("first"));
    assert!(history.find(CommitId::from(0)).is_none());
    assert!(history.find(CommitId::from(2)).is_none());
}

#[test]
fn test_iteration_is_restartable() {
    let mut history = History::new();
    let a = dirty("a.txt", b"a");
    history.append("one", [&a]);
    history.append("two", [&a]);
    let first: Vec<_> = history.iter().map(Commit::message).collect();
    let second: Vec<_> = (&history).into_iter().map(Commit::message).collect();
    assert_eq!(first, vec!["one", "two"]);
    assert_eq!(first, second);
}
