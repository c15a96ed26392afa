use std::fmt::Display;

use crate::snapshot::Snapshot;

/// A tracked file with separate committed and staged content.
///
/// `dirty` is set on every [`WorkingFile::stage`], even when the new content
/// equals what was last committed, and only cleared by a commit or a restore.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct WorkingFile {
    name: String,
    committed: Vec<u8>,
    staged: Vec<u8>,
    dirty: bool,
}

impl WorkingFile {
    /// A clean file whose committed and staged content are both `content`.
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            staged: content.clone(),
            committed: content,
            dirty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn committed_content(&self) -> &[u8] {
        &self.committed
    }

    pub fn staged_content(&self) -> &[u8] {
        &self.staged
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn stage(&mut self, content: Vec<u8>) {
        self.staged = content;
        self.dirty = true;
    }

    pub fn commit_apply(&mut self) {
        self.committed = self.staged.clone();
        self.dirty = false;
    }

    /// A frozen copy of the committed content.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.name.clone(), self.committed.clone())
    }

    pub fn restore(&mut self, content: Vec<u8>) {
        self.staged = content.clone();
        self.committed = content;
        self.dirty = false;
    }
}

impl From<&Snapshot> for WorkingFile {
    fn from(snapshot: &Snapshot) -> Self {
        WorkingFile::new(snapshot.name(), snapshot.content().to_vec())
    }
}

impl Display for WorkingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = if self.dirty { "*" } else { " " };
        write!(
            f,
            "{} {}: {}",
            marker,
            self.name,
            String::from_utf8_lossy(&self.staged)
        )
    }
}

#[test]
fn test_stage_marks_dirty_even_if_unchanged() {
    let mut file = WorkingFile::new("a.txt", b"hello".to_vec());
    assert!(!file.is_dirty());
    file.stage(b"hello".to_vec());
    assert!(file.is_dirty());
}

#[test]
fn test_commit_apply_moves_staged_into_committed() {
    let mut file = WorkingFile::new("a.txt", b"hello".to_vec());
    file.stage(b"hi".to_vec());
    assert_eq!(file.committed_content(), b"hello");
    file.commit_apply();
    assert!(!file.is_dirty());
    assert_eq!(file.committed_content(), b"hi");
    assert_eq!(file.snapshot().content(), b"hi");
}

#[test]
fn test_snapshot_is_frozen() {
    let mut file = WorkingFile::new("a.txt", Vec::new());
    file.stage(b"one".to_vec());
    file.commit_apply();
    let frozen = file.snapshot();
    file.stage(b"two".to_vec());
    file.commit_apply();
    assert_eq!(frozen.content(), b"one");
}

#[test]
fn test_restore_discards_staged_edits() {
    let mut file = WorkingFile::new("a.txt", b"hello".to_vec());
    file.stage(b"bye".to_vec());
    file.restore(b"hi".to_vec());
    assert!(!file.is_dirty());
    assert_eq!(file.staged_content(), b"hi");
    assert_eq!(file.committed_content(), b"hi");
}
