use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use derive_more::{Display, From};
use serde::Serialize;

use crate::snapshot::Snapshot;

/// The sequence number of a [`Commit`]. The first commit is `1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize,
)]
pub struct CommitId(u64);

impl CommitId {
    pub const FIRST: CommitId = CommitId(1);

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> CommitId {
        CommitId(self.0 + 1)
    }
}

impl std::str::FromStr for CommitId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CommitId)
    }
}

/// An immutable, numbered group of file [`Snapshot`]s.
///
/// Snapshots are keyed by file name in a [`BTreeMap`], so every walk over
/// them (display, archive layout, checkout) is in lexicographic order.
#[derive(Debug, Clone, Serialize)]
pub struct Commit {
    id: CommitId,
    message: String,
    timestamp: DateTime<Local>,
    snapshots: BTreeMap<String, Snapshot>,
}

impl Commit {
    pub fn new(
        id: CommitId,
        message: impl Into<String>,
        timestamp: DateTime<Local>,
        snapshots: impl IntoIterator<Item = Snapshot>,
    ) -> Self {
        let snapshots = snapshots
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();
        Self {
            id,
            message: message.into(),
            timestamp,
            snapshots,
        }
    }

    pub fn id(&self) -> CommitId {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn snapshot(&self, name: &str) -> Option<&Snapshot> {
        self.snapshots.get(name)
    }

    /// The snapshots in file name order.
    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.values()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl std::fmt::Display for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Commit {}: {} at {}",
            self.id,
            self.message,
            self.timestamp.format("%a %b %e %H:%M:%S %Y")
        )?;
        for snapshot in self.snapshots.values() {
            writeln!(f, "  {}", snapshot)?;
        }
        Ok(())
    }
}

#[test]
fn test_snapshots_are_name_ordered() {
    let commit = Commit::new(
        CommitId::FIRST,
        "first",
        Local::now(),
        vec![
            Snapshot::new("b.txt", b"2".to_vec()),
            Snapshot::new("a.txt", b"1".to_vec()),
        ],
    );
    let names: Vec<&str> = commit.snapshots().map(|s| s.name()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    let shown = commit.to_string();
    let a = shown.find("a.txt").unwrap();
    let b = shown.find("b.txt").unwrap();
    assert!(a < b);
    assert!(shown.starts_with("Commit 1: first at "));
}

#[test]
fn test_commit_id_parse_and_next() {
    let id: CommitId = " 3 ".parse().unwrap();
    assert_eq!(id, CommitId::from(3));
    assert_eq!(id.next().get(), 4);
    assert!("x".parse::<CommitId>().is_err());
}
