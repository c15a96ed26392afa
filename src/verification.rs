use std::fmt;

use crate::{commit::CommitId, content_id::ContentId};

/// What is wrong with one archived entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Missing,
    Mismatch { expected: ContentId, actual: ContentId },
}

/// The result of checking a commit's archive entries against its snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub commit: CommitId,
    pub checked: usize,
    pub problems: Vec<(String, Problem)>,
}

impl Verification {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(
                f,
                "Commit {}: {} archived file(s) verified.",
                self.commit, self.checked
            );
        }
        write!(
            f,
            "Commit {}: {} of {} archived file(s) damaged:",
            self.commit,
            self.problems.len(),
            self.checked
        )?;
        for (name, problem) in &self.problems {
            match problem {
                Problem::Missing => write!(f, "\n  {}: missing", name)?,
                Problem::Mismatch { expected, actual } => write!(
                    f,
                    "\n  {}: expected {}, found {}",
                    name,
                    expected.short(12),
                    actual.short(12)
                )?,
            }
        }
        Ok(())
    }
}

#[test]
fn test_display() {
    let ok = Verification {
        commit: CommitId::FIRST,
        checked: 2,
        problems: vec![],
    };
    assert_eq!(ok.to_string(), "Commit 1: 2 archived file(s) verified.");
    let bad = Verification {
        problems: vec![(String::from("a.txt"), Problem::Missing)],
        ..ok
    };
    assert!(!bad.is_ok());
    assert_eq!(
        bad.to_string(),
        "Commit 1: 1 of 2 archived file(s) damaged:\n  a.txt: missing"
    );
}
