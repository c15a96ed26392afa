use std::fmt;

use derive_more::{Display, From};

use crate::commit::CommitId;

pub type Result<T> = std::result::Result<T, Error>;

/// One file that could not be written during a multi-file operation.
#[derive(Debug, Display)]
#[display(fmt = "{} ({}): {}", name, stage, error)]
pub struct FileFailure {
    pub name: String,
    pub stage: Stage,
    pub error: std::io::Error,
}

/// Which write a [`FileFailure`] happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    #[display(fmt = "archive")]
    Archive,
    #[display(fmt = "persist")]
    Persist,
    /// Undoing an earlier write of the same operation.
    #[display(fmt = "rollback")]
    Rollback,
}

#[derive(Debug, From)]
pub enum Error {
    #[from]
    Io(std::io::Error),
    #[from]
    Serde(serde_json::Error),
    CommitNotFound(CommitId),
    /// The name is not in the working set.
    FileNotFound(String),
    /// The name does not exist in the content store.
    NotOnDisk(String),
    AlreadyTracked(String),
    /// Nothing was committed. Every listed write failed; the others were
    /// rolled back unless a [`Stage::Rollback`] failure says otherwise.
    CommitFailed(Vec<FileFailure>),
    CheckoutFailed(CommitId, Vec<FileFailure>),
    /// A state the repository should never reach.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "serialization error: {}", err),
            Error::CommitNotFound(id) => write!(f, "Commit ID {} not found!", id),
            Error::FileNotFound(name) => {
                write!(f, "File {} not found in working directory!", name)
            }
            Error::NotOnDisk(name) => write!(f, "File {} does not exist on disk.", name),
            Error::AlreadyTracked(name) => write!(f, "File {} is already tracked.", name),
            Error::CommitFailed(failures) => {
                if failures.iter().any(|failure| failure.stage == Stage::Rollback) {
                    write!(
                        f,
                        "Commit aborted, but rollback was incomplete; \
                         some files on disk may hold the new content:"
                    )?;
                } else {
                    write!(f, "Commit aborted, nothing was recorded:")?;
                }
                write_failures(f, failures)
            }
            Error::CheckoutFailed(id, failures) => {
                write!(f, "Checkout of commit {} failed:", id)?;
                write_failures(f, failures)
            }
            Error::Internal(what) => write!(f, "internal error: {}", what),
        }
    }
}

fn write_failures(f: &mut fmt::Formatter<'_>, failures: &[FileFailure]) -> fmt::Result {
    for failure in failures {
        write!(f, "\n  {}", failure)?;
    }
    Ok(())
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            _ => None,
        }
    }
}

#[test]
fn test_messages() {
    assert_eq!(
        Error::CommitNotFound(CommitId::from(7)).to_string(),
        "Commit ID 7 not found!"
    );
    let err = Error::CommitFailed(vec![FileFailure {
        name: String::from("a.txt"),
        stage: Stage::Persist,
        error: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    }]);
    assert_eq!(
        err.to_string(),
        "Commit aborted, nothing was recorded:\n  a.txt (persist): denied"
    );
}

#[test]
fn test_internal_message() {
    let err = Error::Internal(String::from("commit 1 had no files to freeze"));
    assert_eq!(err.to_string(), "internal error: commit 1 had no files to freeze");
}

#[test]
fn test_from_io() {
    let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_rollback_failures_change_the_message() {
    let err = Error::CommitFailed(vec![
        FileFailure {
            name: String::from("b.txt"),
            stage: Stage::Persist,
            error: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        },
        FileFailure {
            name: String::from("a.txt"),
            stage: Stage::Rollback,
            error: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        },
    ]);
    let shown = err.to_string();
    assert!(shown.starts_with("Commit aborted, but rollback was incomplete"));
    assert!(shown.ends_with("\n  a.txt (rollback): denied"));
}
