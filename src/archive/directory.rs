use std::{
    fs::{create_dir_all, remove_dir_all, remove_file, File},
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    commit::{Commit, CommitId},
    content_store::confined_path,
    error::Error,
};

use super::ArchiveSink;

/// A wrapper for the path of the archive directory, laid out as
/// `commit_<id>/<file name>` with the commit's metadata beside it in
/// `commit_<id>.json`, so no file name can collide with the manifest.
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    /// Opens the archive at `root`, creating the directory if it is missing.
    pub fn init(root: PathBuf) -> Result<Self, Error> {
        if !root.try_exists()? {
            log::info!("creating archive root: {:?}", root);
            create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn commit_dir(&self, commit: CommitId) -> PathBuf {
        self.root.join(format!("commit_{}", commit))
    }

    pub fn manifest_path(&self, commit: CommitId) -> PathBuf {
        self.root.join(format!("commit_{}.json", commit))
    }
}

impl ArchiveSink for DirectoryArchive {
    fn write_entry(
        &mut self,
        commit: CommitId,
        name: &str,
        content: &[u8],
    ) -> std::io::Result<()> {
        let path = confined_path(&self.commit_dir(commit), name)?;
        log::info!("archiving {} byte(s) to {:?}", content.len(), path);
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        let mut f = File::options()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        f.write_all(content)
    }

    fn write_manifest(&mut self, commit: &Commit) -> Result<(), Error> {
        write_json(commit, &self.manifest_path(commit.id()))
    }

    fn read_entry(&self, commit: CommitId, name: &str) -> std::io::Result<Option<Vec<u8>>> {
        let path = confined_path(&self.commit_dir(commit), name)?;
        match File::options().read(true).open(path) {
            Ok(mut f) => {
                let mut v = Vec::new();
                f.read_to_end(&mut v)?;
                Ok(Some(v))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn discard(&mut self, commit: CommitId) -> std::io::Result<()> {
        let dir = self.commit_dir(commit);
        if dir.try_exists()? {
            log::warn!("discarding partial archive {:?}", dir);
            remove_dir_all(dir)?;
        }
        let manifest = self.manifest_path(commit);
        if manifest.try_exists()? {
            remove_file(manifest)?;
        }
        Ok(())
    }

    fn teardown(&mut self) -> std::io::Result<()> {
        if self.root.try_exists()? {
            log::info!("removing archive root: {:?}", self.root);
            remove_dir_all(&self.root)?;
        }
        Ok(())
    }
}

fn write_json<A: Serialize>(thing: &A, path: &Path) -> Result<(), Error> {
    Ok(serde_json::to_writer_pretty(
        File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?,
        thing,
    )?)
}

#[cfg(test)]
fn sample_commit() -> Commit {
    use crate::snapshot::Snapshot;
    Commit::new(
        CommitId::FIRST,
        "first",
        chrono::Local::now(),
        vec![Snapshot::new("a.txt", b"hi".to_vec())],
    )
}

#[test]
fn test_layout() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut archive = DirectoryArchive::init(tempdir.path().join(".vcs")).unwrap();
    archive.write_entry(CommitId::FIRST, "a.txt", b"hi").unwrap();
    archive.write_manifest(&sample_commit()).unwrap();

    let dir = tempdir.path().join(".vcs").join("commit_1");
    assert_eq!(std::fs::read(dir.join("a.txt")).unwrap(), b"hi".to_vec());
    let names: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("a.txt")]);
    let manifest_path = tempdir.path().join(".vcs").join("commit_1.json");
    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(manifest_path).unwrap()).unwrap();
    assert_eq!(manifest["id"], 1);
    assert_eq!(manifest["message"], "first");
    assert!(manifest["snapshots"]["a.txt"]["id"].is_string());
}

#[test]
fn test_read_entry() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut archive = DirectoryArchive::init(tempdir.path().join(".vcs")).unwrap();
    archive.write_entry(CommitId::FIRST, "a.txt", b"hi").unwrap();
    assert_eq!(
        archive.read_entry(CommitId::FIRST, "a.txt").unwrap(),
        Some(b"hi".to_vec())
    );
    assert_eq!(archive.read_entry(CommitId::FIRST, "b.txt").unwrap(), None);
    assert_eq!(archive.read_entry(CommitId::from(2), "a.txt").unwrap(), None);
}

#[test]
fn test_discard_and_teardown() {
    let tempdir = tempfile::tempdir().unwrap();
    let root = tempdir.path().join(".vcs");
    let mut archive = DirectoryArchive::init(root.clone()).unwrap();
    archive.write_entry(CommitId::FIRST, "a.txt", b"hi").unwrap();
    archive.write_manifest(&sample_commit()).unwrap();
    archive.discard(CommitId::FIRST).unwrap();
    assert!(!archive.commit_dir(CommitId::FIRST).exists());
    assert!(!archive.manifest_path(CommitId::FIRST).exists());
    archive.discard(CommitId::FIRST).unwrap();
    archive.teardown().unwrap();
    assert!(!root.exists());
    archive.teardown().unwrap();
}

#[test]
fn test_entry_named_like_a_manifest() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut archive = DirectoryArchive::init(tempdir.path().join(".vcs")).unwrap();
    archive
        .write_entry(CommitId::FIRST, "manifest.json", b"my content")
        .unwrap();
    archive.write_manifest(&sample_commit()).unwrap();
    assert_eq!(
        archive.read_entry(CommitId::FIRST, "manifest.json").unwrap(),
        Some(b"my content".to_vec())
    );
}

#[test]
fn test_entry_names_stay_in_commit_dir() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut archive = DirectoryArchive::init(tempdir.path().join(".vcs")).unwrap();
    let err = archive
        .write_entry(CommitId::FIRST, "../escape.txt", b"x")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(!tempdir.path().join(".vcs").join("escape.txt").exists());
    assert!(archive.write_entry(CommitId::FIRST, "/abs.txt", b"x").is_err());
}
