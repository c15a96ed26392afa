use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::{
    archive::{directory::DirectoryArchive, ArchiveSink},
    commit::{Commit, CommitId},
    config::Config,
    content_id::ContentId,
    content_store::{directory::DirectoryContentStore, ContentStore},
    error::{Error, FileFailure, Result, Stage},
    history::History,
    verification::{Problem, Verification},
    working_file::WorkingFile,
};

/// What a successful command did, phrased for the person who ran it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(String),
    Created(String),
    Edited(String),
    /// `warnings` lists archive problems that did not stop the commit.
    Committed {
        id: CommitId,
        files: Vec<String>,
        warnings: Vec<String>,
    },
    /// No staged file was dirty. History and the id counter are unchanged.
    NothingToCommit,
    CheckedOut { id: CommitId, files: Vec<String> },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Added(name) => write!(f, "Added file to staging: {}", name),
            Outcome::Created(name) => write!(f, "File {} created.", name),
            Outcome::Edited(name) => write!(
                f,
                "{} updated in memory (not saved to disk). \
                 Use 'commit <msg>' to save these changes permanently.",
                name
            ),
            Outcome::Committed {
                id,
                files,
                warnings,
            } => {
                write!(
                    f,
                    "Commit {} done! {} file(s) archived and saved: {}",
                    id,
                    files.len(),
                    files.join(", ")
                )?;
                for warning in warnings {
                    write!(f, "\n  warning: {}", warning)?;
                }
                Ok(())
            }
            Outcome::NothingToCommit => {
                write!(f, "No edited files to commit! Edit files first.")
            }
            Outcome::CheckedOut { id, files } => write!(
                f,
                "Checked out commit {}, {} file(s) restored on disk.",
                id,
                files.len()
            ),
        }
    }
}

/// The staging area and commit history over a working set of files.
///
/// Every file in the working set is keyed by name. The staging set holds the
/// names eligible for the next commit; only the dirty ones are committed.
pub struct Repository<S, A> {
    store: S,
    archive: A,
    working: BTreeMap<String, WorkingFile>,
    staged: BTreeSet<String>,
    history: History,
    keep_archive: bool,
}

impl Repository<DirectoryContentStore, DirectoryArchive> {
    /// Opens a repository over `config.working_root`, creating the archive
    /// root if it does not exist yet.
    pub fn open(config: &Config) -> Result<Self> {
        let store = DirectoryContentStore::new(config.working_root.clone())?;
        let archive = DirectoryArchive::init(config.archive_root())?;
        Ok(Self::new(store, archive).keep_archive(config.keep_archive))
    }
}

impl<S: ContentStore, A: ArchiveSink> Repository<S, A> {
    pub fn new(store: S, archive: A) -> Self {
        Self {
            store,
            archive,
            working: BTreeMap::new(),
            staged: BTreeSet::new(),
            history: History::new(),
            keep_archive: false,
        }
    }

    pub fn keep_archive(mut self, keep: bool) -> Self {
        self.keep_archive = keep;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Starts tracking `name` with its content from the store and stages it.
    ///
    /// Adding a name that is already tracked only re-stages it.
    pub fn add(&mut self, name: &str) -> Result<Outcome> {
        if !self.working.contains_key(name) {
            let content = self
                .store
                .load(name)?
                .ok_or_else(|| Error::NotOnDisk(name.to_string()))?;
            self.working
                .insert(name.to_string(), WorkingFile::new(name, content));
        }
        self.stage_name(name);
        Ok(Outcome::Added(name.to_string()))
    }

    /// Creates `name` as an empty file in the store and tracks it.
    pub fn create(&mut self, name: &str) -> Result<Outcome> {
        if self.working.contains_key(name) {
            return Err(Error::AlreadyTracked(name.to_string()));
        }
        self.store.save(name, &[])?;
        self.working
            .insert(name.to_string(), WorkingFile::new(name, Vec::new()));
        self.stage_name(name);
        Ok(Outcome::Created(name.to_string()))
    }

    /// Stages new content for a tracked file. Nothing is written to disk.
    pub fn edit(&mut self, name: &str, content: impl Into<Vec<u8>>) -> Result<Outcome> {
        let file = self
            .working
            .get_mut(name)
            .ok_or_else(|| Error::FileNotFound(name.to_string()))?;
        file.stage(content.into());
        log::debug!("staged {} byte(s) for {}", file.staged_content().len(), name);
        self.stage_name(name);
        Ok(Outcome::Edited(name.to_string()))
    }

    fn stage_name(&mut self, name: &str) {
        if self.staged.insert(name.to_string()) {
            log::debug!("added {} to staging", name);
        }
    }

    /// Commits every staged file that is dirty.
    ///
    /// Each of those files is archived under the new commit id and persisted
    /// to the store. If any write fails, the files that were persisted get
    /// back the content they had on disk beforehand, the archive of the commit
    /// is discarded, and [`Error::CommitFailed`] lists the failures, including
    /// any part of the rollback that failed. No working file, history entry or
    /// id is consumed.
    pub fn commit(&mut self, message: &str) -> Result<Outcome> {
        let names: Vec<String> = self
            .staged
            .iter()
            .filter(|name| self.working.get(*name).map_or(false, WorkingFile::is_dirty))
            .cloned()
            .collect();
        if names.is_empty() {
            log::info!("nothing to commit");
            return Ok(Outcome::NothingToCommit);
        }

        let id = self.history.next_id();
        let mut failures = Vec::new();
        let mut persisted = Vec::new();
        for name in &names {
            let content = self.working[name].staged_content();
            if let Err(error) = self.archive.write_entry(id, name, content) {
                failures.push(FileFailure {
                    name: name.clone(),
                    stage: Stage::Archive,
                    error,
                });
            }
            let before = match self.store.load(name) {
                Ok(before) => before,
                Err(error) => {
                    failures.push(FileFailure {
                        name: name.clone(),
                        stage: Stage::Persist,
                        error,
                    });
                    continue;
                }
            };
            match self.store.save(name, content) {
                Ok(()) => persisted.push((name, before)),
                Err(error) => failures.push(FileFailure {
                    name: name.clone(),
                    stage: Stage::Persist,
                    error,
                }),
            }
        }

        if !failures.is_empty() {
            log::warn!("commit {} failed for {} file(s), rolling back", id, failures.len());
            for (name, before) in persisted {
                // a file that was not on disk gets its last committed content
                let restore = before
                    .as_deref()
                    .unwrap_or_else(|| self.working[name].committed_content());
                if let Err(error) = self.store.save(name, restore) {
                    log::error!("could not restore {} after failed commit: {}", name, error);
                    failures.push(FileFailure {
                        name: name.clone(),
                        stage: Stage::Rollback,
                        error,
                    });
                }
            }
            if let Err(error) = self.archive.discard(id) {
                log::error!("could not discard archive of commit {}: {}", id, error);
                failures.push(FileFailure {
                    name: format!("commit_{}", id),
                    stage: Stage::Rollback,
                    error,
                });
            }
            return Err(Error::CommitFailed(failures));
        }

        for name in &names {
            if let Some(file) = self.working.get_mut(name) {
                file.commit_apply();
            }
        }
        let working = &self.working;
        let id = self
            .history
            .append(message, names.iter().filter_map(|name| working.get(name)))
            .ok_or_else(|| Error::Internal(format!("commit {} had no files to freeze", id)))?;

        let mut warnings = Vec::new();
        if let Some(commit) = self.history.find(id) {
            if let Err(err) = self.archive.write_manifest(commit) {
                log::warn!("could not write manifest for commit {}: {}", id, err);
                warnings.push(format!("manifest of commit {} not written: {}", id, err));
            }
        }
        for name in &names {
            self.staged.remove(name);
        }
        log::info!("committed {} as {}", names.join(", "), id);
        Ok(Outcome::Committed {
            id,
            files: names,
            warnings,
        })
    }

    /// All commits, oldest first.
    pub fn log(&self) -> impl Iterator<Item = &Commit> {
        self.history.iter()
    }

    /// [`Repository::log`] as printable text.
    pub fn render_log(&self) -> String {
        if self.history.is_empty() {
            return String::from("No commits yet.\n");
        }
        let mut out = String::new();
        for commit in self.log() {
            out.push_str(&commit.to_string());
            out.push_str("--------------------\n");
        }
        out
    }

    /// Replaces the working set with the files of commit `id` and writes
    /// their content to the store.
    ///
    /// Content comes from the commit alone, never from the live working set.
    /// Files absent from the commit leave the working set, and every pending
    /// staged edit is dropped. If a write fails the working set is left as it
    /// was.
    pub fn checkout(&mut self, id: CommitId) -> Result<Outcome> {
        let commit = self.history.find(id).ok_or(Error::CommitNotFound(id))?;

        let mut failures = Vec::new();
        for snapshot in commit.snapshots() {
            if let Err(error) = self.store.save(snapshot.name(), snapshot.content()) {
                failures.push(FileFailure {
                    name: snapshot.name().to_string(),
                    stage: Stage::Persist,
                    error,
                });
            }
        }
        if !failures.is_empty() {
            return Err(Error::CheckoutFailed(id, failures));
        }

        let mut previous = std::mem::take(&mut self.working);
        for snapshot in commit.snapshots() {
            let mut file = previous
                .remove(snapshot.name())
                .unwrap_or_else(|| WorkingFile::from(snapshot));
            file.restore(snapshot.content().to_vec());
            self.working.insert(snapshot.name().to_string(), file);
        }
        if !previous.is_empty() {
            log::debug!("dropped {} file(s) from the working set", previous.len());
        }
        self.staged.clear();
        log::info!("checked out commit {}", id);
        Ok(Outcome::CheckedOut {
            id,
            files: self.working.keys().cloned().collect(),
        })
    }

    /// Checks that every archived entry of commit `id` still matches its
    /// snapshot.
    pub fn verify(&self, id: CommitId) -> Result<Verification> {
        let commit = self.history.find(id).ok_or(Error::CommitNotFound(id))?;
        let mut problems = Vec::new();
        for snapshot in commit.snapshots() {
            match self.archive.read_entry(id, snapshot.name())? {
                None => problems.push((snapshot.name().to_string(), Problem::Missing)),
                Some(bytes) => {
                    let actual = ContentId::from(&bytes);
                    if actual != snapshot.id() {
                        problems.push((
                            snapshot.name().to_string(),
                            Problem::Mismatch {
                                expected: snapshot.id(),
                                actual,
                            },
                        ));
                    }
                }
            }
        }
        Ok(Verification {
            commit: id,
            checked: commit.len(),
            problems,
        })
    }

    /// The working set in name order.
    pub fn working_files(&self) -> impl Iterator<Item = &WorkingFile> {
        self.working.values()
    }

    pub fn working_file(&self, name: &str) -> Option<&WorkingFile> {
        self.working.get(name)
    }

    /// The staged files in name order.
    pub fn staged_files(&self) -> impl Iterator<Item = &WorkingFile> {
        self.staged.iter().filter_map(|name| self.working.get(name))
    }

    /// Removes the archive unless it was asked to be kept.
    pub fn close(mut self) -> Result<()> {
        if !self.keep_archive {
            self.archive.teardown()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, io};

    use super::*;
    use crate::{
        archive::in_memory::InMemoryArchive, content_store::in_memory::InMemoryContentStore,
    };

    /// Refuses to save the names in `refuse`, and every name once
    /// `saves_left` runs out.
    #[derive(Default)]
    struct FailingStore {
        inner: InMemoryContentStore,
        refuse: BTreeSet<String>,
        saves_left: Option<usize>,
    }

    impl ContentStore for FailingStore {
        fn load(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
            self.inner.load(name)
        }

        fn save(&mut self, name: &str, content: &[u8]) -> io::Result<()> {
            if self.refuse.contains(name) || self.saves_left == Some(0) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            if let Some(left) = self.saves_left.as_mut() {
                *left -= 1;
            }
            self.inner.save(name, content)
        }
    }

    /// An [`InMemoryArchive`] whose writes can be made to fail.
    #[derive(Default)]
    struct FlakyArchive {
        inner: InMemoryArchive,
        refuse: BTreeSet<String>,
        fail_manifest: bool,
        fail_discard: bool,
    }

    impl ArchiveSink for FlakyArchive {
        fn write_entry(
            &mut self,
            commit: CommitId,
            name: &str,
            content: &[u8],
        ) -> io::Result<()> {
            if self.refuse.contains(name) {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.inner.write_entry(commit, name, content)
        }

        fn write_manifest(&mut self, commit: &Commit) -> Result<()> {
            if self.fail_manifest {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
            }
            self.inner.write_manifest(commit)
        }

        fn read_entry(&self, commit: CommitId, name: &str) -> io::Result<Option<Vec<u8>>> {
            self.inner.read_entry(commit, name)
        }

        fn discard(&mut self, commit: CommitId) -> io::Result<()> {
            if self.fail_discard {
                return Err(io::Error::new(io::ErrorKind::Other, "busy"));
            }
            self.inner.discard(commit)
        }

        fn teardown(&mut self) -> io::Result<()> {
            self.inner.teardown()
        }
    }

    fn two_dirty_files<A: ArchiveSink>(
        store: FailingStore,
        archive: A,
    ) -> Repository<FailingStore, A> {
        let mut repo = Repository::new(store, archive);
        repo.add("a.txt").unwrap();
        repo.add("b.txt").unwrap();
        repo.edit("a.txt", "a1").unwrap();
        repo.edit("b.txt", "b1").unwrap();
        repo
    }

    fn files_ab() -> InMemoryContentStore {
        InMemoryContentStore::new()
            .with_file("a.txt", b"a")
            .with_file("b.txt", b"b")
    }

    fn repo(files: &[(&str, &str)]) -> Repository<InMemoryContentStore, InMemoryArchive> {
        let store = files
            .iter()
            .fold(InMemoryContentStore::new(), |s, (n, c)| s.with_file(n, c.as_bytes()));
        Repository::new(store, InMemoryArchive::new())
    }

    fn committed_id(outcome: Outcome) -> CommitId {
        match outcome {
            Outcome::Committed { id, .. } => id,
            other => panic!("expected a commit, got {:?}", other),
        }
    }

    #[test]
    fn test_first_commit_and_checkout() {
        let mut repo = repo(&[("a.txt", "hello")]);
        repo.add("a.txt").unwrap();
        repo.edit("a.txt", "hi").unwrap();
        let id = committed_id(repo.commit("first").unwrap());
        assert_eq!(id, CommitId::FIRST);
        assert_eq!(repo.store().get("a.txt"), Some(&b"hi"[..]));
        assert_eq!(repo.archive().names(id), vec!["a.txt"]);
        assert!(repo.archive().manifest(id).unwrap().contains("\"first\""));

        let log = repo.render_log();
        assert!(log.starts_with("Commit 1: first at "));
        assert!(log.contains("a.txt ["));
        assert!(log.contains("]: hi\n"));

        repo.edit("a.txt", "bye").unwrap();
        repo.checkout(id).unwrap();
        assert_eq!(repo.store().get("a.txt"), Some(&b"hi"[..]));
        let file = repo.working_file("a.txt").unwrap();
        assert_eq!(file.staged_content(), b"hi");
        assert!(!file.is_dirty());
        assert_eq!(repo.commit("again").unwrap(), Outcome::NothingToCommit);
    }

    #[test]
    fn test_nothing_to_commit() {
        let mut repo = repo(&[]);
        assert_eq!(repo.commit("empty").unwrap(), Outcome::NothingToCommit);
        assert!(repo.history().is_empty());
        assert_eq!(repo.history().next_id(), CommitId::FIRST);
        assert_eq!(repo.render_log(), "No commits yet.\n");
    }

    #[test]
    fn test_added_but_clean_is_not_committed() {
        let mut repo = repo(&[("a.txt", "hello")]);
        repo.add("a.txt").unwrap();
        assert_eq!(repo.commit("clean").unwrap(), Outcome::NothingToCommit);
        assert_eq!(repo.staged_files().count(), 1);
    }

    #[test]
    fn test_edit_to_same_content_still_commits() {
        let mut repo = repo(&[("a.txt", "hello")]);
        repo.add("a.txt").unwrap();
        repo.edit("a.txt", "hello").unwrap();
        assert_eq!(committed_id(repo.commit("same").unwrap()), CommitId::FIRST);
    }

    #[test]
    fn test_ids_increase_by_one() {
        let mut repo = repo(&[("a.txt", "")]);
        repo.add("a.txt").unwrap();
        for k in 1..=4u64 {
            repo.edit("a.txt", format!("v{}", k)).unwrap();
            assert_eq!(committed_id(repo.commit("m").unwrap()), CommitId::from(k));
            assert_eq!(repo.commit("noop").unwrap(), Outcome::NothingToCommit);
        }
        assert_eq!(repo.history().len(), 4);
    }

    #[test]
    fn test_commits_are_frozen() {
        let mut repo = repo(&[("a.txt", "")]);
        repo.add("a.txt").unwrap();
        repo.edit("a.txt", "one").unwrap();
        let first = committed_id(repo.commit("one").unwrap());
        repo.edit("a.txt", "two").unwrap();
        repo.commit("two").unwrap();
        repo.edit("a.txt", "three").unwrap();
        let snapshot = repo.history().find(first).unwrap().snapshot("a.txt").unwrap();
        assert_eq!(snapshot.content(), b"one");
    }

    #[test]
    fn test_commit_clears_dirty_and_unstages_only_committed() {
        let mut repo = repo(&[("a.txt", "a"), ("b.txt", "b")]);
        repo.add("a.txt").unwrap();
        repo.add("b.txt").unwrap();
        repo.edit("b.txt", "bb").unwrap();
        match repo.commit("b only").unwrap() {
            Outcome::Committed { files, .. } => assert_eq!(files, vec!["b.txt"]),
            other => panic!("unexpected {:?}", other),
        }
        let b = repo.working_file("b.txt").unwrap();
        assert!(!b.is_dirty());
        assert_eq!(b.committed_content(), b"bb");
        let staged: Vec<_> = repo.staged_files().map(WorkingFile::name).collect();
        assert_eq!(staged, vec!["a.txt"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut repo = repo(&[("a.txt", "hello")]);
        repo.add("a.txt").unwrap();
        repo.edit("a.txt", "hi").unwrap();
        repo.add("a.txt").unwrap();
        assert_eq!(repo.staged_files().count(), 1);
        assert_eq!(repo.working_files().count(), 1);
        assert!(repo.working_file("a.txt").unwrap().is_dirty());
    }

    #[test]
    fn test_missing_files() {
        let mut repo = repo(&[]);
        assert!(matches!(repo.add("nope.txt"), Err(Error::NotOnDisk(_))));
        assert!(matches!(repo.edit("nope.txt", "x"), Err(Error::FileNotFound(_))));
        assert!(matches!(
            repo.checkout(CommitId::from(3)),
            Err(Error::CommitNotFound(_))
        ));
        repo.create("new.txt").unwrap();
        assert_eq!(repo.store().get("new.txt"), Some(&b""[..]));
        assert!(matches!(repo.create("new.txt"), Err(Error::AlreadyTracked(_))));
        repo.edit("new.txt", "content").unwrap();
        assert_eq!(committed_id(repo.commit("new").unwrap()), CommitId::FIRST);
    }

    #[test]
    fn test_checkout_replaces_working_set() {
        let mut repo = repo(&[("a.txt", "a"), ("b.txt", "b")]);
        repo.add("a.txt").unwrap();
        repo.edit("a.txt", "a1").unwrap();
        let first = committed_id(repo.commit("a").unwrap());
        repo.add("b.txt").unwrap();
        repo.edit("b.txt", "b1").unwrap();
        repo.edit("a.txt", "a2").unwrap();
        repo.commit("a and b").unwrap();

        repo.checkout(first).unwrap();
        let names: Vec<_> = repo.working_files().map(WorkingFile::name).collect();
        assert_eq!(names, vec!["a.txt"]);
        assert_eq!(repo.store().get("a.txt"), Some(&b"a1"[..]));
        assert!(matches!(repo.edit("b.txt", "x"), Err(Error::FileNotFound(_))));
        assert_eq!(repo.staged_files().count(), 0);
    }

    #[test]
    fn test_failed_commit_is_all_or_nothing() {
        let store = FailingStore {
            inner: files_ab(),
            ..FailingStore::default()
        };
        let mut repo = two_dirty_files(store, InMemoryArchive::new());
        repo.store.refuse.insert(String::from("b.txt"));

        match repo.commit("broken") {
            Err(Error::CommitFailed(failures)) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].name, "b.txt");
                assert_eq!(failures[0].stage, Stage::Persist);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(repo.history().is_empty());
        assert_eq!(repo.history().next_id(), CommitId::FIRST);
        assert_eq!(repo.store().inner.get("a.txt"), Some(&b"a"[..]));
        assert!(repo.archive().is_empty());
        assert!(repo.working_file("a.txt").unwrap().is_dirty());

        repo.store.refuse.clear();
        assert_eq!(committed_id(repo.commit("fixed").unwrap()), CommitId::FIRST);
        assert_eq!(repo.store().inner.get("b.txt"), Some(&b"b1"[..]));
    }

    #[test]
    fn test_failed_checkout_keeps_working_set() {
        let store = FailingStore {
            inner: InMemoryContentStore::new().with_file("a.txt", b"a"),
            ..FailingStore::default()
        };
        let mut repo = Repository::new(store, InMemoryArchive::new());
        repo.add("a.txt").unwrap();
        repo.edit("a.txt", "a1").unwrap();
        let id = committed_id(repo.commit("a").unwrap());
        repo.edit("a.txt", "a2").unwrap();
        repo.store.refuse.insert(String::from("a.txt"));
        assert!(matches!(repo.checkout(id), Err(Error::CheckoutFailed(_, _))));
        assert_eq!(repo.working_file("a.txt").unwrap().staged_content(), b"a2");
    }

    #[test]
    fn test_verify() {
        let mut repo = repo(&[("a.txt", "a")]);
        repo.add("a.txt").unwrap();
        repo.edit("a.txt", "a1").unwrap();
        let id = committed_id(repo.commit("a").unwrap());
        assert!(repo.verify(id).unwrap().is_ok());

        repo.archive.write_entry(id, "a.txt", b"tampered").unwrap();
        let report = repo.verify(id).unwrap();
        assert!(matches!(report.problems[0].1, Problem::Mismatch { .. }));

        repo.archive.discard(id).unwrap();
        let report = repo.verify(id).unwrap();
        assert_eq!(report.problems, vec![(String::from("a.txt"), Problem::Missing)]);
    }

    #[test]
    fn test_rollback_restores_what_was_on_disk() {
        let store = FailingStore {
            inner: files_ab(),
            ..FailingStore::default()
        };
        let mut repo = two_dirty_files(store, InMemoryArchive::new());
        repo.store.inner.save("a.txt", b"edited outside").unwrap();
        repo.store.refuse.insert(String::from("b.txt"));
        assert!(matches!(repo.commit("broken"), Err(Error::CommitFailed(_))));
        assert_eq!(repo.store().inner.get("a.txt"), Some(&b"edited outside"[..]));
    }

    #[test]
    fn test_failed_rollback_is_reported() {
        let store = FailingStore {
            inner: files_ab(),
            saves_left: Some(1),
            ..FailingStore::default()
        };
        let mut repo = two_dirty_files(store, InMemoryArchive::new());
        let err = repo.commit("broken").unwrap_err();
        match &err {
            Error::CommitFailed(failures) => {
                let seen: Vec<_> = failures.iter().map(|f| (f.name.as_str(), f.stage)).collect();
                assert_eq!(seen, vec![("b.txt", Stage::Persist), ("a.txt", Stage::Rollback)]);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(err.to_string().contains("rollback was incomplete"));
        assert!(repo.history().is_empty());
    }

    #[test]
    fn test_failed_discard_is_reported() {
        let archive = FlakyArchive {
            refuse: [String::from("a.txt")].into_iter().collect(),
            fail_discard: true,
            ..FlakyArchive::default()
        };
        let store = FailingStore {
            inner: files_ab(),
            ..FailingStore::default()
        };
        let mut repo = two_dirty_files(store, archive);
        match repo.commit("broken") {
            Err(Error::CommitFailed(failures)) => {
                let seen: Vec<_> = failures.iter().map(|f| (f.name.as_str(), f.stage)).collect();
                assert_eq!(
                    seen,
                    vec![("a.txt", Stage::Archive), ("commit_1", Stage::Rollback)]
                );
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(repo.store().inner.get("b.txt"), Some(&b"b"[..]));
    }

    #[test]
    fn test_manifest_failure_is_a_warning() {
        let archive = FlakyArchive {
            fail_manifest: true,
            ..FlakyArchive::default()
        };
        let store = FailingStore {
            inner: files_ab(),
            ..FailingStore::default()
        };
        let mut repo = two_dirty_files(store, archive);
        let outcome = repo.commit("both").unwrap();
        match &outcome {
            Outcome::Committed { id, warnings, .. } => {
                assert_eq!(*id, CommitId::FIRST);
                assert_eq!(warnings.len(), 1);
            }
            other => panic!("expected a commit, got {:?}", other),
        }
        assert!(outcome.to_string().contains("\n  warning: manifest of commit 1"));
        assert_eq!(repo.history().len(), 1);
        assert_eq!(repo.archive().inner.names(CommitId::FIRST), vec!["a.txt", "b.txt"]);
    }

    fn committed_on_disk(config: &Config) -> Repository<DirectoryContentStore, DirectoryArchive> {
        std::fs::write(config.working_root.join("a.txt"), "a").unwrap();
        let mut repo = Repository::open(config).unwrap();
        repo.add("a.txt").unwrap();
        repo.edit("a.txt", "a1").unwrap();
        repo.commit("a").unwrap();
        repo
    }

    #[test]
    fn test_close_removes_archive() {
        let tempdir = tempfile::tempdir().unwrap();
        let config = Config::default().with_working_root(tempdir.path());
        let repo = committed_on_disk(&config);
        assert!(config.archive_root().join("commit_1").join("a.txt").is_file());
        repo.close().unwrap();
        assert!(!config.archive_root().exists());
        assert_eq!(std::fs::read_to_string(tempdir.path().join("a.txt")).unwrap(), "a1");
    }

    #[test]
    fn test_close_keeps_archive_when_asked() {
        let tempdir = tempfile::tempdir().unwrap();
        let config = Config::default()
            .with_working_root(tempdir.path())
            .with_keep_archive(true);
        let repo = committed_on_disk(&config);
        repo.close().unwrap();
        assert!(config.archive_root().join("commit_1").join("a.txt").is_file());
        assert!(config.archive_root().join("commit_1.json").is_file());
    }

    #[test]
    fn test_manifest_named_file_keeps_its_archived_content() {
        let tempdir = tempfile::tempdir().unwrap();
        let root = tempdir.path();
        std::fs::write(root.join("manifest.json"), "user data").unwrap();
        let config = Config::default().with_working_root(root);
        let mut repo = Repository::open(&config).unwrap();
        repo.add("manifest.json").unwrap();
        repo.edit("manifest.json", "my content").unwrap();
        let id = committed_id(repo.commit("m").unwrap());
        let archived = config.archive_root().join("commit_1").join("manifest.json");
        assert_eq!(std::fs::read_to_string(archived).unwrap(), "my content");
        assert!(repo.verify(id).unwrap().is_ok());
        repo.close().unwrap();
    }
}
