use std::{
    fs::{create_dir_all, File},
    io::{ErrorKind, Read, Write},
    path::PathBuf,
};

use super::{confined_path, ContentStore};

/// A [`ContentStore`] backed by the files under a working directory.
#[derive(Debug, Clone)]
pub struct DirectoryContentStore {
    root: PathBuf,
}

impl DirectoryContentStore {
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        if !root.try_exists()? {
            log::info!("creating working directory: {:?}", root);
            create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl ContentStore for DirectoryContentStore {
    fn load(&self, name: &str) -> std::io::Result<Option<Vec<u8>>> {
        let path = confined_path(&self.root, name)?;
        log::info!("loading {:?}", path);
        match File::options().read(true).open(&path) {
            Ok(mut f) => {
                let mut v = Vec::new();
                f.read_to_end(&mut v)?;
                Ok(Some(v))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&mut self, name: &str, content: &[u8]) -> std::io::Result<()> {
        let path = confined_path(&self.root, name)?;
        log::info!("saving {} byte(s) to {:?}", content.len(), path);
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        let mut f = File::options()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        f.write_all(content)?;
        Ok(())
    }
}

#[test]
fn test_directory_content_store() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut store = DirectoryContentStore::new(tempdir.path().into()).unwrap();
    assert_eq!(store.load("a.txt").unwrap(), None);
    store.save("a.txt", b"hello, world").unwrap();
    store.save("a.txt", b"bye").unwrap();
    assert_eq!(store.load("a.txt").unwrap(), Some(b"bye".to_vec()));
    assert_eq!(
        std::fs::read(tempdir.path().join("a.txt")).unwrap(),
        b"bye".to_vec()
    );
}

#[test]
fn test_names_stay_under_root() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut store = DirectoryContentStore::new(tempdir.path().join("work")).unwrap();
    assert_eq!(
        store.save("../outside.txt", b"x").unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
    assert!(!tempdir.path().join("outside.txt").exists());
    assert!(store.load("../outside.txt").is_err());
}
