use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

pub mod directory;
pub mod in_memory;

/// Where working files are read from and persisted to.
///
/// Content is an opaque blob, and `name` is handed through untouched.
pub trait ContentStore {
    /// Reads the current content of `name`, or `None` if it does not exist.
    fn load(&self, name: &str) -> std::io::Result<Option<Vec<u8>>>;

    /// Replaces the content of `name`, creating it if needed.
    fn save(&mut self, name: &str, content: &[u8]) -> std::io::Result<()>;
}

/// Joins `name` onto `root`, refusing names that would resolve outside of it
/// (absolute paths, `..`, or nothing at all).
pub fn confined_path(root: &Path, name: &str) -> std::io::Result<PathBuf> {
    let relative = Path::new(name);
    let inside = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    let names_something = relative
        .components()
        .any(|c| matches!(c, Component::Normal(_)));
    if !inside || !names_something {
        return Err(std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("file name {:?} leaves the directory", name),
        ));
    }
    Ok(root.join(relative))
}

#[test]
fn test_confined_path() {
    let root = Path::new("/work");
    assert_eq!(
        confined_path(root, "a.txt").unwrap(),
        PathBuf::from("/work/a.txt")
    );
    assert_eq!(
        confined_path(root, "sub/./b.txt").unwrap(),
        PathBuf::from("/work/sub/./b.txt")
    );
    for bad in ["../x", "sub/../../x", "/etc/passwd", "", "."] {
        let err = confined_path(root, bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "{:?}", bad);
    }
}
