use std::fmt::Display;

use serde::Serialize;

use crate::content_id::ContentId;

/// The frozen content of one file as it was committed.
///
/// A [`Snapshot`] owns its own copy of the bytes, so nothing done to the
/// working file afterwards can reach it.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
pub struct Snapshot {
    name: String,
    #[serde(skip)]
    content: Vec<u8>,
    id: ContentId,
}

impl Snapshot {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        let id = ContentId::from(&content);
        Self {
            name: name.into(),
            content,
            id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn id(&self) -> ContentId {
        self.id
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.name,
            self.id.short(12),
            String::from_utf8_lossy(&self.content)
        )
    }
}

#[test]
fn test_snapshot_owns_its_bytes() {
    let mut source = b"hi".to_vec();
    let snapshot = Snapshot::new("a.txt", source.clone());
    source.clear();
    assert_eq!(snapshot.content(), b"hi");
    assert_eq!(snapshot.id(), ContentId::from(&b"hi"[..]));
}

#[test]
fn test_snapshot_display() {
    let snapshot = Snapshot::new("a.txt", b"hi".to_vec());
    let shown = snapshot.to_string();
    assert!(shown.starts_with("a.txt ["));
    assert!(shown.ends_with("]: hi"));
}
