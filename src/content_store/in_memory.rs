use std::collections::BTreeMap;

use super::ContentStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    files: BTreeMap<String, Vec<u8>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, name: &str, content: &[u8]) -> Self {
        self.files.insert(name.to_string(), Vec::from(content));
        self
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }
}

impl ContentStore for InMemoryContentStore {
    fn load(&self, name: &str) -> std::io::Result<Option<Vec<u8>>> {
        Ok(self.files.get(name).cloned())
    }

    fn save(&mut self, name: &str, content: &[u8]) -> std::io::Result<()> {
        self.files.insert(name.to_string(), Vec::from(content));
        Ok(())
    }
}

#[test]
fn test_in_memory_content_store() {
    let mut store = InMemoryContentStore::new().with_file("a.txt", b"hello");
    assert_eq!(store.load("a.txt").unwrap(), Some(b"hello".to_vec()));
    assert_eq!(store.load("b.txt").unwrap(), None);
    store.save("b.txt", b"new").unwrap();
    assert_eq!(store.get("b.txt"), Some(&b"new"[..]));
}
