use crate::hex;
use blake3::Hash;

use std::fmt::Display;

use serde::{Serialize, Serializer};

/// An identifier for a particular piece of file content.
/// Under the hood, this is a [`blake3`] hash.
///
/// It is displayed in hexadecimal format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentId(Hash);

impl ContentId {
    /// The first `n` hex characters, for compact listings.
    pub fn short(&self, n: usize) -> String {
        let s = self.to_string();
        s[..n.min(s.len())].to_string()
    }
}

impl Ord for ContentId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl PartialOrd for ContentId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b: &[u8] = self.0.as_bytes();
        write!(f, "{}", hex::Hex::from(b))
    }
}

impl Serialize for ContentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let b: &[u8] = self.0.as_bytes();
        hex::Hex::from(b).serialize(serializer)
    }
}

impl From<&Vec<u8>> for ContentId {
    fn from(vec: &Vec<u8>) -> Self {
        ContentId(blake3::hash(vec))
    }
}

impl From<&[u8]> for ContentId {
    fn from(bytes: &[u8]) -> Self {
        ContentId(blake3::hash(bytes))
    }
}

#[test]
fn test_same_content_same_id() {
    let a: &[u8] = b"hello";
    let b = Vec::from(&b"hello"[..]);
    assert_eq!(ContentId::from(a), ContentId::from(&b));
    let c: &[u8] = b"hello!";
    assert_ne!(ContentId::from(a), ContentId::from(c));
}

#[test]
fn test_display_is_hex() {
    let id = ContentId::from(&b""[..]);
    let s = id.to_string();
    assert_eq!(s.len(), 64);
    assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(id.short(8), s[..8]);
}
