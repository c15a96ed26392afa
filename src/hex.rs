use std::fmt::Display;

use serde::{Serialize, Serializer};

/// A valid hexadecimal encoding of binary data.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Hex(String);

impl Serialize for Hex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'a> From<&'a [u8]> for Hex {
    fn from(bytes: &'a [u8]) -> Self {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut out = String::with_capacity(bytes.len() * 2);
        for &b in bytes {
            out.push(DIGITS[(b >> 4) as usize] as char);
            out.push(DIGITS[(b & 0x0f) as usize] as char);
        }
        Hex(out)
    }
}

#[test]
fn test_hex_encoding() {
    let example: &[u8] = &[0x00, 0x0f, 0xa5, 0xff];
    assert_eq!(Hex::from(example).to_string(), "000fa5ff");
}

#[test]
fn test_hex_serialize() {
    let example: &[u8] = b"hi";
    let json = serde_json::to_string(&Hex::from(example)).unwrap();
    assert_eq!(json, "\"6869\"");
}
