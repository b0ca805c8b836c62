use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use parity_scale_codec::Compact;
use parity_scale_codec::Decode;
use parity_scale_codec::Encode;
use serde_with::DeserializeFromStr;
use serde_with::SerializeDisplay;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum LengthPrefixError {
    #[error("invalid compact length header: {0}")]
    Header(String),

    #[error("length header declares {declared} bytes but {actual} follow")]
    Mismatch { declared: u64, actual: usize },

    #[error("invalid hex key: {0}")]
    Hex(String),
}

/// Prepend the SCALE compact encoding of `body.len()` to `body`.
pub fn add_length_prefix(body: &[u8]) -> Vec<u8> {
    let mut bytes = Compact(body.len() as u64).encode();
    bytes.extend_from_slice(body);
    bytes
}

/// Split off the compact length header, returning the body it announces.
///
/// The header must describe exactly the remaining bytes.
pub fn strip_length_prefix(bytes: &[u8]) -> Result<&[u8], LengthPrefixError> {
    let mut body = bytes;
    let Compact(declared) = Compact::<u64>::decode(&mut body)
        .map_err(|e| LengthPrefixError::Header(e.to_string()))?;

    if declared != body.len() as u64 {
        return Err(LengthPrefixError::Mismatch {
            declared,
            actual: body.len(),
        });
    }

    Ok(body)
}

/// A storage key as handed to the node: `compact_length(body) ++ body`.
///
/// Both full entry keys and iteration prefixes use this shape.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct StorageKey {
    bytes: Vec<u8>,
    header_len: usize,
}

impl StorageKey {
    /// Builds the key by length-prefixing `body`.
    pub fn from_body(body: &[u8]) -> Self {
        let bytes = add_length_prefix(body);
        let header_len = bytes.len() - body.len();
        Self { bytes, header_len }
    }

    /// Wraps already prefixed bytes, checking the header against the body.
    pub fn from_encoded(bytes: Vec<u8>) -> Result<Self, LengthPrefixError> {
        let body_len = strip_length_prefix(&bytes)?.len();
        let header_len = bytes.len() - body_len;
        Ok(Self { bytes, header_len })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The key without its length header.
    pub fn body(&self) -> &[u8] {
        &self.bytes[self.header_len..]
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.bytes))
    }

    /// Whether every key under `other` also lives under `self`, ignoring the length headers.
    pub fn is_prefix_of(
        &self,
        other: &StorageKey,
    ) -> bool {
        other.body().starts_with(self.body())
    }
}

impl AsRef<[u8]> for StorageKey {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<StorageKey> for Vec<u8> {
    fn from(key: StorageKey) -> Self {
        key.bytes
    }
}

impl Display for StorageKey {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for StorageKey {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "KEY<{}>", self.to_hex())
    }
}

impl FromStr for StorageKey {
    type Err = LengthPrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| LengthPrefixError::Hex(e.to_string()))?;
        Self::from_encoded(bytes)
    }
}

/// Formats optional bytes for `Dbg` derived debug output.
pub fn hex_pretty(bytes: &Option<Vec<u8>>) -> String {
    bytes
        .as_ref()
        .map(|b| format!("0x{}", hex::encode(b)))
        .unwrap_or("none".to_string())
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_header_width_follows_compact_modes() {
        assert_eq!(add_length_prefix(&[0u8; 32])[..1], [0x80]);
        assert_eq!(add_length_prefix(&[0u8; 63])[..1], [0xfc]);
        // 64 needs the two byte mode: (64 << 2) | 0b01
        assert_eq!(add_length_prefix(&[0u8; 64])[..2], [0x01, 0x01]);
        assert_eq!(add_length_prefix(&[0u8; 16383])[..2], [0xfd, 0xff]);
        // 16384 needs the four byte mode: (16384 << 2) | 0b10
        assert_eq!(
            add_length_prefix(&[0u8; 16384])[..4],
            [0x02, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn test_strip_returns_declared_body() {
        for len in [0usize, 1, 32, 63, 64, 129, 16384] {
            let body: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let prefixed = add_length_prefix(&body);
            assert_eq!(strip_length_prefix(&prefixed).unwrap(), &body[..]);
        }
    }

    #[test]
    fn test_strip_rejects_wrong_length() {
        let mut prefixed = add_length_prefix(&[7u8; 4]);
        prefixed.push(7);
        assert_eq!(
            strip_length_prefix(&prefixed),
            Err(LengthPrefixError::Mismatch {
                declared: 4,
                actual: 5
            })
        );
        assert!(matches!(
            strip_length_prefix(&[]),
            Err(LengthPrefixError::Header(_))
        ));
    }

    #[test]
    fn test_storage_key_views() {
        let key = StorageKey::from_body(&hex!("deadbeef"));
        assert_eq!(key.as_bytes(), &hex!("10deadbeef"));
        assert_eq!(key.body(), &hex!("deadbeef"));
        assert_eq!(key.header_len(), 1);
        assert_eq!(key.to_string(), "0x10deadbeef");
        assert_eq!(format!("{key:?}"), "KEY<0x10deadbeef>");
    }

    #[test]
    fn test_storage_key_parses_from_hex() {
        let key: StorageKey = "0x10deadbeef".parse().unwrap();
        assert_eq!(key.body(), &hex!("deadbeef"));

        let unprefixed: StorageKey = "10deadbeef".parse().unwrap();
        assert_eq!(key, unprefixed);

        assert!(matches!(
            "0x14deadbeef".parse::<StorageKey>(),
            Err(LengthPrefixError::Mismatch { .. })
        ));
        assert!(matches!(
            "0xzz".parse::<StorageKey>(),
            Err(LengthPrefixError::Hex(_))
        ));
    }

    #[test]
    fn test_prefix_relation_ignores_headers() {
        let prefix = StorageKey::from_body(&[1u8; 32]);
        let mut body = vec![1u8; 32];
        body.extend_from_slice(&[2u8; 48]);
        let full = StorageKey::from_body(&body);

        assert_ne!(prefix.as_bytes()[0], full.as_bytes()[0]);
        assert!(prefix.is_prefix_of(&full));
        assert!(!full.is_prefix_of(&prefix));
    }

    #[test]
    fn test_storage_key_serde_is_hex_string() {
        let key = StorageKey::from_body(&hex!("0102"));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"0x080102\"");
        assert_eq!(serde_json::from_str::<StorageKey>(&json).unwrap(), key);
    }
}
