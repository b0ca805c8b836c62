//! Recovers arguments from full keys, for entries whose hashers keep the encoded key.
use skey_hashing::Hasher;
use skey_types::HasherKind;
use skey_types::LengthPrefixError;
use skey_types::StorageKey;
use skey_types::Value;
use thiserror::Error;

use crate::codec::ArgumentEncoder;
use crate::codec::CodecError;
use crate::entry::StorageEntry;
use crate::shape::KeyShape;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DecodeKeyError {
    #[error("key does not belong to {0}")]
    PrefixMismatch(String),

    #[error("key {position} uses {hasher}, which does not keep the encoded key")]
    NotReversible { position: usize, hasher: HasherKind },

    #[error("key {position} is truncated: expected at least {expected} bytes, {actual} left")]
    Truncated {
        position: usize,
        expected: usize,
        actual: usize,
    },

    #[error("key {position} does not match its {hasher} digest")]
    DigestMismatch { position: usize, hasher: HasherKind },

    #[error("{0} unexpected bytes after the last key")]
    TrailingBytes(usize),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Length(#[from] LengthPrefixError),
}

pub(crate) fn decode_key_args<E: ArgumentEncoder>(
    entry: &StorageEntry<E>,
    key: &StorageKey,
) -> Result<Vec<Value>, DecodeKeyError> {
    let body = key.body();
    let mismatch = || DecodeKeyError::PrefixMismatch(entry.item().to_string());

    if let KeyShape::Raw(raw) = entry.shape() {
        return if body == raw.as_slice() {
            Ok(Vec::new())
        } else {
            Err(mismatch())
        };
    }

    let mut rest = body
        .strip_prefix(entry.base_prefix().as_slice())
        .ok_or_else(mismatch)?;

    let keys = entry.shape().keys();
    // a map key encoding to nothing leaves the base prefix bare
    if let ([(key_type, _)], true) = (keys.as_slice(), rest.is_empty()) {
        return Ok(vec![entry.encoder().decode(key_type, rest)?]);
    }

    let mut args = Vec::with_capacity(keys.len());
    for (position, (key_type, hasher)) in keys.into_iter().enumerate() {
        let (value, consumed) = decode_one(entry.encoder(), position, key_type, &hasher, rest)?;
        args.push(value);
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        return Err(DecodeKeyError::TrailingBytes(rest.len()));
    }

    Ok(args)
}

/// Decodes one hashed key segment, returning the value and the segment length.
fn decode_one<E: ArgumentEncoder>(
    encoder: &E,
    position: usize,
    key_type: &str,
    hasher: &Hasher,
    bytes: &[u8],
) -> Result<(Value, usize), DecodeKeyError> {
    if !hasher.is_reversible() {
        return Err(DecodeKeyError::NotReversible {
            position,
            hasher: hasher.kind(),
        });
    }

    let digest_len = hasher.digest_len();
    if bytes.len() < digest_len {
        return Err(DecodeKeyError::Truncated {
            position,
            expected: digest_len,
            actual: bytes.len(),
        });
    }

    let (value, consumed) = encoder.decode_prefix(key_type, &bytes[digest_len..])?;
    let segment = &bytes[..digest_len + consumed];
    if hasher.hash(&segment[digest_len..]) != segment {
        return Err(DecodeKeyError::DigestMismatch {
            position,
            hasher: hasher.kind(),
        });
    }

    Ok((value, segment.len()))
}
