//! Full entry keys: `compact_length(body) ++ body`.
use skey_hashing::Hasher;
use skey_types::StorageKey;
use skey_types::Value;
use tracing::debug;
use tracing::trace;

use crate::codec::ArgumentEncoder;
use crate::entry::StorageEntry;
use crate::error::KeyError;
use crate::shape::KeyShape;

pub(crate) fn compute_key<E: ArgumentEncoder>(
    entry: &StorageEntry<E>,
    args: &[Value],
) -> Result<StorageKey, KeyError> {
    let item = entry.item();

    let body = match entry.shape() {
        KeyShape::Raw(raw) => {
            if !args.is_empty() {
                return Err(KeyError::plain_with_arguments(item, args.len()));
            }
            raw.clone()
        },
        KeyShape::Plain => {
            if !args.is_empty() {
                return Err(KeyError::plain_with_arguments(item, args.len()));
            }
            entry.base_prefix().to_vec()
        },
        KeyShape::Map { key, hasher } => {
            let arg = match args {
                [arg] if !arg.is_null() => arg,
                _ => return Err(KeyError::missing_map_argument(item, args.len())),
            };

            let mut body = entry.base_prefix().to_vec();
            let encoded = encode_argument(entry.encoder(), key, arg)?;
            // a key type encoding to nothing addresses the prefix itself
            if !encoded.is_empty() {
                body.extend(hasher.hash(&encoded));
            }
            body
        },
        KeyShape::DoubleMap {
            key1,
            hasher1,
            key2,
            hasher2,
        } => {
            let (arg1, arg2) = match args {
                [arg1, arg2] if !arg1.is_null() && !arg2.is_null() => (arg1, arg2),
                _ => return Err(KeyError::missing_double_map_arguments(item, args.len())),
            };

            let mut body = entry.base_prefix().to_vec();
            body.extend(hash_argument(entry.encoder(), key1, hasher1, arg1)?);
            body.extend(hash_argument(entry.encoder(), key2, hasher2, arg2)?);
            body
        },
    };

    let key = StorageKey::from_body(&body);
    debug!(
        item = %item,
        shape = entry.shape().name(),
        key = %key,
        "derived storage key"
    );

    Ok(key)
}

pub(crate) fn encode_argument<E: ArgumentEncoder + ?Sized>(
    encoder: &E,
    type_name: &str,
    arg: &Value,
) -> Result<Vec<u8>, KeyError> {
    let encoded = encoder.encode(type_name, arg)?;
    trace!(
        type_name,
        encoded = hex::encode(&encoded),
        "encoded key argument"
    );
    Ok(encoded)
}

pub(crate) fn hash_argument<E: ArgumentEncoder + ?Sized>(
    encoder: &E,
    type_name: &str,
    hasher: &Hasher,
    arg: &Value,
) -> Result<Vec<u8>, KeyError> {
    Ok(hasher.hash(&encode_argument(encoder, type_name, arg)?))
}
