//! Prefix keys for enumerating maps, and the metadata describing their keys.
use skey_types::StorageEntryMetadata;
use skey_types::StorageEntryModifier;
use skey_types::StorageEntryType;
use skey_types::StorageKey;
use skey_types::Value;

use crate::assembler::compute_key;
use crate::assembler::hash_argument;
use crate::codec::ArgumentEncoder;
use crate::entry::StorageEntry;
use crate::error::KeyError;
use crate::shape::KeyShape;

/// The length-prefixed key under which all entries of a map live.
///
/// For a double map, `first_key` narrows the range to the entries sharing that first key.
pub(crate) fn compute_iteration_prefix<E: ArgumentEncoder>(
    entry: &StorageEntry<E>,
    first_key: Option<&Value>,
) -> Result<StorageKey, KeyError> {
    let item = entry.item();
    let first_key = first_key.filter(|arg| !arg.is_null());

    let body = match entry.shape() {
        KeyShape::Map { .. } => {
            if first_key.is_some() {
                return Err(KeyError::iteration_filter_on_map(item));
            }
            entry.base_prefix().to_vec()
        },
        KeyShape::DoubleMap { key1, hasher1, .. } => {
            let mut body = entry.base_prefix().to_vec();
            if let Some(arg) = first_key {
                body.extend(hash_argument(entry.encoder(), key1, hasher1, arg)?);
            }
            body
        },
        KeyShape::Raw(_) | KeyShape::Plain => return Err(KeyError::no_iteration_key(item)),
    };

    Ok(StorageKey::from_body(&body))
}

/// Metadata describing the keys returned by an enumeration, rather than the stored values.
///
/// The key type becomes a required plain value whose fallback is the encoded zero value.
pub(crate) fn compute_head_metadata<E: ArgumentEncoder>(
    entry: &StorageEntry<E>,
) -> Result<StorageEntryMetadata, KeyError> {
    let key_type = match entry.shape() {
        KeyShape::Map { key, .. } => key,
        KeyShape::DoubleMap { key1, .. } => key1,
        KeyShape::Raw(_) | KeyShape::Plain => {
            return Err(KeyError::no_iteration_key(entry.item()))
        },
    };

    let encoder = entry.encoder();
    let fallback = encoder.encode(key_type, &encoder.zero_value(key_type)?)?;
    let meta = entry.meta();

    Ok(StorageEntryMetadata {
        name: meta.name.clone(),
        modifier: StorageEntryModifier::Default,
        ty: StorageEntryType::Plain {
            value: key_type.clone(),
        },
        fallback,
        documentation: meta.documentation.clone(),
    })
}

/// The raw prefix bytes, without a length header.
pub(crate) fn compute_key_prefix<E: ArgumentEncoder>(
    entry: &StorageEntry<E>,
    arg: Option<&Value>,
) -> Result<Vec<u8>, KeyError> {
    let key = if entry.shape().is_iterable() {
        compute_iteration_prefix(entry, arg)?
    } else {
        compute_key(entry, arg.map(std::slice::from_ref).unwrap_or_default())?
    };

    Ok(key.body().to_vec())
}
