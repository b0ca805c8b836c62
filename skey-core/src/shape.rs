use skey_hashing::Hasher;
use skey_types::StorageEntryType;
use skey_types::StorageItemDescriptor;
use skey_types::TypeName;

use crate::error::KeyError;

/// The key layout of an entry, resolved once when the entry is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyShape {
    /// A hand made key used verbatim.
    Raw(Vec<u8>),

    Plain,

    Map {
        key: TypeName,
        hasher: Hasher,
    },

    DoubleMap {
        key1: TypeName,
        hasher1: Hasher,
        key2: TypeName,
        hasher2: Hasher,
    },
}

impl KeyShape {
    pub fn resolve(item: &StorageItemDescriptor) -> Result<Self, KeyError> {
        if let Some(raw) = item.raw_key() {
            return Ok(KeyShape::Raw(raw.to_vec()));
        }

        let (first, second) = skey_hashing::select(item.ty());
        Ok(match item.ty() {
            StorageEntryType::Plain { .. } => KeyShape::Plain,
            StorageEntryType::Map { key, .. } => KeyShape::Map {
                key: key.clone(),
                hasher: first,
            },
            StorageEntryType::DoubleMap { key1, key2, .. } => KeyShape::DoubleMap {
                key1: key1.clone(),
                hasher1: first,
                key2: key2.clone(),
                hasher2: second.ok_or_else(|| KeyError::missing_second_hasher(item))?,
            },
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeyShape::Raw(_) => "Raw",
            KeyShape::Plain => "Plain",
            KeyShape::Map { .. } => "Map",
            KeyShape::DoubleMap { .. } => "DoubleMap",
        }
    }

    /// Maps and double maps can be enumerated by prefix.
    pub fn is_iterable(&self) -> bool {
        matches!(self, KeyShape::Map { .. } | KeyShape::DoubleMap { .. })
    }

    /// Key types with their hashers, in key order.
    pub fn keys(&self) -> Vec<(&str, Hasher)> {
        match self {
            KeyShape::Raw(_) | KeyShape::Plain => Vec::new(),
            KeyShape::Map { key, hasher } => vec![(key.as_str(), *hasher)],
            KeyShape::DoubleMap {
                key1,
                hasher1,
                key2,
                hasher2,
            } => vec![(key1.as_str(), *hasher1), (key2.as_str(), *hasher2)],
        }
    }
}
