use skey_types::LengthPrefixError;
use skey_types::StorageItemDescriptor;
use thiserror::Error;

use crate::codec::CodecError;

/// Failures while deriving a key from a storage entry.
///
/// Usage errors name the item and its shape; configuration errors point at malformed
/// metadata; codec errors are passed through untouched.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum KeyError {
    #[error("{section}.{method} is a plain storage item and takes no arguments, got {count}")]
    PlainWithArguments {
        section: String,
        method: String,
        count: usize,
    },

    #[error("{section}.{method} is a Map and requires exactly one non-null argument, got {count}")]
    MissingMapArgument {
        section: String,
        method: String,
        count: usize,
    },

    #[error("{section}.{method} is a DoubleMap and requires two non-null arguments, got {count}")]
    MissingDoubleMapArguments {
        section: String,
        method: String,
        count: usize,
    },

    #[error("{section}.{method} is a Map; filtering arguments for keys/entries are only valid on double maps")]
    IterationFilterOnMap { section: String, method: String },

    #[error("{section}.{method} is not a map and has no iteration key")]
    NoIterationKey { section: String, method: String },

    #[error("{section}.{method} is a DoubleMap without a second hasher; 2 hashing functions should be defined for DoubleMaps")]
    MissingSecondHasher { section: String, method: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Length(#[from] LengthPrefixError),
}

impl KeyError {
    pub(crate) fn plain_with_arguments(
        item: &StorageItemDescriptor,
        count: usize,
    ) -> Self {
        KeyError::PlainWithArguments {
            section: item.section().to_string(),
            method: item.method().to_string(),
            count,
        }
    }

    pub(crate) fn missing_map_argument(
        item: &StorageItemDescriptor,
        count: usize,
    ) -> Self {
        KeyError::MissingMapArgument {
            section: item.section().to_string(),
            method: item.method().to_string(),
            count,
        }
    }

    pub(crate) fn missing_double_map_arguments(
        item: &StorageItemDescriptor,
        count: usize,
    ) -> Self {
        KeyError::MissingDoubleMapArguments {
            section: item.section().to_string(),
            method: item.method().to_string(),
            count,
        }
    }

    pub(crate) fn iteration_filter_on_map(item: &StorageItemDescriptor) -> Self {
        KeyError::IterationFilterOnMap {
            section: item.section().to_string(),
            method: item.method().to_string(),
        }
    }

    pub(crate) fn no_iteration_key(item: &StorageItemDescriptor) -> Self {
        KeyError::NoIterationKey {
            section: item.section().to_string(),
            method: item.method().to_string(),
        }
    }

    pub(crate) fn missing_second_hasher(item: &StorageItemDescriptor) -> Self {
        KeyError::MissingSecondHasher {
            section: item.section().to_string(),
            method: item.method().to_string(),
        }
    }

    /// Wrong arguments for the shape; the caller can fix these.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            KeyError::PlainWithArguments { .. }
                | KeyError::MissingMapArgument { .. }
                | KeyError::MissingDoubleMapArguments { .. }
                | KeyError::IterationFilterOnMap { .. }
                | KeyError::NoIterationKey { .. }
        )
    }

    /// Malformed metadata; nothing the caller passes can fix these.
    pub fn is_configuration(&self) -> bool {
        matches!(self, KeyError::MissingSecondHasher { .. })
    }
}
