//! Unhashed trie keys every chain carries, addressed by their raw bytes.
use skey_types::StorageEntryMetadata;
use skey_types::StorageEntryModifier;
use skey_types::StorageEntryType;
use skey_types::StorageItemDescriptor;

pub const SECTION: &str = "substrate";
pub const PREFIX: &str = "Substrate";

const WELL_KNOWN: &[(&str, &str, &str, &str)] = &[
    ("code", ":code", "Bytes", " The runtime code."),
    ("heapPages", ":heappages", "u64", " Number of wasm linear memory pages required for execution of the runtime."),
    ("extrinsicIndex", ":extrinsic_index", "u32", " Current extrinsic index (u32) is stored under this key."),
    ("changesTrieConfig", ":changes_trie", "ChangesTrieConfiguration", " Changes trie configuration is stored under this key."),
    ("childStorageKeyPrefix", ":child_storage:", "u32", " Prefix of child storage keys."),
];

fn descriptor(
    method: &str,
    raw_key: &str,
    value: &str,
    doc: &str,
) -> StorageItemDescriptor {
    let meta = StorageEntryMetadata::new(
        method,
        StorageEntryType::Plain {
            value: value.to_string(),
        },
    )
    .with_modifier(StorageEntryModifier::Default)
    .with_documentation(doc);

    StorageItemDescriptor::new(SECTION, meta)
        .with_prefix(PREFIX)
        .with_raw_key(raw_key.as_bytes())
}

/// Descriptors for all well-known keys.
pub fn items() -> Vec<StorageItemDescriptor> {
    WELL_KNOWN
        .iter()
        .map(|(method, raw_key, value, doc)| descriptor(method, raw_key, value, doc))
        .collect()
}

/// Looks up a well-known key by its method name, e.g. `heapPages`.
pub fn find(method: &str) -> Option<StorageItemDescriptor> {
    WELL_KNOWN
        .iter()
        .find(|(name, ..)| *name == method)
        .map(|(method, raw_key, value, doc)| descriptor(method, raw_key, value, doc))
}
