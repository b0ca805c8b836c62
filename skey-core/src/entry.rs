use serde_derive::Serialize;
use skey_types::BasePrefix;
use skey_types::StorageEntryMetadata;
use skey_types::StorageItemDescriptor;
use skey_types::StorageKey;
use skey_types::Value;
use tracing::debug;

use crate::assembler::compute_key;
use crate::codec::ArgumentEncoder;
use crate::codec::ScaleRegistry;
use crate::decode::decode_key_args;
use crate::decode::DecodeKeyError;
use crate::error::KeyError;
use crate::iteration::compute_head_metadata;
use crate::iteration::compute_iteration_prefix;
use crate::iteration::compute_key_prefix;
use crate::shape::KeyShape;

/// A storage item bound to its base address and an argument encoder.
///
/// The descriptor is never mutated; every derived key depends only on it and the arguments.
#[derive(Clone)]
pub struct StorageEntry<E = ScaleRegistry> {
    item: StorageItemDescriptor,
    base_prefix: BasePrefix,
    shape: KeyShape,
    encoder: E,
}

impl StorageEntry<ScaleRegistry> {
    /// An entry using the default SCALE registry.
    pub fn scale(item: StorageItemDescriptor) -> Result<Self, KeyError> {
        Self::new(item, ScaleRegistry::default())
    }
}

impl<E: ArgumentEncoder> StorageEntry<E> {
    /// Computes the base prefix and resolves the key layout.
    ///
    /// Fails with [`KeyError::MissingSecondHasher`] for double maps lacking their second hasher.
    pub fn new(
        item: StorageItemDescriptor,
        encoder: E,
    ) -> Result<Self, KeyError> {
        let shape = KeyShape::resolve(&item)?;
        let base_prefix = skey_hashing::base_prefix(item.prefix(), item.method());

        debug!(
            item = %item,
            shape = shape.name(),
            base_prefix = hex::encode(base_prefix),
            "storage entry created"
        );

        Ok(Self {
            item,
            base_prefix,
            shape,
            encoder,
        })
    }

    /// The full key of the entry addressed by `args`.
    pub fn key(
        &self,
        args: &[Value],
    ) -> Result<StorageKey, KeyError> {
        compute_key(self, args)
    }

    /// Whether the entry is a map and can be enumerated.
    pub fn has_iter_key(&self) -> bool {
        self.shape.is_iterable()
    }

    /// The length-prefixed enumeration prefix, optionally narrowed by a double map's first key.
    pub fn iter_key(
        &self,
        first_key: Option<&Value>,
    ) -> Result<StorageKey, KeyError> {
        compute_iteration_prefix(self, first_key)
    }

    /// Metadata of the keys produced by [`StorageEntry::iter_key`].
    pub fn head_meta(&self) -> Result<StorageEntryMetadata, KeyError> {
        compute_head_metadata(self)
    }

    /// The unprefixed key bytes to scan for, for maps, double maps or plain entries.
    pub fn key_prefix(
        &self,
        arg: Option<&Value>,
    ) -> Result<Vec<u8>, KeyError> {
        compute_key_prefix(self, arg)
    }

    /// Recovers the arguments from a full key produced by [`StorageEntry::key`].
    pub fn decode_key_args(
        &self,
        key: &StorageKey,
    ) -> Result<Vec<Value>, DecodeKeyError> {
        decode_key_args(self, key)
    }

    /// The JSON view of the entry: the metadata fields plus a `storage` block naming it.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(EntryView {
            meta: self.item.meta(),
            storage: StorageView {
                method: self.item.method(),
                prefix: self.item.prefix(),
                section: self.item.section(),
            },
        })
    }
}

impl<E> StorageEntry<E> {
    pub fn item(&self) -> &StorageItemDescriptor {
        &self.item
    }

    pub fn section(&self) -> &str {
        self.item.section()
    }

    pub fn method(&self) -> &str {
        self.item.method()
    }

    pub fn prefix(&self) -> &str {
        self.item.prefix()
    }

    pub fn meta(&self) -> &StorageEntryMetadata {
        self.item.meta()
    }

    pub fn shape(&self) -> &KeyShape {
        &self.shape
    }

    pub fn base_prefix(&self) -> &BasePrefix {
        &self.base_prefix
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}

impl<E> std::fmt::Debug for StorageEntry<E> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "ENTRY<{}:{}:0x{}>",
            self.item,
            self.shape.name(),
            hex::encode(self.base_prefix)
        )
    }
}

#[derive(Serialize)]
struct EntryView<'a> {
    #[serde(flatten)]
    meta: &'a StorageEntryMetadata,
    storage: StorageView<'a>,
}

#[derive(Serialize)]
struct StorageView<'a> {
    method: &'a str,
    prefix: &'a str,
    section: &'a str,
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use skey_types::HasherKind;
    use skey_types::StorageEntryModifier;
    use skey_types::StorageEntryType;

    use super::*;

    const SYSTEM_ACCOUNT: [u8; 32] =
        hex!("26aa394eea5630e07c48ae0c9558cef7b99d880ec681799c0cf30e8886371da9");
    const TIMESTAMP_NOW: [u8; 32] =
        hex!("f0c365c3cf59d671eb72da0e7a4113c49f1f0515f462cdcf84e0f1d6045dfcbb");

    fn plain(
        section: &str,
        method: &str,
        value: &str,
    ) -> StorageItemDescriptor {
        StorageItemDescriptor::new(
            section,
            StorageEntryMetadata::new(
                method,
                StorageEntryType::Plain {
                    value: value.to_string(),
                },
            ),
        )
    }

    fn map(
        hasher: Option<HasherKind>,
        key: &str,
    ) -> StorageItemDescriptor {
        StorageItemDescriptor::new(
            "System",
            StorageEntryMetadata::new(
                "Account",
                StorageEntryType::Map {
                    hasher,
                    key: key.to_string(),
                    value: "AccountInfo".to_string(),
                },
            )
            .with_documentation(" The full account information for a particular account ID."),
        )
    }

    fn double_map(key2_hasher: Option<HasherKind>) -> StorageItemDescriptor {
        StorageItemDescriptor::new(
            "PhatRollupAnchor",
            StorageEntryMetadata::new(
                "States",
                StorageEntryType::DoubleMap {
                    hasher: Some(HasherKind::Blake2_128Concat),
                    key1: "H256".to_string(),
                    key2: "Bytes".to_string(),
                    value: "Bytes".to_string(),
                    key2_hasher,
                },
            ),
        )
    }

    fn rollup_states() -> StorageEntry {
        StorageEntry::scale(double_map(Some(HasherKind::Blake2_128Concat))).unwrap()
    }

    #[test]
    fn test_plain_key() {
        let entry = StorageEntry::scale(plain("Timestamp", "Now", "Moment")).unwrap();
        let key = entry.key(&[]).unwrap();

        assert_eq!(key.as_bytes()[0], 0x80);
        assert_eq!(key.body(), TIMESTAMP_NOW);
        assert!(!entry.has_iter_key());
    }

    #[test]
    fn test_plain_rejects_arguments() {
        let entry = StorageEntry::scale(plain("Timestamp", "Now", "Moment")).unwrap();
        assert_eq!(
            entry.key(&[Value::from(1u8)]),
            Err(KeyError::PlainWithArguments {
                section: "Timestamp".to_string(),
                method: "Now".to_string(),
                count: 1
            })
        );
    }

    #[test]
    fn test_map_key_with_concat_hasher() {
        let entry = StorageEntry::scale(map(Some(HasherKind::Blake2_128Concat), "AccountId")).unwrap();
        let key = entry.key(&[Value::from([1u8; 32])]).unwrap();

        // 80 byte body: base prefix, 16 byte digest, 32 byte account
        assert_eq!(key.as_bytes()[..2], hex!("4101"));
        assert_eq!(key.body()[..32], SYSTEM_ACCOUNT);
        assert_eq!(key.body()[32..48], hex!("c035f853fcd0f0589e30c9e2dc1a0f57"));
        assert_eq!(key.body()[48..], [1u8; 32]);
    }

    #[test]
    fn test_map_key_without_declared_hasher_is_identity() {
        let entry = StorageEntry::scale(map(None, "u32")).unwrap();
        let key = entry.key(&[Value::from(5u32)]).unwrap();

        let mut body = SYSTEM_ACCOUNT.to_vec();
        body.extend(hex!("05000000"));
        assert_eq!(key, StorageKey::from_body(&body));
    }

    #[test]
    fn test_map_with_empty_key_encoding_addresses_base() {
        let entry = StorageEntry::scale(map(Some(HasherKind::Twox64Concat), "()")).unwrap();
        let key = entry.key(&[Value::Sequence(Vec::new())]).unwrap();
        assert_eq!(key.body(), SYSTEM_ACCOUNT);
    }

    #[test]
    fn test_map_arity() {
        let entry = StorageEntry::scale(map(Some(HasherKind::Twox64Concat), "u32")).unwrap();
        for args in [vec![], vec![Value::Null], vec![Value::from(1u8), Value::from(2u8)]] {
            let err = entry.key(&args).unwrap_err();
            assert!(matches!(err, KeyError::MissingMapArgument { .. }), "{args:?}");
            assert!(err.is_usage());
        }
    }

    #[test]
    fn test_double_map_key() {
        let entry = rollup_states();
        let key = entry
            .key(&[Value::from([1u8; 32]), Value::from(vec![2u8; 32])])
            .unwrap();

        let expected = hex!(
            "6e5134eca327aece93f5faddaec7c0d751f254b22584f9f893c604003c293742"
            "c035f853fcd0f0589e30c9e2dc1a0f57"
            "0101010101010101010101010101010101010101010101010101010101010101"
            "35e8cfc0722c6a15a223941231244028"
            "80"
            "0202020202020202020202020202020202020202020202020202020202020202"
        );
        assert_eq!(key.body(), expected);
        assert_eq!(key.as_bytes()[..2], hex!("0502"));
    }

    #[test]
    fn test_double_map_arity() {
        let entry = rollup_states();
        for args in [
            vec![Value::from([1u8; 32])],
            vec![Value::from([1u8; 32]), Value::Null],
            vec![],
        ] {
            assert!(matches!(
                entry.key(&args),
                Err(KeyError::MissingDoubleMapArguments { .. })
            ));
        }
    }

    #[test]
    fn test_double_map_requires_second_hasher() {
        let err = StorageEntry::scale(double_map(None)).unwrap_err();
        assert_eq!(
            err,
            KeyError::MissingSecondHasher {
                section: "PhatRollupAnchor".to_string(),
                method: "States".to_string()
            }
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_codec_errors_pass_through() {
        let entry = StorageEntry::scale(map(Some(HasherKind::Blake2_128Concat), "AccountId")).unwrap();
        assert!(matches!(
            entry.key(&[Value::from(vec![1u8; 31])]),
            Err(KeyError::Codec(_))
        ));
    }

    #[test]
    fn test_iter_key_of_map_is_base_prefix() {
        let entry = StorageEntry::scale(map(Some(HasherKind::Blake2_128Concat), "AccountId")).unwrap();
        let iter_key = entry.iter_key(None).unwrap();

        assert_eq!(iter_key, StorageKey::from_body(&SYSTEM_ACCOUNT));
        assert_eq!(
            entry.iter_key(Some(&Value::from([1u8; 32]))),
            Err(KeyError::IterationFilterOnMap {
                section: "System".to_string(),
                method: "Account".to_string()
            })
        );
        assert_eq!(entry.iter_key(Some(&Value::Null)), Ok(iter_key));
    }

    #[test]
    fn test_iter_keys_cover_full_keys() {
        let entry = StorageEntry::scale(map(Some(HasherKind::Blake2_128Concat), "AccountId")).unwrap();
        let iter_key = entry.iter_key(None).unwrap();
        for account in [[0u8; 32], [1u8; 32], [0xffu8; 32]] {
            let key = entry.key(&[Value::from(account)]).unwrap();
            assert!(iter_key.is_prefix_of(&key));
        }

        let entry = rollup_states();
        let first = Value::from([1u8; 32]);
        let whole = entry.iter_key(None).unwrap();
        let narrowed = entry.iter_key(Some(&first)).unwrap();
        let key = entry.key(&[first, Value::from(vec![9u8; 3])]).unwrap();

        assert!(whole.is_prefix_of(&narrowed));
        assert!(narrowed.is_prefix_of(&key));
        assert!(narrowed.body().len() > whole.body().len());
    }

    #[test]
    fn test_plain_has_no_iter_key() {
        let entry = StorageEntry::scale(plain("System", "Number", "BlockNumber")).unwrap();
        assert!(matches!(
            entry.iter_key(None),
            Err(KeyError::NoIterationKey { .. })
        ));
        assert!(matches!(
            entry.head_meta(),
            Err(KeyError::NoIterationKey { .. })
        ));
    }

    #[test]
    fn test_head_meta_describes_keys() {
        let entry = StorageEntry::scale(map(Some(HasherKind::Blake2_128Concat), "AccountId")).unwrap();
        let head = entry.head_meta().unwrap();

        assert_eq!(head.name, "Account");
        assert_eq!(head.modifier, StorageEntryModifier::Default);
        assert_eq!(
            head.ty,
            StorageEntryType::Plain {
                value: "AccountId".to_string()
            }
        );
        assert_eq!(head.fallback, vec![0u8; 32]);
        assert_eq!(head.documentation, entry.meta().documentation);

        let head = rollup_states().head_meta().unwrap();
        assert_eq!(head.ty.value(), "H256");
    }

    #[test]
    fn test_key_prefix() {
        let entry = StorageEntry::scale(map(Some(HasherKind::Blake2_128Concat), "AccountId")).unwrap();
        assert_eq!(entry.key_prefix(None).unwrap(), SYSTEM_ACCOUNT);

        let entry = rollup_states();
        let first = Value::from([1u8; 32]);
        assert_eq!(
            entry.key_prefix(Some(&first)).unwrap(),
            entry.iter_key(Some(&first)).unwrap().body()
        );

        let entry = StorageEntry::scale(plain("Timestamp", "Now", "Moment")).unwrap();
        assert_eq!(entry.key_prefix(None).unwrap(), TIMESTAMP_NOW);
        assert!(matches!(
            entry.key_prefix(Some(&Value::from(1u8))),
            Err(KeyError::PlainWithArguments { .. })
        ));
    }

    #[test]
    fn test_raw_key_is_used_verbatim() {
        let item = plain("substrate", "code", "Bytes").with_raw_key(b":code".to_vec());
        let entry = StorageEntry::scale(item).unwrap();

        assert_eq!(entry.key(&[]).unwrap().as_bytes(), hex!("143a636f6465"));
        assert!(matches!(
            entry.key(&[Value::from(1u8)]),
            Err(KeyError::PlainWithArguments { .. })
        ));
        assert!(!entry.has_iter_key());
    }

    #[test]
    fn test_keys_are_deterministic() {
        let a = rollup_states();
        let b = rollup_states();
        let args = [Value::from([3u8; 32]), Value::from(vec![4u8])];
        assert_eq!(a.key(&args), b.key(&args));
        assert_eq!(a.base_prefix(), b.base_prefix());
    }

    #[test]
    fn test_to_json() {
        let item = map(Some(HasherKind::Blake2_128Concat), "AccountId").with_prefix("System");
        let entry = StorageEntry::scale(item).unwrap();
        let json = entry.to_json().unwrap();

        assert_eq!(json["name"], "Account");
        assert_eq!(json["modifier"], "Optional");
        assert_eq!(json["type"]["Map"]["hasher"], "Blake2_128Concat");
        assert_eq!(json["storage"]["method"], "Account");
        assert_eq!(json["storage"]["prefix"], "System");
        assert_eq!(json["storage"]["section"], "System");
    }

    #[test]
    fn test_debug() {
        let entry = StorageEntry::scale(plain("Timestamp", "Now", "Moment")).unwrap();
        assert_eq!(
            format!("{entry:?}"),
            format!("ENTRY<Timestamp.Now:Plain:0x{}>", hex::encode(TIMESTAMP_NOW))
        );
    }
}
