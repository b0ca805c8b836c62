//! Maps declared hasher kinds to the byte transforms applied to encoded keys.
use skey_types::HasherKind;
use skey_types::StorageEntryType;

/// A byte transform applied to an encoded key before it is embedded in a storage key.
pub type HashFn = fn(&[u8]) -> Vec<u8>;

#[derive(Copy, Clone)]
pub struct Hasher {
    kind: HasherKind,
    hash_fn: HashFn,
}

impl Hasher {
    pub fn new(kind: HasherKind) -> Self {
        Self {
            kind,
            hash_fn: hash_fn(kind),
        }
    }

    pub fn kind(&self) -> HasherKind {
        self.kind
    }

    pub fn hash(
        &self,
        data: &[u8],
    ) -> Vec<u8> {
        (self.hash_fn)(data)
    }

    /// Length of the digest placed in front of the key bytes; 0 for `Identity`.
    pub fn digest_len(&self) -> usize {
        match self.kind {
            HasherKind::Blake2_128 | HasherKind::Blake2_128Concat | HasherKind::Twox128 => 16,
            HasherKind::Blake2_256 | HasherKind::Twox256 => 32,
            HasherKind::Twox64 | HasherKind::Twox64Concat => 8,
            HasherKind::Identity => 0,
        }
    }

    pub fn is_reversible(&self) -> bool {
        self.kind.is_reversible()
    }
}

impl std::fmt::Debug for Hasher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "Hasher<{}>", self.kind)
    }
}

impl PartialEq for Hasher {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Hasher {}

impl From<HasherKind> for Hasher {
    fn from(kind: HasherKind) -> Self {
        Hasher::new(kind)
    }
}

/// The registry: one transform per declared kind.
pub fn hash_fn(kind: HasherKind) -> HashFn {
    match kind {
        HasherKind::Blake2_128 => |data| sp_core_hashing::blake2_128(data).to_vec(),
        HasherKind::Blake2_256 => |data| sp_core_hashing::blake2_256(data).to_vec(),
        HasherKind::Blake2_128Concat => |data| concat(&sp_core_hashing::blake2_128(data), data),
        HasherKind::Twox128 => |data| sp_core_hashing::twox_128(data).to_vec(),
        HasherKind::Twox256 => |data| sp_core_hashing::twox_256(data).to_vec(),
        HasherKind::Twox64 => |data| sp_core_hashing::twox_64(data).to_vec(),
        HasherKind::Twox64Concat => |data| concat(&sp_core_hashing::twox_64(data), data),
        HasherKind::Identity => |data| data.to_vec(),
    }
}

fn concat(
    digest: &[u8],
    data: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(digest.len() + data.len());
    out.extend_from_slice(digest);
    out.extend_from_slice(data);
    out
}

/// Resolves the hashers of a storage entry type.
///
/// Plain and Map entries get one hasher, DoubleMap entries a pair. An undeclared first hasher
/// falls back to `Identity`; an undeclared second hasher is left as `None` for the caller to
/// reject, since double map metadata always carries both.
pub fn select(ty: &StorageEntryType) -> (Hasher, Option<Hasher>) {
    match ty {
        StorageEntryType::Plain { .. } => (Hasher::new(HasherKind::Identity), None),
        StorageEntryType::Map { hasher, .. } => (Hasher::new(hasher.unwrap_or_default()), None),
        StorageEntryType::DoubleMap {
            hasher,
            key2_hasher,
            ..
        } => (
            Hasher::new(hasher.unwrap_or_default()),
            key2_hasher.map(Hasher::new),
        ),
    }
}
