pub mod hasher;
pub mod key;
pub mod metadata;
pub mod value;

pub use hasher::HasherKind;
pub use hasher::UnknownHasher;
pub use key::LengthPrefixError;
pub use key::StorageKey;
pub use metadata::StorageEntryMetadata;
pub use metadata::StorageEntryModifier;
pub use metadata::StorageEntryType;
pub use metadata::StorageItemDescriptor;
pub use value::Value;

/// Name of a type understood by the argument encoder, e.g. `AccountId` or `(u32, u64)`.
pub type TypeName = String;

/// The 32 bytes addressing a storage item: `twox128(prefix) ++ twox128(method)`.
pub type BasePrefix = [u8; 32];
