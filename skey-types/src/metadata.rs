use std::fmt::Display;
use std::fmt::Formatter;

use derive_debug_plus::Dbg;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_with::hex::Hex;
use serde_with::serde_as;

use crate::hasher::HasherKind;
use crate::TypeName;

/// What a read of a missing entry returns.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageEntryModifier {
    /// Missing entries read as nothing.
    #[default]
    Optional,
    /// Missing entries read as the fallback value, i.e. the entry is required.
    Default,
}

/// The shape of a storage item together with its key types and hashers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageEntryType {
    Plain {
        value: TypeName,
    },

    Map {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hasher: Option<HasherKind>,
        key: TypeName,
        value: TypeName,
    },

    DoubleMap {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hasher: Option<HasherKind>,
        key1: TypeName,
        key2: TypeName,
        value: TypeName,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key2_hasher: Option<HasherKind>,
    },
}

impl StorageEntryType {
    pub fn value(&self) -> &str {
        match self {
            StorageEntryType::Plain { value }
            | StorageEntryType::Map { value, .. }
            | StorageEntryType::DoubleMap { value, .. } => value,
        }
    }

    /// Number of arguments a full key of this shape takes.
    pub fn arity(&self) -> usize {
        match self {
            StorageEntryType::Plain { .. } => 0,
            StorageEntryType::Map { .. } => 1,
            StorageEntryType::DoubleMap { .. } => 2,
        }
    }
}

impl Display for StorageEntryType {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            StorageEntryType::Plain { .. } => write!(f, "Plain"),
            StorageEntryType::Map { .. } => write!(f, "Map"),
            StorageEntryType::DoubleMap { .. } => write!(f, "DoubleMap"),
        }
    }
}

#[serde_as]
#[derive(Clone, Dbg, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageEntryMetadata {
    pub name: String,

    #[serde(default)]
    pub modifier: StorageEntryModifier,

    #[serde(rename = "type")]
    pub ty: StorageEntryType,

    /// Encoded value returned for missing entries when the modifier is `Default`.
    #[serde_as(as = "Hex")]
    #[serde(default)]
    #[dbg(formatter = crate::metadata::bytes_pretty)]
    pub fallback: Vec<u8>,

    #[serde(default)]
    pub documentation: Vec<String>,
}

impl StorageEntryMetadata {
    pub fn new(
        name: impl Into<String>,
        ty: StorageEntryType,
    ) -> Self {
        Self {
            name: name.into(),
            modifier: StorageEntryModifier::default(),
            ty,
            fallback: Vec::new(),
            documentation: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_modifier(
        mut self,
        modifier: StorageEntryModifier,
    ) -> Self {
        self.modifier = modifier;
        self
    }

    #[must_use]
    pub fn with_fallback(
        mut self,
        fallback: Vec<u8>,
    ) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn with_documentation(
        mut self,
        line: impl Into<String>,
    ) -> Self {
        self.documentation.push(line.into());
        self
    }
}

/// Immutable description of one storage item, as produced by the metadata decoder.
#[serde_as]
#[derive(Clone, Dbg, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageItemDescriptor {
    /// API facing name of the pallet, e.g. `system`.
    section: String,

    /// Storage prefix hashed into the base address, e.g. `System`. Defaults to `section`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,

    meta: StorageEntryMetadata,

    /// Explicit unhashed key, bypassing base prefix and argument hashing.
    #[serde_as(as = "Option<Hex>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[dbg(formatter = crate::key::hex_pretty)]
    raw_key: Option<Vec<u8>>,
}

impl StorageItemDescriptor {
    pub fn new(
        section: impl Into<String>,
        meta: StorageEntryMetadata,
    ) -> Self {
        Self {
            section: section.into(),
            prefix: None,
            meta,
            raw_key: None,
        }
    }

    #[must_use]
    pub fn with_prefix(
        mut self,
        prefix: impl Into<String>,
    ) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Opt into the raw key path: the key is `raw_key` verbatim, length-prefixed.
    #[must_use]
    pub fn with_raw_key(
        mut self,
        raw_key: impl Into<Vec<u8>>,
    ) -> Self {
        self.raw_key = Some(raw_key.into());
        self
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(&self.section)
    }

    /// The entry name, which is what gets hashed next to the prefix.
    pub fn method(&self) -> &str {
        &self.meta.name
    }

    pub fn meta(&self) -> &StorageEntryMetadata {
        &self.meta
    }

    pub fn ty(&self) -> &StorageEntryType {
        &self.meta.ty
    }

    pub fn raw_key(&self) -> Option<&[u8]> {
        self.raw_key.as_deref()
    }
}

impl Display for StorageItemDescriptor {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}.{}", self.section, self.meta.name)
    }
}

/// Formats the fallback for `Dbg` derived debug output.
#[allow(clippy::ptr_arg)]
pub fn bytes_pretty(bytes: &Vec<u8>) -> String {
    format!("0x{}", hex::encode(bytes))
}
