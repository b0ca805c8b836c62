use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde_with::DeserializeFromStr;
use serde_with::SerializeDisplay;
use thiserror::Error;

/// The hashers a storage item may declare for its key(s).
///
/// Variant names match the names used in chain metadata.
#[allow(non_camel_case_types)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub enum HasherKind {
    Blake2_128,
    Blake2_256,
    /// `blake2_128(key) ++ key`
    Blake2_128Concat,
    Twox128,
    Twox256,
    Twox64,
    /// `twox64(key) ++ key`
    Twox64Concat,
    /// The encoded key itself.
    #[default]
    Identity,
}

impl HasherKind {
    pub const ALL: [HasherKind; 8] = [
        HasherKind::Blake2_128,
        HasherKind::Blake2_256,
        HasherKind::Blake2_128Concat,
        HasherKind::Twox128,
        HasherKind::Twox256,
        HasherKind::Twox64,
        HasherKind::Twox64Concat,
        HasherKind::Identity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HasherKind::Blake2_128 => "Blake2_128",
            HasherKind::Blake2_256 => "Blake2_256",
            HasherKind::Blake2_128Concat => "Blake2_128Concat",
            HasherKind::Twox128 => "Twox128",
            HasherKind::Twox256 => "Twox256",
            HasherKind::Twox64 => "Twox64",
            HasherKind::Twox64Concat => "Twox64Concat",
            HasherKind::Identity => "Identity",
        }
    }

    /// Whether the original key bytes can be read back from the hashed output.
    pub fn is_reversible(&self) -> bool {
        matches!(
            self,
            HasherKind::Blake2_128Concat | HasherKind::Twox64Concat | HasherKind::Identity
        )
    }
}

impl Display for HasherKind {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A hasher name which is not part of the metadata vocabulary.
///
/// Only malformed metadata produces this, callers cannot recover from it.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("unknown storage hasher `{0}`")]
pub struct UnknownHasher(pub String);

impl FromStr for HasherKind {
    type Err = UnknownHasher;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HasherKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownHasher(s.to_string()))
    }
}
