//! The argument encoder seam: turns typed arguments into key bytes and back.
//!
//! Key derivation only depends on [`ArgumentEncoder`]. [`ScaleRegistry`] is a SCALE
//! implementation covering primitive, sequence and tuple types plus named aliases.
use std::sync::Arc;

use skey_types::Value;
use thiserror::Error;

mod scale;
mod typedef;

pub use scale::ScaleRegistry;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("cannot parse type name `{name}`: {reason}")]
    InvalidTypeName { name: String, reason: String },

    #[error("alias `{0}` does not resolve to a concrete type")]
    AliasLoop(String),

    #[error("value {value} cannot be encoded as `{type_name}`")]
    TypeMismatch { type_name: String, value: String },

    #[error("value {value} is out of range for `{type_name}`")]
    OutOfRange { type_name: String, value: String },

    #[error("`{type_name}` expects {expected} elements, got {actual}")]
    LengthMismatch {
        type_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("cannot decode `{type_name}`: {reason}")]
    Decode { type_name: String, reason: String },

    #[error("{count} trailing bytes after decoding `{type_name}`")]
    TrailingBytes { type_name: String, count: usize },
}

/// Encodes typed arguments according to a declared type name.
///
/// Implementations must be free of side effects: the same inputs always give the same bytes.
pub trait ArgumentEncoder: Send + Sync {
    /// Encodes `value` as `type_name`.
    fn encode(
        &self,
        type_name: &str,
        value: &Value,
    ) -> Result<Vec<u8>, CodecError>;

    /// Decodes one `type_name` from the start of `bytes`, returning the value and the number of
    /// bytes consumed.
    fn decode_prefix(
        &self,
        type_name: &str,
        bytes: &[u8],
    ) -> Result<(Value, usize), CodecError>;

    /// Decodes `bytes` as exactly one `type_name`.
    fn decode(
        &self,
        type_name: &str,
        bytes: &[u8],
    ) -> Result<Value, CodecError> {
        let (value, consumed) = self.decode_prefix(type_name, bytes)?;
        if consumed != bytes.len() {
            return Err(CodecError::TrailingBytes {
                type_name: type_name.to_string(),
                count: bytes.len() - consumed,
            });
        }
        Ok(value)
    }

    /// The canonical zero value of `type_name`.
    fn zero_value(
        &self,
        type_name: &str,
    ) -> Result<Value, CodecError>;
}

impl<T: ArgumentEncoder + ?Sized> ArgumentEncoder for &T {
    fn encode(
        &self,
        type_name: &str,
        value: &Value,
    ) -> Result<Vec<u8>, CodecError> {
        (**self).encode(type_name, value)
    }

    fn decode_prefix(
        &self,
        type_name: &str,
        bytes: &[u8],
    ) -> Result<(Value, usize), CodecError> {
        (**self).decode_prefix(type_name, bytes)
    }

    fn zero_value(
        &self,
        type_name: &str,
    ) -> Result<Value, CodecError> {
        (**self).zero_value(type_name)
    }
}

impl<T: ArgumentEncoder + ?Sized> ArgumentEncoder for Arc<T> {
    fn encode(
        &self,
        type_name: &str,
        value: &Value,
    ) -> Result<Vec<u8>, CodecError> {
        (**self).encode(type_name, value)
    }

    fn decode_prefix(
        &self,
        type_name: &str,
        bytes: &[u8],
    ) -> Result<(Value, usize), CodecError> {
        (**self).decode_prefix(type_name, bytes)
    }

    fn zero_value(
        &self,
        type_name: &str,
    ) -> Result<Value, CodecError> {
        (**self).zero_value(type_name)
    }
}
