use std::collections::BTreeMap;

use parity_scale_codec::Compact;
use parity_scale_codec::Decode;
use parity_scale_codec::Encode;
use skey_types::Value;

use super::typedef::resolve;
use super::typedef::TypeDef;
use super::typedef::Width;
use super::ArgumentEncoder;
use super::CodecError;

/// Aliases every registry starts with, covering the key types common in chain metadata.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("AccountId", "[u8; 32]"),
    ("AccountId32", "[u8; 32]"),
    ("AccountIndex", "u32"),
    ("Balance", "u128"),
    ("BlockNumber", "u32"),
    ("ChangesTrieConfiguration", "(u32, u32)"),
    ("EraIndex", "u32"),
    ("H160", "[u8; 20]"),
    ("H256", "[u8; 32]"),
    ("Hash", "[u8; 32]"),
    ("Index", "u32"),
    ("Moment", "u64"),
    ("Nonce", "u32"),
    ("SessionIndex", "u32"),
];

/// SCALE encoder resolving type names against a set of aliases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaleRegistry {
    aliases: BTreeMap<String, String>,
}

impl Default for ScaleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaleRegistry {
    /// A registry with the default aliases.
    pub fn new() -> Self {
        Self::empty().with_aliases(DEFAULT_ALIASES.iter().copied())
    }

    /// A registry knowing only the built in type grammar.
    pub fn empty() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_alias(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.aliases.insert(name.into(), target.into());
        self
    }

    #[must_use]
    pub fn with_aliases<N, T>(
        self,
        aliases: impl IntoIterator<Item = (N, T)>,
    ) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        aliases
            .into_iter()
            .fold(self, |registry, (name, target)| registry.with_alias(name, target))
    }

    /// Whether `type_name` resolves to a concrete type.
    pub fn knows(
        &self,
        type_name: &str,
    ) -> bool {
        resolve(type_name, &self.aliases).is_ok()
    }
}

impl ArgumentEncoder for ScaleRegistry {
    fn encode(
        &self,
        type_name: &str,
        value: &Value,
    ) -> Result<Vec<u8>, CodecError> {
        let def = resolve(type_name, &self.aliases)?;
        let mut out = Vec::new();
        encode_value(&def, type_name, value, &mut out)?;
        Ok(out)
    }

    fn decode_prefix(
        &self,
        type_name: &str,
        bytes: &[u8],
    ) -> Result<(Value, usize), CodecError> {
        let def = resolve(type_name, &self.aliases)?;
        let mut input = bytes;
        let value = decode_value(&def, type_name, &mut input)?;
        Ok((value, bytes.len() - input.len()))
    }

    fn zero_value(
        &self,
        type_name: &str,
    ) -> Result<Value, CodecError> {
        resolve(type_name, &self.aliases).map(|def| zero_value(&def))
    }
}

fn mismatch(
    type_name: &str,
    value: &Value,
) -> CodecError {
    CodecError::TypeMismatch {
        type_name: type_name.to_string(),
        value: value.to_string(),
    }
}

fn out_of_range(
    type_name: &str,
    value: impl ToString,
) -> CodecError {
    CodecError::OutOfRange {
        type_name: type_name.to_string(),
        value: value.to_string(),
    }
}

fn check_len(
    type_name: &str,
    expected: usize,
    actual: usize,
) -> Result<(), CodecError> {
    if expected != actual {
        return Err(CodecError::LengthMismatch {
            type_name: type_name.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Integers may be given as numbers or decimal text.
fn as_unsigned(
    type_name: &str,
    value: &Value,
) -> Result<u128, CodecError> {
    match value {
        Value::Unsigned(n) => Ok(*n),
        Value::Signed(n) => u128::try_from(*n).map_err(|_| out_of_range(type_name, n)),
        Value::Text(s) => s.parse().map_err(|_| mismatch(type_name, value)),
        _ => Err(mismatch(type_name, value)),
    }
}

fn as_signed(
    type_name: &str,
    value: &Value,
) -> Result<i128, CodecError> {
    match value {
        Value::Signed(n) => Ok(*n),
        Value::Unsigned(n) => i128::try_from(*n).map_err(|_| out_of_range(type_name, n)),
        Value::Text(s) => s.parse().map_err(|_| mismatch(type_name, value)),
        _ => Err(mismatch(type_name, value)),
    }
}

fn check_unsigned(
    type_name: &str,
    width: Width,
    n: u128,
) -> Result<u128, CodecError> {
    let max = match width {
        Width::W8 => u8::MAX.into(),
        Width::W16 => u16::MAX.into(),
        Width::W32 => u32::MAX.into(),
        Width::W64 => u64::MAX.into(),
        Width::W128 => u128::MAX,
    };
    if n > max {
        return Err(out_of_range(type_name, n));
    }
    Ok(n)
}

fn encode_unsigned(
    type_name: &str,
    width: Width,
    n: u128,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    let n = check_unsigned(type_name, width, n)?;
    // range checked above
    match width {
        Width::W8 => (n as u8).encode_to(out),
        Width::W16 => (n as u16).encode_to(out),
        Width::W32 => (n as u32).encode_to(out),
        Width::W64 => (n as u64).encode_to(out),
        Width::W128 => n.encode_to(out),
    }
    Ok(())
}

fn encode_signed(
    type_name: &str,
    width: Width,
    n: i128,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    let oor = |_| out_of_range(type_name, n);
    match width {
        Width::W8 => i8::try_from(n).map_err(oor)?.encode_to(out),
        Width::W16 => i16::try_from(n).map_err(oor)?.encode_to(out),
        Width::W32 => i32::try_from(n).map_err(oor)?.encode_to(out),
        Width::W64 => i64::try_from(n).map_err(oor)?.encode_to(out),
        Width::W128 => n.encode_to(out),
    }
    Ok(())
}

fn encode_value(
    def: &TypeDef,
    type_name: &str,
    value: &Value,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    match (def, value) {
        (TypeDef::Unit, Value::Null) => {},
        (TypeDef::Unit, Value::Sequence(values)) if values.is_empty() => {},
        (TypeDef::Bool, Value::Bool(b)) => b.encode_to(out),
        (TypeDef::Uint(width), _) => {
            encode_unsigned(type_name, *width, as_unsigned(type_name, value)?, out)?
        },
        (TypeDef::Int(width), _) => {
            encode_signed(type_name, *width, as_signed(type_name, value)?, out)?
        },
        (TypeDef::Compact(width), _) => {
            let n = check_unsigned(type_name, *width, as_unsigned(type_name, value)?)?;
            Compact(n).encode_to(out)
        },
        (TypeDef::Bytes, Value::Bytes(bytes)) => bytes.encode_to(out),
        (TypeDef::Bytes, Value::Text(text)) => text.as_bytes().encode_to(out),
        (TypeDef::Text, Value::Text(text)) => text.encode_to(out),
        (TypeDef::Array(elem, len), Value::Bytes(bytes)) if elem.is_byte() => {
            check_len(type_name, *len, bytes.len())?;
            out.extend_from_slice(bytes);
        },
        (TypeDef::Array(elem, len), Value::Sequence(values)) => {
            check_len(type_name, *len, values.len())?;
            for value in values {
                encode_value(elem, type_name, value, out)?;
            }
        },
        (TypeDef::Vec(elem), Value::Sequence(values)) => {
            Compact(values.len() as u64).encode_to(out);
            for value in values {
                encode_value(elem, type_name, value, out)?;
            }
        },
        (TypeDef::Option(_), Value::Null) => out.push(0),
        // Option<bool> is a single byte in SCALE
        (TypeDef::Option(inner), Value::Bool(b)) if **inner == TypeDef::Bool => {
            out.push(if *b { 1 } else { 2 })
        },
        (TypeDef::Option(inner), _) => {
            out.push(1);
            encode_value(inner, type_name, value, out)?;
        },
        (TypeDef::Tuple(fields), Value::Sequence(values)) => {
            check_len(type_name, fields.len(), values.len())?;
            for (field, value) in fields.iter().zip(values) {
                encode_value(field, type_name, value, out)?;
            }
        },
        _ => return Err(mismatch(type_name, value)),
    }

    Ok(())
}

fn decode_value(
    def: &TypeDef,
    type_name: &str,
    input: &mut &[u8],
) -> Result<Value, CodecError> {
    let err = |e: parity_scale_codec::Error| CodecError::Decode {
        type_name: type_name.to_string(),
        reason: e.to_string(),
    };

    Ok(match def {
        TypeDef::Unit => Value::Null,
        TypeDef::Bool => Value::Bool(bool::decode(input).map_err(err)?),
        TypeDef::Uint(width) => Value::Unsigned(match width {
            Width::W8 => u8::decode(input).map_err(err)?.into(),
            Width::W16 => u16::decode(input).map_err(err)?.into(),
            Width::W32 => u32::decode(input).map_err(err)?.into(),
            Width::W64 => u64::decode(input).map_err(err)?.into(),
            Width::W128 => u128::decode(input).map_err(err)?,
        }),
        TypeDef::Int(width) => Value::Signed(match width {
            Width::W8 => i8::decode(input).map_err(err)?.into(),
            Width::W16 => i16::decode(input).map_err(err)?.into(),
            Width::W32 => i32::decode(input).map_err(err)?.into(),
            Width::W64 => i64::decode(input).map_err(err)?.into(),
            Width::W128 => i128::decode(input).map_err(err)?,
        }),
        TypeDef::Compact(width) => {
            let Compact(n) = Compact::<u128>::decode(input).map_err(err)?;
            Value::Unsigned(check_unsigned(type_name, *width, n)?)
        },
        TypeDef::Bytes => Value::Bytes(Vec::<u8>::decode(input).map_err(err)?),
        TypeDef::Text => Value::Text(String::decode(input).map_err(err)?),
        TypeDef::Array(elem, len) if elem.is_byte() => {
            if input.len() < *len {
                return Err(CodecError::Decode {
                    type_name: type_name.to_string(),
                    reason: format!("expected {len} bytes, {} left", input.len()),
                });
            }
            let (head, rest) = input.split_at(*len);
            *input = rest;
            Value::Bytes(head.to_vec())
        },
        TypeDef::Array(elem, len) => Value::Sequence(
            (0..*len)
                .map(|_| decode_value(elem, type_name, input))
                .collect::<Result<_, _>>()?,
        ),
        TypeDef::Vec(elem) => {
            let Compact(len) = Compact::<u32>::decode(input).map_err(err)?;
            Value::Sequence(
                (0..len)
                    .map(|_| decode_value(elem, type_name, input))
                    .collect::<Result<_, _>>()?,
            )
        },
        TypeDef::Option(inner) => match (u8::decode(input).map_err(err)?, inner.as_ref()) {
            (0, _) => Value::Null,
            (1, TypeDef::Bool) => Value::Bool(true),
            (2, TypeDef::Bool) => Value::Bool(false),
            (1, inner) => decode_value(inner, type_name, input)?,
            (tag, _) => {
                return Err(CodecError::Decode {
                    type_name: type_name.to_string(),
                    reason: format!("invalid option tag {tag}"),
                })
            },
        },
        TypeDef::Tuple(fields) => Value::Sequence(
            fields
                .iter()
                .map(|field| decode_value(field, type_name, input))
                .collect::<Result<_, _>>()?,
        ),
    })
}

fn zero_value(def: &TypeDef) -> Value {
    match def {
        TypeDef::Unit | TypeDef::Option(_) => Value::Null,
        TypeDef::Bool => Value::Bool(false),
        TypeDef::Uint(_) | TypeDef::Compact(_) => Value::Unsigned(0),
        TypeDef::Int(_) => Value::Signed(0),
        TypeDef::Bytes => Value::Bytes(Vec::new()),
        TypeDef::Text => Value::Text(String::new()),
        TypeDef::Array(elem, len) if elem.is_byte() => Value::Bytes(vec![0; *len]),
        TypeDef::Array(elem, len) => Value::Sequence(vec![zero_value(elem); *len]),
        TypeDef::Vec(_) => Value::Sequence(Vec::new()),
        TypeDef::Tuple(fields) => Value::Sequence(fields.iter().map(zero_value).collect()),
    }
}
