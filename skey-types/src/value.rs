use std::fmt::Display;
use std::fmt::Formatter;

use thiserror::Error;

/// A dynamically typed argument, interpreted by the argument encoder against a declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// An absent argument.
    Null,
    Bool(bool),
    Unsigned(u128),
    Signed(i128),
    Bytes(Vec<u8>),
    Text(String),
    /// Tuples, fixed arrays and vectors.
    Sequence(Vec<Value>),
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ValueError {
    #[error("fractional numbers are not valid arguments: {0}")]
    Fractional(String),

    #[error("invalid hex string `{0}`")]
    Hex(String),

    #[error("objects are not valid arguments")]
    Object,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// JSON view of the value; bytes are `0x` hex and integers beyond `u64`/`i64` are strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Unsigned(n) => match u64::try_from(*n) {
                Ok(n) => serde_json::Value::from(n),
                Err(_) => serde_json::Value::String(n.to_string()),
            },
            Value::Signed(n) => match i64::try_from(*n) {
                Ok(n) => serde_json::Value::from(n),
                Err(_) => serde_json::Value::String(n.to_string()),
            },
            Value::Bytes(bytes) => serde_json::Value::String(format!("0x{}", hex::encode(bytes))),
            Value::Text(text) => serde_json::Value::String(text.clone()),
            Value::Sequence(values) => {
                serde_json::Value::Array(values.iter().map(Value::to_json).collect())
            },
        }
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = ValueError;

    /// `0x` prefixed strings become bytes, every other string stays text.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(n) = n.as_u64() {
                    Value::Unsigned(n.into())
                } else if let Some(n) = n.as_i64() {
                    Value::Signed(n.into())
                } else {
                    return Err(ValueError::Fractional(n.to_string()));
                }
            },
            serde_json::Value::String(s) => match s.strip_prefix("0x") {
                Some(digits) => {
                    Value::Bytes(hex::decode(digits).map_err(|_| ValueError::Hex(s.clone()))?)
                },
                None => Value::Text(s),
            },
            serde_json::Value::Array(values) => Value::Sequence(
                values
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(_) => return Err(ValueError::Object),
        })
    }
}

impl Display for Value {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Unsigned(n.into())
            }
        })*
    };
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Signed(n.into())
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128);
impl_from_signed!(i8, i16, i32, i64, i128);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(bytes: [u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Sequence(values)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json() {
        let value = Value::try_from(json!([1, -2, true, "0x0102", "alice", null])).unwrap();
        assert_eq!(
            value,
            Value::Sequence(vec![
                Value::Unsigned(1),
                Value::Signed(-2),
                Value::Bool(true),
                Value::Bytes(vec![1, 2]),
                Value::Text("alice".to_string()),
                Value::Null,
            ])
        );
    }

    #[test]
    fn test_from_json_rejects_unrepresentable() {
        assert_eq!(
            Value::try_from(json!(1.5)),
            Err(ValueError::Fractional("1.5".to_string()))
        );
        assert_eq!(
            Value::try_from(json!("0xabc")),
            Err(ValueError::Hex("0xabc".to_string()))
        );
        assert_eq!(Value::try_from(json!({"a": 1})), Err(ValueError::Object));
    }

    #[test]
    fn test_to_json_keeps_large_integers_exact() {
        assert_eq!(Value::Unsigned(u128::MAX).to_json(), json!(u128::MAX.to_string()));
        assert_eq!(Value::Signed(i128::MIN).to_json(), json!(i128::MIN.to_string()));
        assert_eq!(Value::from(7u8).to_json(), json!(7));
        assert_eq!(Value::from([0xabu8; 2]).to_string(), "\"0xabab\"");
    }
}
