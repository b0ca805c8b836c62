use std::collections::BTreeMap;

use super::CodecError;

const MAX_ALIAS_DEPTH: usize = 32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Width {
    W8,
    W16,
    W32,
    W64,
    W128,
}

/// The structure behind a type name, after aliases are expanded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TypeDef {
    Unit,
    Bool,
    Uint(Width),
    Int(Width),
    /// Compact encoded unsigned integer of the given width.
    Compact(Width),
    /// `Vec<u8>`, length prefixed.
    Bytes,
    Text,
    Array(Box<TypeDef>, usize),
    Vec(Box<TypeDef>),
    Option(Box<TypeDef>),
    Tuple(Vec<TypeDef>),
}

impl TypeDef {
    pub(crate) fn is_byte(&self) -> bool {
        *self == TypeDef::Uint(Width::W8)
    }
}

pub(crate) fn resolve(
    name: &str,
    aliases: &BTreeMap<String, String>,
) -> Result<TypeDef, CodecError> {
    parse(name, aliases, 0)
}

fn invalid(
    name: &str,
    reason: &str,
) -> CodecError {
    CodecError::InvalidTypeName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn parse(
    name: &str,
    aliases: &BTreeMap<String, String>,
    depth: usize,
) -> Result<TypeDef, CodecError> {
    let name = name.trim();
    if depth > MAX_ALIAS_DEPTH {
        return Err(CodecError::AliasLoop(name.to_string()));
    }

    if let Some(inner) = name.strip_prefix('(').and_then(|n| n.strip_suffix(')')) {
        let fields = split_top_level(inner)
            .into_iter()
            .filter(|field| !field.trim().is_empty())
            .map(|field| parse(field, aliases, depth))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(if fields.is_empty() {
            TypeDef::Unit
        } else {
            TypeDef::Tuple(fields)
        });
    }

    if let Some(inner) = name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
        let (elem, len) = inner
            .rsplit_once(';')
            .ok_or_else(|| invalid(name, "expected `[T; N]`"))?;
        let len = len
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid(name, "invalid array length"))?;
        return Ok(TypeDef::Array(Box::new(parse(elem, aliases, depth)?), len));
    }

    if let Some((outer, inner)) = name.split_once('<') {
        let inner = inner
            .strip_suffix('>')
            .ok_or_else(|| invalid(name, "unbalanced `<`"))?;
        let inner = parse(inner, aliases, depth)?;
        return match outer.trim() {
            "Vec" if inner.is_byte() => Ok(TypeDef::Bytes),
            "Vec" => Ok(TypeDef::Vec(Box::new(inner))),
            "Option" => Ok(TypeDef::Option(Box::new(inner))),
            "Box" => Ok(inner),
            "Compact" => match inner {
                TypeDef::Uint(width) => Ok(TypeDef::Compact(width)),
                _ => Err(invalid(name, "only unsigned integers can be compact")),
            },
            _ => Err(CodecError::UnknownType(name.to_string())),
        };
    }

    Ok(match name {
        "bool" => TypeDef::Bool,
        "u8" => TypeDef::Uint(Width::W8),
        "u16" => TypeDef::Uint(Width::W16),
        "u32" => TypeDef::Uint(Width::W32),
        "u64" => TypeDef::Uint(Width::W64),
        "u128" => TypeDef::Uint(Width::W128),
        "i8" => TypeDef::Int(Width::W8),
        "i16" => TypeDef::Int(Width::W16),
        "i32" => TypeDef::Int(Width::W32),
        "i64" => TypeDef::Int(Width::W64),
        "i128" => TypeDef::Int(Width::W128),
        "Bytes" => TypeDef::Bytes,
        "Text" | "String" | "str" => TypeDef::Text,
        _ => match aliases.get(name) {
            Some(target) => parse(target, aliases, depth + 1)?,
            None => return Err(CodecError::UnknownType(name.to_string())),
        },
    })
}

/// Splits on commas outside of any brackets.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '<' => depth += 1,
            ')' | ']' | '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            },
            _ => {},
        }
    }
    parts.push(&s[start..]);

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(name, target)| (name.to_string(), target.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_composites() {
        let none = BTreeMap::new();
        assert_eq!(resolve("Vec<u8>", &none), Ok(TypeDef::Bytes));
        assert_eq!(
            resolve("[u8; 32]", &none),
            Ok(TypeDef::Array(Box::new(TypeDef::Uint(Width::W8)), 32))
        );
        assert_eq!(
            resolve("(u32, Option<Vec<u16>>)", &none),
            Ok(TypeDef::Tuple(vec![
                TypeDef::Uint(Width::W32),
                TypeDef::Option(Box::new(TypeDef::Vec(Box::new(TypeDef::Uint(
                    Width::W16
                )))))
            ]))
        );
        assert_eq!(resolve("()", &none), Ok(TypeDef::Unit));
        assert_eq!(
            resolve("Compact<u128>", &none),
            Ok(TypeDef::Compact(Width::W128))
        );
    }

    #[test]
    fn test_resolve_aliases() {
        let aliases = aliases(&[("AccountId", "[u8; 32]"), ("Who", "AccountId")]);
        assert_eq!(
            resolve("(Who, u8)", &aliases),
            Ok(TypeDef::Tuple(vec![
                TypeDef::Array(Box::new(TypeDef::Uint(Width::W8)), 32),
                TypeDef::Uint(Width::W8)
            ]))
        );
    }

    #[test]
    fn test_resolve_failures() {
        let looping = aliases(&[("A", "B"), ("B", "A")]);
        assert!(matches!(
            resolve("A", &looping),
            Err(CodecError::AliasLoop(_))
        ));
        assert_eq!(
            resolve("Unknown", &looping),
            Err(CodecError::UnknownType("Unknown".to_string()))
        );
        assert!(matches!(
            resolve("Compact<i32>", &looping),
            Err(CodecError::InvalidTypeName { .. })
        ));
        assert!(matches!(
            resolve("[u8; x]", &looping),
            Err(CodecError::InvalidTypeName { .. })
        ));
        assert!(matches!(
            resolve("BTreeMap<u8, u8>", &looping),
            Err(CodecError::UnknownType(_))
        ));
    }
}
