//! String-to-leaf coercion.
//!
//! The target type is taken from the existing leaf: a `U16` leaf only ever
//! accepts a string that parses into a `u16`, and so on. Out-of-range input is
//! rejected, never wrapped. Float literals may name infinity or NaN, but a
//! finite literal that overflows the target width is an error.

use crate::tree::{ConfigTree, Scalar};
use std::fmt::Display;
use std::str::FromStr;

/// Element separator for list overrides.
pub const LIST_SEPARATOR: char = ',';

/// A raw environment value could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    /// The string is not a valid literal for the target type.
    #[error("cannot parse {value:?} as {kind}: {reason}")]
    Parse {
        /// Target type name.
        kind: &'static str,
        /// Offending input (a single element for list targets).
        value: String,
        /// Parser message.
        reason: String,
    },
    /// The target leaf has no coercion rule.
    #[error("overrides are not supported for {type_name} values")]
    Unsupported {
        /// Name of the unsupported node kind.
        type_name: &'static str,
    },
}

impl CoercionError {
    fn parse(kind: &'static str, value: &str, reason: impl Display) -> Self {
        Self::Parse {
            kind,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

/// Coerce `raw` into a node of the same type as `existing`.
pub fn coerce(existing: &ConfigTree, raw: &str) -> Result<ConfigTree, CoercionError> {
    match existing {
        ConfigTree::Scalar(scalar) => coerce_scalar(scalar, raw).map(ConfigTree::Scalar),
        ConfigTree::List(items) => coerce_list(items, raw),
        ConfigTree::Table(_) => Err(CoercionError::Unsupported {
            type_name: existing.type_name(),
        }),
    }
}

/// Coerce `raw` into a scalar of the same type as `existing`.
pub fn coerce_scalar(existing: &Scalar, raw: &str) -> Result<Scalar, CoercionError> {
    let kind = existing.type_name();
    let coerced = match existing {
        Scalar::Str(_) => Scalar::Str(raw.to_owned()),
        Scalar::Bool(_) => Scalar::Bool(parse_bool(raw)?),
        Scalar::I8(_) => Scalar::I8(parse_number(kind, raw)?),
        Scalar::I16(_) => Scalar::I16(parse_number(kind, raw)?),
        Scalar::I32(_) => Scalar::I32(parse_number(kind, raw)?),
        Scalar::I64(_) => Scalar::I64(parse_number(kind, raw)?),
        Scalar::U8(_) => Scalar::U8(parse_number(kind, raw)?),
        Scalar::U16(_) => Scalar::U16(parse_number(kind, raw)?),
        Scalar::U32(_) => Scalar::U32(parse_number(kind, raw)?),
        Scalar::U64(_) => Scalar::U64(parse_number(kind, raw)?),
        Scalar::F32(_) => Scalar::F32(parse_float(kind, raw, f32::is_infinite)?),
        Scalar::F64(_) => Scalar::F64(parse_float(kind, raw, f64::is_infinite)?),
    };
    Ok(coerced)
}

/// Split a list override into trimmed elements.
///
/// An empty (or blank) input yields a single empty element.
pub fn split_list(raw: &str) -> Vec<&str> {
    raw.trim().split(LIST_SEPARATOR).map(str::trim).collect()
}

fn coerce_list(existing: &[ConfigTree], raw: &str) -> Result<ConfigTree, CoercionError> {
    let element = list_element_kind(existing)?;
    let elements = split_list(raw);
    let items = match element {
        Some(template) => elements
            .into_iter()
            .map(|item| coerce_scalar(template, item).map(ConfigTree::Scalar))
            .collect::<Result<Vec<_>, _>>()?,
        None => elements
            .into_iter()
            .map(|item| ConfigTree::Scalar(Scalar::Str(item.to_owned())))
            .collect(),
    };
    Ok(ConfigTree::List(items))
}

// `Some` when every element is a scalar of one non-string kind.
fn list_element_kind(items: &[ConfigTree]) -> Result<Option<&Scalar>, CoercionError> {
    let mut first: Option<&Scalar> = None;
    let mut uniform = true;
    for item in items {
        let ConfigTree::Scalar(scalar) = item else {
            return Err(CoercionError::Unsupported {
                type_name: "nested list",
            });
        };
        match first {
            None => first = Some(scalar),
            Some(seen) if !seen.same_kind(scalar) => uniform = false,
            Some(_) => {},
        }
    }
    Ok(first.filter(|scalar| uniform && !matches!(scalar, Scalar::Str(_))))
}

fn parse_bool(raw: &str) -> Result<bool, CoercionError> {
    const TRUE: [&str; 3] = ["true", "t", "1"];
    const FALSE: [&str; 3] = ["false", "f", "0"];

    if TRUE.iter().any(|literal| raw.eq_ignore_ascii_case(literal)) {
        Ok(true)
    } else if FALSE.iter().any(|literal| raw.eq_ignore_ascii_case(literal)) {
        Ok(false)
    } else {
        Err(CoercionError::parse("bool", raw, "expected true/false, t/f or 1/0"))
    }
}

fn parse_number<N>(kind: &'static str, raw: &str) -> Result<N, CoercionError>
where
    N: FromStr,
    N::Err: Display,
{
    raw.parse::<N>()
        .map_err(|error| CoercionError::parse(kind, raw, error))
}

fn parse_float<F>(kind: &'static str, raw: &str, is_infinite: fn(F) -> bool) -> Result<F, CoercionError>
where
    F: FromStr + Copy,
    F::Err: Display,
{
    let value = parse_number::<F>(kind, raw)?;
    if is_infinite(value) && !names_infinity(raw) {
        Err(CoercionError::parse(kind, raw, "value out of range"))
    } else {
        Ok(value)
    }
}

fn names_infinity(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}
