//! Coercion of user-supplied routine arguments to their declared SQL types.

use crate::error::CoercionError;
use crate::signature::RoutineSignature;

use datastore::BindValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionKind {
    /// Single-precision float.
    Float,
    /// 32-bit integer.
    Integer,
    /// Passed through as a string with one layer of single quotes removed.
    Text,
    /// Always fails.
    Unsupported,
}

const TYPE_ALIASES: &[(&str, CoercionKind)] = &[
    ("DECIMAL", CoercionKind::Float),
    ("FLOAT", CoercionKind::Float),
    ("FLOAT4", CoercionKind::Float),
    ("FLOAT8", CoercionKind::Float),
    ("REAL", CoercionKind::Float),
    ("INT", CoercionKind::Integer),
    ("INTEGER", CoercionKind::Integer),
    ("INT2", CoercionKind::Integer),
    ("INT4", CoercionKind::Integer),
    ("VARCHAR", CoercionKind::Text),
    ("TEXT", CoercionKind::Text),
    ("LONGVARCHAR", CoercionKind::Text),
    ("TIMESTAMP", CoercionKind::Text),
];

impl CoercionKind {
    /// Looks up a declared type, ignoring case and any `(precision, scale)` suffix.
    pub fn for_type(declared_type: &str) -> Self {
        let base = declared_type
            .split('(')
            .next()
            .unwrap_or(declared_type)
            .trim();
        TYPE_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(base))
            .map_or(CoercionKind::Unsupported, |(_, kind)| *kind)
    }
}

/// Removes one leading and one trailing `'`, each independently.
pub fn strip_single_quotes(value: &str) -> &str {
    let value = value.strip_prefix('\'').unwrap_or(value);
    value.strip_suffix('\'').unwrap_or(value)
}

pub fn coerce(parameter: &str, declared_type: &str, raw: &str) -> Result<BindValue, CoercionError> {
    let invalid = || CoercionError::InvalidValue {
        parameter: parameter.to_string(),
        value: raw.to_string(),
        declared_type: declared_type.to_string(),
    };

    match CoercionKind::for_type(declared_type) {
        CoercionKind::Float => raw
            .trim()
            .parse::<f32>()
            .map(BindValue::Float)
            .map_err(|_| invalid()),
        CoercionKind::Integer => raw
            .trim()
            .parse::<i32>()
            .map(BindValue::Int)
            .map_err(|_| invalid()),
        CoercionKind::Text => Ok(BindValue::Text(strip_single_quotes(raw).to_string())),
        CoercionKind::Unsupported => Err(CoercionError::UnsupportedType {
            parameter: parameter.to_string(),
            value: raw.to_string(),
            declared_type: declared_type.to_string(),
        }),
    }
}

/// Coerces `values` for every parameter of `signature`, in declaration order.
///
/// Either every parameter binds or nothing does: all failures are returned
/// together so each can be reported.
pub fn bind_parameters(
    signature: &RoutineSignature,
    values: &BTreeMap<String, String>,
) -> Result<Vec<BindValue>, Vec<CoercionError>> {
    let mut bound = Vec::with_capacity(signature.parameters().len());
    let mut errors = Vec::new();

    for param in signature.parameters() {
        let Some(raw) = values.get(&param.name) else {
            errors.push(CoercionError::MissingValue {
                parameter: param.name.clone(),
                declared_type: param.declared_type.clone(),
            });
            continue;
        };
        match coerce(&param.name, &param.declared_type, raw) {
            Ok(value) => bound.push(value),
            Err(err) => errors.push(err),
        }
    }

    if errors.is_empty() {
        Ok(bound)
    } else {
        Err(errors)
    }
}
