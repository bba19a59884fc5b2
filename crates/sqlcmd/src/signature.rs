//! Routine signatures of the form `name(p1 t1, p2 t2) -> returnType`.
//!
//! Parameter types may carry their own parenthesised arguments, as in
//! `DECIMAL(10,2)`; commas inside those parentheses do not separate
//! parameters.

use crate::error::SignatureError;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub declared_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineSignature {
    name: String,
    parameters: Vec<Parameter>,
    return_type: Option<String>,
}

impl RoutineSignature {
    pub fn parse(text: &str) -> Result<Self, SignatureError> {
        let signature = text.trim();
        if signature.is_empty() {
            return Err(SignatureError::Blank);
        }

        let open = signature
            .find('(')
            .ok_or_else(|| SignatureError::MissingParenthesis {
                signature: signature.to_string(),
            })?;
        let close = matching_paren(signature, open).ok_or_else(|| SignatureError::Unbalanced {
            signature: signature.to_string(),
        })?;

        let name = signature[..open].trim();
        if name.is_empty() {
            return Err(SignatureError::MissingName {
                signature: signature.to_string(),
            });
        }

        let return_type = parse_return_type(signature, &signature[close + 1..])?;

        let mut parameters: Vec<Parameter> = Vec::new();
        let inner = &signature[open + 1..close];
        if !inner.trim().is_empty() {
            for token in split_top_level(inner) {
                let token = token.trim();
                if token.is_empty() {
                    return Err(SignatureError::EmptyParameter {
                        signature: signature.to_string(),
                    });
                }
                let (pname, ptype) = token.split_once(char::is_whitespace).ok_or_else(|| {
                    SignatureError::MissingType {
                        signature: signature.to_string(),
                        parameter: token.to_string(),
                    }
                })?;
                if parameters.iter().any(|p| p.name == pname) {
                    return Err(SignatureError::DuplicateParameter {
                        signature: signature.to_string(),
                        parameter: pname.to_string(),
                    });
                }
                parameters.push(Parameter {
                    name: pname.to_string(),
                    declared_type: ptype.trim().to_string(),
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            parameters,
            return_type,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn parameter_types(&self) -> BTreeMap<&str, &str> {
        self.parameters
            .iter()
            .map(|p| (p.name.as_str(), p.declared_type.as_str()))
            .collect()
    }

    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }
}

impl fmt::Display for RoutineSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.name, p.declared_type))
            .collect();
        write!(f, "{}({})", self.name, params.join(", "))?;
        if let Some(ret) = &self.return_type {
            write!(f, " -> {ret}")?;
        }
        Ok(())
    }
}

fn parse_return_type(signature: &str, rest: &str) -> Result<Option<String>, SignatureError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(None);
    }
    match rest.strip_prefix("->").map(str::trim) {
        Some(ret) if !ret.is_empty() => Ok(Some(ret.to_string())),
        _ => Err(SignatureError::TrailingText {
            signature: signature.to_string(),
            text: rest.to_string(),
        }),
    }
}

/// Byte index of the `)` closing the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
