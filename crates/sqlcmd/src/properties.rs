// ${Property} expansion and the property store commands write to.

use datastore::Value;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PROPERTY_TOKEN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expanded {
    pub text: String,
    /// Names of `${...}` tokens with no value; they are left in `text` as written.
    pub unresolved: Vec<String>,
}

/// Rewrites `${Name}` tokens using named values.
pub trait PropertyExpander {
    fn lookup(&self, name: &str) -> Option<String>;

    fn expand(&self, text: &str) -> Expanded {
        let mut unresolved = Vec::new();
        let Ok(token) = PROPERTY_TOKEN.as_ref() else {
            return Expanded {
                text: text.to_string(),
                unresolved,
            };
        };
        let text = token
            .replace_all(text, |caps: &Captures<'_>| {
                let name = caps[1].trim();
                match self.lookup(name) {
                    Some(value) => value,
                    None => {
                        unresolved.push(name.to_string());
                        caps[0].to_string()
                    }
                }
            })
            .into_owned();
        Expanded { text, unresolved }
    }
}

/// Named values shared between commands.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: BTreeMap<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        _ = self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PropertyExpander for Properties {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).map(Value::to_string)
    }
}
