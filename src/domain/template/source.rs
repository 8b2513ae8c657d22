// Argument sources and their normalization into a single name->value map

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::domain::value::Value;
use crate::error::TemplateError;

/// Merged name->value arguments
pub type Arguments = HashMap<String, Value>;

/// A single name/value pair
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArg {
    pub name: String,
    pub value: Value,
}

/// Shorthand for a [`NamedArg`]
pub fn named(name: impl Into<String>, value: impl Into<Value>) -> NamedArg {
    NamedArg {
        name: name.into(),
        value: value.into(),
    }
}

/// One input to [`Template::bind`](super::Template::bind)
///
/// Sources merge left to right; a later source overwrites earlier values for
/// the same name.
#[derive(Debug, Clone)]
pub enum ArgSource {
    /// Name->value mapping
    Map(Arguments),
    /// Single pair
    Named(NamedArg),
    /// Keyed collection; every key must be text
    Keyed(Vec<(Value, Value)>),
    /// Structured document; must be a JSON object (or null)
    Document(serde_json::Value),
    /// Skipped
    Absent,
}

impl ArgSource {
    /// Keyed collection whose keys are checked at merge time
    pub fn keyed<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        ArgSource::Keyed(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Serialize any structure (e.g. a `#[derive(Serialize)]` struct) into a document source
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, TemplateError> {
        serde_json::to_value(value)
            .map(ArgSource::Document)
            .map_err(|e| TemplateError::InvalidSource(e.to_string()))
    }

    fn merge_into(self, out: &mut Arguments) -> Result<(), TemplateError> {
        match self {
            ArgSource::Map(map) => out.extend(map),
            ArgSource::Named(arg) => {
                out.insert(arg.name, arg.value);
            }
            ArgSource::Keyed(pairs) => {
                for (key, value) in pairs {
                    match key {
                        Value::Text(name) => {
                            out.insert(name, value);
                        }
                        other => {
                            return Err(TemplateError::InvalidSource(format!(
                                "keys must be text, found {}",
                                other.kind()
                            )))
                        }
                    }
                }
            }
            ArgSource::Document(serde_json::Value::Object(object)) => {
                out.extend(object.into_iter().map(|(k, v)| (k, Value::from(v))));
            }
            ArgSource::Document(serde_json::Value::Null) | ArgSource::Absent => {}
            ArgSource::Document(other) => {
                return Err(TemplateError::InvalidSource(format!(
                    "structured source must be an object, found {}",
                    json_kind(&other)
                )))
            }
        }
        Ok(())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Merge sources left to right into one map
pub fn merge_sources<I, S>(sources: I) -> Result<Arguments, TemplateError>
where
    I: IntoIterator<Item = S>,
    S: Into<ArgSource>,
{
    let mut merged = Arguments::new();
    for source in sources {
        source.into().merge_into(&mut merged)?;
    }
    Ok(merged)
}

impl<V: Into<Value>> From<HashMap<String, V>> for ArgSource {
    fn from(map: HashMap<String, V>) -> Self {
        ArgSource::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for ArgSource {
    fn from(map: BTreeMap<String, V>) -> Self {
        ArgSource::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl From<NamedArg> for ArgSource {
    fn from(arg: NamedArg) -> Self {
        ArgSource::Named(arg)
    }
}

impl From<serde_json::Value> for ArgSource {
    fn from(document: serde_json::Value) -> Self {
        ArgSource::Document(document)
    }
}

impl<S: Into<ArgSource>> From<Option<S>> for ArgSource {
    fn from(source: Option<S>) -> Self {
        source.map(Into::into).unwrap_or(ArgSource::Absent)
    }
}
