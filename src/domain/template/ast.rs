// Parsed template parts and the per-argument registry entries

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::domain::value::Value;

/// A template consists of literal text and argument markers
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Literal(String),
    Marker(Marker),
}

/// A `:name` or `:name?` occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub omissible: bool,
}

impl Marker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            omissible: false,
        }
    }

    pub fn with_omissible(mut self, omissible: bool) -> Self {
        self.omissible = omissible;
        self
    }
}

/// Provider signature for computed defaults; receives the argument name
pub type DefaultFn = dyn Fn(&str) -> Value + Send + Sync;

/// Value used for an omitted argument
#[derive(Clone)]
pub enum DefaultValue {
    Fixed(Value),
    /// Evaluated on every bind
    Provider(Arc<DefaultFn>),
}

impl DefaultValue {
    pub fn resolve(&self, name: &str) -> Value {
        match self {
            DefaultValue::Fixed(value) => value.clone(),
            DefaultValue::Provider(provider) => provider(name),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            DefaultValue::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Registry entry for one distinct argument name
#[derive(Debug, Clone)]
pub struct ArgEntry {
    pub(crate) tag: String,
    pub(crate) positions: Vec<usize>,
    pub(crate) omissible: bool,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) nullable_string: bool,
}

impl ArgEntry {
    pub(crate) fn new(tag: String, position: usize, omissible: bool) -> Self {
        Self {
            tag,
            positions: vec![position],
            omissible,
            default: None,
            nullable_string: false,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn is_omissible(&self) -> bool {
        self.omissible
    }

    /// Once omissible, an entry stays omissible
    pub(crate) fn promote_omissible(&mut self, omissible: bool) {
        self.omissible |= omissible;
    }

    /// Carry omissible/default/nullable policy onto an entry of a derived template
    pub(crate) fn copy_policy_to(&self, other: &mut ArgEntry) {
        other.promote_omissible(self.omissible);
        if self.default.is_some() {
            other.default = self.default.clone();
        }
        other.nullable_string |= self.nullable_string;
    }

    /// Apply the nullable-string rule to a resolved value
    pub(crate) fn effective(&self, value: Value) -> Value {
        if self.nullable_string && value.is_empty_text() {
            Value::Null
        } else {
            value
        }
    }

    pub(crate) fn info(&self) -> ArgInfo {
        ArgInfo {
            tag: self.tag.clone(),
            positions: self.positions.clone(),
            omissible: self.omissible,
            has_default: self.default.is_some(),
            nullable_string: self.nullable_string,
        }
    }
}

/// Snapshot of an argument's registry entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgInfo {
    pub tag: String,
    pub positions: Vec<usize>,
    pub omissible: bool,
    pub has_default: bool,
    pub nullable_string: bool,
}
