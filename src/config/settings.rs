use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::Dialect;

/// Top-level layout of a templates YAML file
#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct TemplateSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<DialectSetting>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tokens: BTreeMap<String, String>,
    #[serde(default)]
    pub templates: Vec<TemplateEntry>,
}

/// Either a preset name (`postgres`) or a spelled-out dialect
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum DialectSetting {
    Named(String),
    Custom(Dialect),
}

impl DialectSetting {
    pub fn resolve(&self) -> Result<Dialect, String> {
        match self {
            DialectSetting::Named(name) => name.parse(),
            DialectSetting::Custom(dialect) => Ok(dialect.clone()),
        }
    }
}

/// One named template, or a group of nested ones
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct TemplateEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub omissible: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nullable: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<Vec<TemplateEntry>>,
}
