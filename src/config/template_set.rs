use anyhow::{anyhow, bail, Context, Result};
use std::collections::BTreeMap;

use crate::{
    config::settings::{TemplateEntry, TemplateSettings},
    domain::{template::TokenSet, Dialect, Template, Value},
};

const DEFAULT_CONFIG_FILE: &str = "templates.yml";

/// TemplateSet holds every template declared in a settings file, compiled
/// for one dialect and addressable by name. Nested groups are flattened to
/// `group.name`.
#[derive(Debug)]
pub struct TemplateSet {
    dialect: Dialect,
    tokens: TokenSet,
    templates: BTreeMap<String, Template>,
}

impl TemplateSet {
    pub fn from_settings(settings: TemplateSettings) -> Result<Self> {
        Self::from_settings_with_tokens(settings, TokenSet::new(), None)
    }

    /// Build the set, consulting `tokens` before the file's own token table.
    /// `dialect` overrides the dialect named in the settings.
    pub fn from_settings_with_tokens(
        settings: TemplateSettings,
        tokens: TokenSet,
        dialect: Option<Dialect>,
    ) -> Result<Self> {
        let dialect = match (dialect, &settings.dialect) {
            (Some(dialect), _) => dialect,
            (None, Some(setting)) => setting.resolve().map_err(|e| anyhow!(e))?,
            (None, None) => Dialect::default(),
        };

        let tokens = if settings.tokens.is_empty() {
            tokens
        } else {
            tokens.with(settings.tokens)
        };

        let mut set = Self {
            dialect,
            tokens: tokens.clone(),
            templates: BTreeMap::new(),
        };
        set.add_entries(settings.templates, None, &tokens)?;

        tracing::debug!(
            templates = set.templates.len(),
            has_tokens = !tokens.is_empty(),
            "loaded template set"
        );
        Ok(set)
    }

    pub fn load(maybe_yml: Option<&str>) -> Result<Self> {
        Self::load_with_tokens(maybe_yml, TokenSet::new(), None)
    }

    pub fn load_with_tokens(
        maybe_yml: Option<&str>,
        tokens: TokenSet,
        dialect: Option<Dialect>,
    ) -> Result<Self> {
        let path = maybe_yml.unwrap_or(DEFAULT_CONFIG_FILE);
        let yml = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read template file {}", path))?;
        let settings: TemplateSettings = serde_yaml::from_str(&yml)
            .with_context(|| format!("Invalid yaml configuration in {}", path))?;
        Self::from_settings_with_tokens(settings, tokens, dialect)
    }

    fn add_entries(
        &mut self,
        entries: Vec<TemplateEntry>,
        prefix: Option<&str>,
        tokens: &TokenSet,
    ) -> Result<()> {
        for entry in entries {
            let name = match prefix {
                Some(prefix) => format!("{}.{}", prefix, entry.name),
                None => entry.name.clone(),
            };

            match (&entry.sql, entry.nested) {
                (Some(sql), None) => {
                    let mut template = Template::compile(sql, self.dialect.clone(), tokens.clone())
                        .with_context(|| format!("Invalid template '{}'", name))?;
                    apply_policies(&mut template, &name, &entry.omissible, entry.defaults, &entry.nullable)?;
                    self.insert(name, template)?;
                }
                (None, Some(nested)) => self.add_entries(nested, Some(&name), tokens)?,
                _ => bail!(
                    "Template '{}' must have exactly one of 'sql' or 'nested'",
                    name
                ),
            }
        }
        Ok(())
    }

    fn insert(&mut self, name: String, template: Template) -> Result<()> {
        if self.templates.contains_key(&name) {
            bail!("Duplicate template name: {}", name);
        }
        self.templates.insert(name, template);
        Ok(())
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Explicit tokens followed by the file's token table
    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(name, t)| (name.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Apply per-entry policies; naming an argument the template lacks is an error
fn apply_policies(
    template: &mut Template,
    name: &str,
    omissible: &[String],
    defaults: BTreeMap<String, serde_json::Value>,
    nullable: &[String],
) -> Result<()> {
    let unknown = omissible
        .iter()
        .chain(defaults.keys())
        .chain(nullable.iter())
        .find(|arg| template.arg(arg).is_none());
    if let Some(arg) = unknown {
        bail!("Template '{}' has no argument named '{}'", name, arg);
    }

    if !omissible.is_empty() {
        let names: Vec<&str> = omissible.iter().map(String::as_str).collect();
        template.set_omissible(&names);
    }
    for (arg, value) in defaults {
        template.set_default(&arg, Value::from(value));
    }
    let names: Vec<&str> = nullable.iter().map(String::as_str).collect();
    template.set_nullable_string(&names);
    Ok(())
}
