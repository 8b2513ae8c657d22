// Compiled named templates: rendered statement plus argument registry

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::dialect::Dialect;
use crate::domain::value::Value;
use crate::error::TemplateError;

use super::ast::{ArgEntry, ArgInfo, DefaultValue, TemplatePart};
use super::parser::TemplateParser;
use super::tokens::TokenSet;

/// A statement template with named arguments, compiled for one dialect
///
/// ```
/// use named_template::{Dialect, Template, TokenSet};
///
/// let template = Template::compile(
///     "INSERT INTO t (a, b, c) VALUES(:x, :y, :x)",
///     Dialect::DOLLAR_NUMBERED,
///     TokenSet::new(),
/// )
/// .unwrap();
/// assert_eq!(template.statement(), "INSERT INTO t (a, b, c) VALUES($1, $2, $1)");
/// assert_eq!(template.args_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    original: String,
    statement: String,
    parts: Vec<TemplatePart>,
    args: BTreeMap<String, ArgEntry>,
    args_count: usize,
    dialect: Dialect,
    tokens: TokenSet,
}

struct Rendered {
    statement: String,
    args: BTreeMap<String, ArgEntry>,
    args_count: usize,
}

/// Lay out tags and positions for the parsed parts under `dialect`
fn render(parts: &[TemplatePart], dialect: &Dialect) -> Rendered {
    let mut statement = String::new();
    let mut args: BTreeMap<String, ArgEntry> = BTreeMap::new();
    let mut args_count = 0;

    for part in parts {
        match part {
            TemplatePart::Literal(s) => statement.push_str(s),
            TemplatePart::Marker(marker) => match args.get_mut(&marker.name) {
                Some(entry) => {
                    entry.promote_omissible(marker.omissible);
                    if !dialect.numbered {
                        entry.positions.push(args_count);
                        args_count += 1;
                    }
                    statement.push_str(&entry.tag);
                }
                None => {
                    // numbered dialects allocate one slot per name, so the
                    // running count is also the distinct-name count
                    let tag = dialect.tag(args_count + 1);
                    statement.push_str(&tag);
                    args.insert(
                        marker.name.clone(),
                        ArgEntry::new(tag, args_count, marker.omissible),
                    );
                    args_count += 1;
                }
            },
        }
    }

    Rendered {
        statement,
        args,
        args_count,
    }
}

impl Template {
    /// Compile with the default dialect and no token providers
    pub fn new(text: &str) -> Result<Self, TemplateError> {
        Self::compile(text, Dialect::default(), TokenSet::new())
    }

    /// Resolve tokens, parse markers and render the statement for `dialect`
    pub fn compile(text: &str, dialect: Dialect, tokens: TokenSet) -> Result<Self, TemplateError> {
        let original = tokens.substitute(text)?;
        let parts = TemplateParser::parse(&original)?;
        let rendered = render(&parts, &dialect);

        tracing::debug!(
            names = rendered.args.len(),
            positions = rendered.args_count,
            numbered = dialect.numbered,
            "compiled template"
        );

        Ok(Self {
            original,
            statement: rendered.statement,
            parts,
            args: rendered.args,
            args_count: rendered.args_count,
            dialect,
            tokens,
        })
    }

    /// The statement to hand to the driver
    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// The template text after token substitution, markers intact
    pub fn original_statement(&self) -> &str {
        &self.original
    }

    /// Number of positional values the statement expects
    pub fn args_count(&self) -> usize {
        self.args_count
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn arg(&self, name: &str) -> Option<&ArgEntry> {
        self.args.get(name)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&String, &ArgEntry)> {
        self.args.iter()
    }

    /// Mark arguments as omissible; no names marks every argument
    pub fn set_omissible(&mut self, names: &[&str]) -> &mut Self {
        if names.is_empty() {
            for entry in self.args.values_mut() {
                entry.promote_omissible(true);
            }
        } else {
            for name in names {
                if let Some(entry) = self.entry_mut(name) {
                    entry.promote_omissible(true);
                }
            }
        }
        self
    }

    /// Use `value` when `name` is not supplied; also makes `name` omissible
    pub fn set_default(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.put_default(name, DefaultValue::Fixed(value.into()))
    }

    /// Compute the value for an omitted `name` on every bind; also makes `name` omissible
    pub fn set_default_fn<F>(&mut self, name: &str, provider: F) -> &mut Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.put_default(name, DefaultValue::Provider(Arc::new(provider)))
    }

    fn put_default(&mut self, name: &str, default: DefaultValue) -> &mut Self {
        if let Some(entry) = self.entry_mut(name) {
            entry.promote_omissible(true);
            entry.default = Some(default);
        }
        self
    }

    /// Bind empty text for these arguments as null
    pub fn set_nullable_string(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            if let Some(entry) = self.entry_mut(name) {
                entry.nullable_string = true;
            }
        }
        self
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut ArgEntry> {
        let entry = self.args.get_mut(name);
        if entry.is_none() {
            tracing::debug!(name, "ignoring policy for unknown argument");
        }
        entry
    }

    /// Argument names mapped to whether they are omissible
    pub fn arg_names(&self) -> BTreeMap<String, bool> {
        self.args
            .iter()
            .map(|(name, entry)| (name.clone(), entry.omissible))
            .collect()
    }

    /// Snapshot of every argument's registry entry
    pub fn args_info(&self) -> BTreeMap<String, ArgInfo> {
        self.args
            .iter()
            .map(|(name, entry)| (name.clone(), entry.info()))
            .collect()
    }

    /// Same template under another dialect, argument policies carried over
    pub fn clone_with(&self, dialect: Dialect) -> Template {
        if dialect == self.dialect {
            return self.clone();
        }

        let rendered = render(&self.parts, &dialect);
        let mut result = Template {
            original: self.original.clone(),
            statement: rendered.statement,
            parts: self.parts.clone(),
            args: rendered.args,
            args_count: rendered.args_count,
            dialect,
            tokens: self.tokens.clone(),
        };
        self.copy_policies_to(&mut result);
        result
    }

    /// New template from this one's text followed by `text`
    ///
    /// The combination is compiled from scratch; omissible, default and
    /// nullable settings carry over for names that still exist.
    pub fn append(&self, text: &str) -> Result<Template, TemplateError> {
        let combined = format!("{}{}", self.original, text);
        let mut result = Template::compile(&combined, self.dialect.clone(), self.tokens.clone())?;
        self.copy_policies_to(&mut result);
        Ok(result)
    }

    fn copy_policies_to(&self, other: &mut Template) {
        for (name, entry) in &self.args {
            if let Some(target) = other.args.get_mut(name) {
                entry.copy_policy_to(target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgres(text: &str) -> Template {
        Template::compile(text, Dialect::DOLLAR_NUMBERED, TokenSet::new()).unwrap()
    }

    #[test]
    fn test_compile_non_numbered_repeats() {
        let template = Template::new("INSERT INTO t (a,b,c) VALUES(:x, :y, :x)").unwrap();
        assert_eq!(template.statement(), "INSERT INTO t (a,b,c) VALUES(?, ?, ?)");
        assert_eq!(template.args_count(), 3);
        assert_eq!(template.arg("x").unwrap().positions(), &[0, 2]);
        assert_eq!(template.arg("y").unwrap().positions(), &[1]);
    }

    #[test]
    fn test_compile_numbered_repeats() {
        let template = postgres("INSERT INTO t (a,b,c) VALUES(:x, :y, :x)");
        assert_eq!(template.statement(), "INSERT INTO t (a,b,c) VALUES($1, $2, $1)");
        assert_eq!(template.args_count(), 2);
        assert_eq!(template.arg("x").unwrap().tag(), "$1");
        assert_eq!(template.arg("x").unwrap().positions(), &[0]);
        assert_eq!(template.arg("y").unwrap().tag(), "$2");
    }

    #[test]
    fn test_positions_cover_every_slot_once() {
        let template = Template::new(":a :b :a :c :b :a").unwrap();
        let mut seen: Vec<usize> = template
            .entries()
            .flat_map(|(_, entry)| entry.positions().to_vec())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..template.args_count()).collect::<Vec<_>>());
    }

    #[test]
    fn test_omissible_promoted_by_any_occurrence() {
        let template = Template::new("(:a, :a?, :a)").unwrap();
        assert!(template.arg("a").unwrap().is_omissible());

        let template = postgres("(:a?, :a)");
        assert!(template.arg("a").unwrap().is_omissible());
    }

    #[test]
    fn test_escapes_take_no_position() {
        let template = Template::new("SELECT :a, '::b', ::").unwrap();
        assert_eq!(template.statement(), "SELECT ?, ':b', :");
        assert_eq!(template.args_count(), 1);
        assert_eq!(template.original_statement(), "SELECT :a, '::b', ::");
    }

    #[test]
    fn test_tokens_resolved_before_markers() {
        let mut tokens = std::collections::HashMap::new();
        tokens.insert("table".to_string(), "foo".to_string());
        tokens.insert("arg".to_string(), "a".to_string());
        let template = Template::compile(
            "UPDATE {{table}} SET x = :{{arg}}",
            Dialect::DOLLAR_NUMBERED,
            TokenSet::new().with(tokens),
        )
        .unwrap();
        assert_eq!(template.statement(), "UPDATE foo SET x = $1");
        assert_eq!(template.original_statement(), "UPDATE foo SET x = :a");
    }

    #[test]
    fn test_compile_errors() {
        let err = Template::new("SELECT {{foo}}").unwrap_err();
        assert_eq!(err, TemplateError::UnresolvedToken("foo".to_string()));

        let err = Template::new("SELECT : ").unwrap_err();
        assert_eq!(err, TemplateError::MalformedMarker { position: 7 });
    }

    #[test]
    fn test_set_omissible_all_and_named() {
        let mut template = Template::new(":a :b :c").unwrap();
        template.set_omissible(&["b", "unknown"]);
        let names = template.arg_names();
        assert_eq!(names.len(), 3);
        assert!(!names["a"]);
        assert!(names["b"]);

        template.set_omissible(&[]);
        assert!(template.arg_names().values().all(|omissible| *omissible));
    }

    #[test]
    fn test_set_default_makes_omissible() {
        let mut template = Template::new(":a :b").unwrap();
        template.set_default("a", "x").set_nullable_string(&["b"]);

        let info = template.args_info();
        assert!(info["a"].omissible);
        assert!(info["a"].has_default);
        assert!(!info["a"].nullable_string);
        assert!(!info["b"].omissible);
        assert!(info["b"].nullable_string);
    }

    #[test]
    fn test_args_info_is_snapshot() {
        let template = Template::new(":a").unwrap();
        let mut info = template.args_info();
        info.get_mut("a").unwrap().omissible = true;
        assert!(!template.arg("a").unwrap().is_omissible());
    }

    #[test]
    fn test_clone_with_same_dialect() {
        let mut template = Template::new("VALUES (:a, :b, :a)").unwrap();
        template.set_default("a", "a default").set_nullable_string(&["a"]);

        let cloned = template.clone_with(Dialect::QUESTION_MARK);
        assert_eq!(cloned.statement(), template.statement());
        assert_eq!(cloned.args_info(), template.args_info());
    }

    #[test]
    fn test_clone_with_other_dialect() {
        let mut template = Template::new("VALUES (:a, :b, :a)").unwrap();
        template
            .set_default("a", "a default")
            .set_omissible(&["b"])
            .set_nullable_string(&["a"]);

        let cloned = template.clone_with(Dialect::DOLLAR_NUMBERED);
        assert_eq!(cloned.statement(), "VALUES ($1, $2, $1)");
        assert_eq!(cloned.args_count(), 2);

        let info = cloned.args_info();
        assert_eq!(info["a"].tag, "$1");
        assert_eq!(info["b"].tag, "$2");
        assert!(info["a"].omissible && info["b"].omissible);
        assert!(info["a"].has_default && !info["b"].has_default);
        assert!(info["a"].nullable_string && !info["b"].nullable_string);

        // source untouched
        assert_eq!(template.statement(), "VALUES (?, ?, ?)");
    }

    #[test]
    fn test_append() {
        let mut template = Template::new("SELECT * FROM table WHERE col_a = :a").unwrap();
        template.set_omissible(&["a"]);

        let appended = template.append(" AND col_b = :b").unwrap();
        assert_eq!(
            appended.statement(),
            "SELECT * FROM table WHERE col_a = ? AND col_b = ?"
        );
        let names = appended.arg_names();
        assert_eq!(names.get("a"), Some(&true));
        assert_eq!(names.get("b"), Some(&false));
        assert_eq!(appended.arg("a").unwrap().positions(), &[0]);
        assert_eq!(appended.arg("b").unwrap().positions(), &[1]);

        assert!(template.append(" AND col_b = : not valid name").is_err());
        assert_eq!(template.statement(), "SELECT * FROM table WHERE col_a = ?");
    }

    #[test]
    fn test_append_resolves_tokens() {
        let mut tokens = std::collections::HashMap::new();
        tokens.insert("col".to_string(), "col_b".to_string());
        let template =
            Template::compile("WHERE a = :a", Dialect::DOLLAR_NUMBERED, TokenSet::new().with(tokens))
                .unwrap();

        let appended = template.append(" AND {{col}} = :b OR a = :a").unwrap();
        assert_eq!(appended.statement(), "WHERE a = $1 AND col_b = $2 OR a = $1");
        assert!(template.append(" AND {{missing}} = 1").is_err());
    }
}
