// Placeholder dialects for rendered statements

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;

/// How argument markers are rendered in the final statement
///
/// A non-numbered dialect emits the bare prefix for every occurrence (`?, ?, ?`),
/// so a repeated name owns several positions. A numbered dialect appends the
/// argument's ordinal (`$1, $2, $1`), so a repeated name reuses its tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dialect {
    #[serde(default)]
    pub numbered: bool,
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: Cow<'static, str>,
}

fn default_tag_prefix() -> Cow<'static, str> {
    Cow::Borrowed("?")
}

impl Dialect {
    /// `?, ?, ?` (MySQL, SQLite)
    pub const QUESTION_MARK: Dialect = Dialect {
        numbered: false,
        tag_prefix: Cow::Borrowed("?"),
    };

    /// `$1, $2, $3` (PostgreSQL)
    pub const DOLLAR_NUMBERED: Dialect = Dialect {
        numbered: true,
        tag_prefix: Cow::Borrowed("$"),
    };

    pub fn new(numbered: bool, tag_prefix: impl Into<String>) -> Self {
        Self {
            numbered,
            tag_prefix: Cow::Owned(tag_prefix.into()),
        }
    }

    /// Look up a preset by driver name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mysql" | "sqlite" | "question" => Some(Self::QUESTION_MARK),
            "postgres" | "postgresql" | "pg" | "dollar" => Some(Self::DOLLAR_NUMBERED),
            _ => None,
        }
    }

    /// Tag for the argument with the given 1-based ordinal
    pub(crate) fn tag(&self, ordinal: usize) -> String {
        if self.numbered {
            format!("{}{}", self.tag_prefix, ordinal)
        } else {
            self.tag_prefix.to_string()
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::QUESTION_MARK
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            format!(
                "Unknown dialect '{}'. Must be one of: mysql, sqlite, postgres",
                s
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let dialect = Dialect::default();
        assert!(!dialect.numbered);
        assert_eq!(dialect.tag_prefix, "?");
    }

    #[test]
    fn test_presets() {
        assert_eq!(Dialect::from_name("MySQL"), Some(Dialect::QUESTION_MARK));
        assert_eq!(Dialect::from_name("postgres"), Some(Dialect::DOLLAR_NUMBERED));
        assert_eq!(Dialect::from_name("oracle"), None);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_tags() {
        assert_eq!(Dialect::QUESTION_MARK.tag(3), "?");
        assert_eq!(Dialect::DOLLAR_NUMBERED.tag(3), "$3");
        assert_eq!(Dialect::new(true, "?").tag(2), "?2");
    }

    #[test]
    fn test_deserialize_custom() {
        let dialect: Dialect = serde_yaml::from_str("numbered: true\ntag_prefix: '@p'").unwrap();
        assert_eq!(dialect, Dialect::new(true, "@p"));

        let dialect: Dialect = serde_yaml::from_str("numbered: true").unwrap();
        assert_eq!(dialect.tag_prefix, "?");
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: Result<Dialect, _> = serde_yaml::from_str("prefix: '@'");
        assert!(result.is_err());
    }
}
