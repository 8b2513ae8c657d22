// Error handling for named templates

use std::fmt;

/// Errors raised while compiling a template or binding its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// A single `{{token}}` had no provider
    UnresolvedToken(String),
    /// Several `{{token}}`s had no provider, in encounter order
    UnresolvedTokens(Vec<String>),
    /// A `:` not followed by a name; `position` is the character offset of the colon
    MalformedMarker { position: usize },
    /// A required argument was absent at bind time
    MissingArgument(String),
    /// An argument source could not be turned into a name->value mapping
    InvalidSource(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UnresolvedToken(token) => write!(f, "unknown token: {}", token),
            TemplateError::UnresolvedTokens(tokens) => {
                write!(f, "unknown tokens: {}", tokens.join(", "))
            }
            TemplateError::MalformedMarker { position } => write!(
                f,
                "named marker ':' without name (at position {})",
                position
            ),
            TemplateError::MissingArgument(name) => write!(f, "named arg '{}' missing", name),
            TemplateError::InvalidSource(reason) => {
                write!(f, "invalid argument source: {}", reason)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

impl TemplateError {
    /// Build the unresolved-token error for the collected names
    ///
    /// One name keeps the singular message; more than one lists them all.
    pub(crate) fn unresolved(mut tokens: Vec<String>) -> Option<Self> {
        match tokens.len() {
            0 => None,
            1 => tokens.pop().map(TemplateError::UnresolvedToken),
            _ => Some(TemplateError::UnresolvedTokens(tokens)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_singular_and_plural() {
        assert_eq!(TemplateError::unresolved(vec![]), None);

        let single = TemplateError::unresolved(vec!["foo".to_string()]).unwrap();
        assert_eq!(single.to_string(), "unknown token: foo");

        let many =
            TemplateError::unresolved(vec!["unknown token".to_string(), "another".to_string()])
                .unwrap();
        assert_eq!(many.to_string(), "unknown tokens: unknown token, another");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            TemplateError::MalformedMarker { position: 47 }.to_string(),
            "named marker ':' without name (at position 47)"
        );
        assert_eq!(
            TemplateError::MissingArgument("a".to_string()).to_string(),
            "named arg 'a' missing"
        );
        assert!(TemplateError::InvalidSource("keys must be text".to_string())
            .to_string()
            .starts_with("invalid argument source:"));
    }
}
