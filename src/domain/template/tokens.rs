// `{{token}}` substitution, run before marker parsing

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::TemplateError;

/// Replacement passes allowed for tokens that expand to further tokens
const MAX_TOKEN_PASSES: usize = 8;

/// Lookup capability consulted for each `{{token}}`
pub trait TokenProvider: Send + Sync {
    /// The replacement text, or `None` when this provider does not know the token
    fn resolve(&self, token: &str) -> Option<String>;
}

impl TokenProvider for HashMap<String, String> {
    fn resolve(&self, token: &str) -> Option<String> {
        self.get(token).cloned()
    }
}

impl TokenProvider for BTreeMap<String, String> {
    fn resolve(&self, token: &str) -> Option<String> {
        self.get(token).cloned()
    }
}

/// Adapts a closure into a [`TokenProvider`]
pub struct TokenFn<F>(pub F);

impl<F> TokenProvider for TokenFn<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn resolve(&self, token: &str) -> Option<String> {
        (self.0)(token)
    }
}

/// Ordered list of token providers; the first provider that knows a token wins
#[derive(Clone, Default)]
pub struct TokenSet {
    providers: Vec<Arc<dyn TokenProvider>>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.push(provider);
        self
    }

    pub fn push(&mut self, provider: impl TokenProvider + 'static) {
        self.providers.push(Arc::new(provider));
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn resolve(&self, token: &str) -> Option<String> {
        self.providers.iter().find_map(|p| p.resolve(token))
    }

    /// Replace every token span in `text`
    ///
    /// Repeats while replacements introduce new spans. Any token no provider
    /// knows fails the whole substitution.
    pub fn substitute(&self, text: &str) -> Result<String, TemplateError> {
        let mut current = text.to_string();

        for pass in 0..MAX_TOKEN_PASSES {
            let (replaced, unresolved) = self.substitute_once(&current);
            if let Some(err) = TemplateError::unresolved(unresolved) {
                return Err(err);
            }
            current = replaced;

            if find_token(&current, 0).is_none() {
                return Ok(current);
            }
            tracing::trace!(pass, "token replacement produced further tokens");
        }

        tracing::warn!(
            passes = MAX_TOKEN_PASSES,
            "token nesting too deep, leaving remaining spans as text"
        );
        Ok(current)
    }

    fn substitute_once(&self, text: &str) -> (String, Vec<String>) {
        let mut result = String::with_capacity(text.len());
        let mut unresolved = Vec::new();
        let mut last = 0;

        while let Some(span) = find_token(text, last) {
            result.push_str(&text[last..span.start]);
            match self.resolve(span.token) {
                Some(replacement) => result.push_str(&replacement),
                None => unresolved.push(span.token.to_string()),
            }
            last = span.end;
        }
        result.push_str(&text[last..]);

        (result, unresolved)
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("providers", &self.providers.len())
            .finish()
    }
}

struct TokenSpan<'a> {
    start: usize,
    end: usize,
    token: &'a str,
}

/// Leftmost `{{...}}` at or after byte offset `from`
///
/// The token runs to the first `}`, which must be doubled; otherwise the
/// search resumes one character past the opening brace.
fn find_token(text: &str, from: usize) -> Option<TokenSpan<'_>> {
    let mut search = from;
    while let Some(offset) = text[search..].find("{{") {
        let start = search + offset;
        let inner = start + 2;
        let close = inner + text[inner..].find('}')?;
        if text[close..].starts_with("}}") {
            return Some(TokenSpan {
                start,
                end: close + 2,
                token: &text[inner..close],
            });
        }
        search = start + 1;
    }
    None
}
