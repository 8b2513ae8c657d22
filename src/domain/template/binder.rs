// Argument binding: named arguments to positional values

use crate::domain::value::Value;
use crate::error::TemplateError;

use super::named_template::Template;
use super::source::{merge_sources, ArgSource, Arguments};

impl Template {
    /// Convert named argument sources into the positional values the statement expects
    ///
    /// A required argument missing from every source is an error. Omissible
    /// arguments fall back to their default, or to `Null` without one.
    pub fn bind<I, S>(&self, sources: I) -> Result<Vec<Value>, TemplateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<ArgSource>,
    {
        let args = merge_sources(sources)?;
        self.bind_map(&args)
    }

    /// Same as [`Template::bind`] for an already merged map
    pub fn bind_map(&self, args: &Arguments) -> Result<Vec<Value>, TemplateError> {
        let mut out = vec![Value::Null; self.args_count()];

        for (name, entry) in self.entries() {
            let value = match args.get(name) {
                Some(value) => entry.effective(value.clone()),
                None if !entry.is_omissible() => {
                    return Err(TemplateError::MissingArgument(name.clone()));
                }
                None => match &entry.default {
                    Some(default) => entry.effective(default.resolve(name)),
                    None => continue,
                },
            };

            for &position in entry.positions() {
                out[position] = value.clone();
            }
        }

        tracing::trace!(supplied = args.len(), positions = out.len(), "bound arguments");
        Ok(out)
    }
}
