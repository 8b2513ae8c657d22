// Template module for named-argument statement templates
//
// This module provides token substitution, marker parsing, rendering for a
// placeholder dialect, and binding of named arguments to positional values.

mod ast;
mod binder;
mod named_template;
mod parser;
mod source;
mod tokens;

pub use ast::{ArgEntry, ArgInfo, DefaultFn, DefaultValue, Marker, TemplatePart};
pub use named_template::Template;
pub use parser::TemplateParser;
pub use source::{merge_sources, named, ArgSource, Arguments, NamedArg};
pub use tokens::{TokenFn, TokenProvider, TokenSet};
