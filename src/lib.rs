// Named-argument statement templates
//
// Write statements with `:name` markers and `{{token}}` substitutions; get
// back driver-ready text with positional placeholders, and bind arguments by
// name into the positional order the statement expects.

pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;

pub use config::TemplateSet;
pub use domain::template::{
    merge_sources, named, ArgInfo, ArgSource, Arguments, NamedArg, TokenFn, TokenProvider,
    TokenSet,
};
pub use domain::{Dialect, Template, Value};
pub use error::TemplateError;
