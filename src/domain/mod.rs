// Domain model: dialects, argument values and templates

pub mod dialect;
pub mod template;
pub mod value;

pub use dialect::Dialect;
pub use template::Template;
pub use value::Value;
