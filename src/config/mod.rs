// Configuration: template sets declared in YAML

pub mod settings;
pub mod template_set;

pub use settings::{DialectSetting, TemplateEntry, TemplateSettings};
pub use template_set::TemplateSet;
