// Command-line wiring for the named-template binary

use anyhow::{anyhow, bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::json;
use std::collections::HashMap;

use crate::{db, ArgSource, Dialect, Template, TemplateSet, TokenSet};

const DEFAULT_DATABASE: &str = "named-template.db";

fn template_arg() -> Arg {
    Arg::new("template")
        .value_name("TEMPLATE")
        .required(true)
        .help("Template text, or the name of a template in --config")
}

fn args_arg() -> Arg {
    Arg::new("args")
        .short('a')
        .long("args")
        .value_name("JSON")
        .default_value("{}")
        .help("Named arguments as a JSON object")
}

pub fn command() -> Command {
    Command::new("named-template")
        .about("Translate :name statement templates into positional statements")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("CONFIG")
                .help("Path to a YAML file containing templates"),
        )
        .arg(
            Arg::new("dialect")
                .short('d')
                .long("dialect")
                .value_name("DIALECT")
                .help("Placeholder dialect: mysql, sqlite or postgres"),
        )
        .arg(
            Arg::new("token")
                .short('t')
                .long("token")
                .value_name("KEY=VALUE")
                .action(ArgAction::Append)
                .help("Replacement for {{KEY}} tokens"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("render")
                .about("Print the rendered statement and its arguments")
                .arg(template_arg()),
        )
        .subcommand(
            Command::new("bind")
                .about("Print the positional values for the given named arguments")
                .arg(template_arg())
                .arg(args_arg()),
        )
        .subcommand(
            Command::new("exec")
                .about("Execute the template against a SQLite database")
                .arg(template_arg())
                .arg(args_arg())
                .arg(
                    Arg::new("database")
                        .long("database")
                        .value_name("DATABASE")
                        .default_value(DEFAULT_DATABASE)
                        .help("Path to SQLite database file"),
                ),
        )
        .subcommand(Command::new("list").about("List the templates in --config"))
}

fn parse_tokens(matches: &ArgMatches) -> Result<TokenSet> {
    let mut tokens = HashMap::new();
    for pair in matches.get_many::<String>("token").into_iter().flatten() {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid token '{}', expected KEY=VALUE", pair))?;
        tokens.insert(key.to_string(), value.to_string());
    }
    Ok(if tokens.is_empty() {
        TokenSet::new()
    } else {
        TokenSet::new().with(tokens)
    })
}

fn parse_args(matches: &ArgMatches) -> Result<ArgSource> {
    let raw = matches
        .get_one::<String>("args")
        .map(String::as_str)
        .unwrap_or("{}");
    let document: serde_json::Value =
        serde_json::from_str(raw).context("Invalid --args JSON")?;
    Ok(ArgSource::Document(document))
}

/// Global options resolved once per invocation
///
/// With `--config`, pasted template text sees the same tokens and dialect as
/// the templates in the file: `--token` values first, then the file's table.
pub struct Session {
    set: Option<TemplateSet>,
    tokens: TokenSet,
    dialect: Dialect,
}

impl Session {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let tokens = parse_tokens(matches)?;
        let dialect = matches
            .get_one::<String>("dialect")
            .map(|name| name.parse::<Dialect>().map_err(|e| anyhow!(e)))
            .transpose()?;

        let set = match matches.get_one::<String>("config") {
            Some(path) => Some(TemplateSet::load_with_tokens(
                Some(path),
                tokens.clone(),
                dialect.clone(),
            )?),
            None => None,
        };

        Ok(match set {
            Some(set) => Self {
                tokens: set.tokens().clone(),
                dialect: set.dialect().clone(),
                set: Some(set),
            },
            None => Self {
                set: None,
                tokens,
                dialect: dialect.unwrap_or_default(),
            },
        })
    }

    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// A template from the config by name, otherwise `text` compiled as-is
    pub fn template(&self, text: &str) -> Result<Template> {
        if let Some(template) = self.set.as_ref().and_then(|set| set.get(text)) {
            return Ok(template.clone());
        }

        Template::compile(text, self.dialect.clone(), self.tokens.clone())
            .context("Invalid template")
    }

    fn template_from(&self, matches: &ArgMatches) -> Result<Template> {
        let text = matches
            .get_one::<String>("template")
            .context("Missing template")?;
        self.template(text)
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let session = Session::from_matches(matches)?;

    match matches.subcommand() {
        Some(("render", sub)) => {
            let template = session.template_from(sub)?;
            print_json(&json!({
                "statement": template.statement(),
                "original": template.original_statement(),
                "args_count": template.args_count(),
                "args": template.args_info(),
            }))
        }
        Some(("bind", sub)) => {
            let template = session.template_from(sub)?;
            let values = template.bind([parse_args(sub)?])?;
            print_json(&json!({
                "statement": template.statement(),
                "args": values,
            }))
        }
        Some(("exec", sub)) => {
            let template = session.template_from(sub)?;
            let database = sub
                .get_one::<String>("database")
                .map(String::as_str)
                .unwrap_or(DEFAULT_DATABASE);
            let pool = db::connect(database).await?;
            let result = db::execute(&pool, &template, [parse_args(sub)?]).await?;
            tracing::info!(rows = result.rows_affected(), "statement executed");
            println!("{} row(s) affected", result.rows_affected());
            Ok(())
        }
        Some(("list", _)) => {
            let set = session.set.as_ref().context("list requires --config")?;
            for (name, template) in set.iter() {
                println!("{}\t{}", name, template.statement());
            }
            Ok(())
        }
        Some((other, _)) => bail!("Unknown command: {}", other),
        None => bail!("No command given"),
    }
}
