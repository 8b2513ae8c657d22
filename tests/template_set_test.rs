// Integration tests for loading template sets from YAML files

use named_template::{named, Dialect, TemplateSet, TokenSet, Value};
use std::collections::HashMap;

mod common;
use common::write_yaml;

const TEMPLATES_YML: &str = r#"
dialect: sqlite
tokens:
  table: people
templates:
  - name: insert
    sql: INSERT INTO {{table}} (name, email, nickname) VALUES (:name, :email, :nickname?)
    nullable: [email]
  - name: people
    nested:
      - name: by_name
        sql: SELECT * FROM {{table}} WHERE name = :name
      - name: count
        sql: SELECT COUNT(*) FROM {{table}}
"#;

#[test]
fn test_load_from_file() {
    let file = write_yaml(TEMPLATES_YML);
    let set = TemplateSet::load(file.path().to_str()).unwrap();

    let names: Vec<&str> = set.names().collect();
    assert_eq!(names, vec!["insert", "people.by_name", "people.count"]);
    assert_eq!(set.dialect(), &Dialect::QUESTION_MARK);

    let insert = set.get("insert").unwrap();
    assert_eq!(
        insert.statement(),
        "INSERT INTO people (name, email, nickname) VALUES (?, ?, ?)"
    );

    let out = insert
        .bind([named("name", "Ada"), named("email", "")])
        .unwrap();
    assert_eq!(out, vec![Value::from("Ada"), Value::Null, Value::Null]);
}

#[test]
fn test_load_with_override_dialect_and_tokens() {
    let file = write_yaml(TEMPLATES_YML);
    let mut tokens = HashMap::new();
    tokens.insert("table".to_string(), "archived_people".to_string());

    let set = TemplateSet::load_with_tokens(
        file.path().to_str(),
        TokenSet::new().with(tokens),
        Some(Dialect::DOLLAR_NUMBERED),
    )
    .unwrap();

    assert_eq!(
        set.get("people.by_name").unwrap().statement(),
        "SELECT * FROM archived_people WHERE name = $1"
    );
    assert_eq!(set.get("people.count").unwrap().args_count(), 0);
}

#[test]
fn test_load_invalid_yaml() {
    let file = write_yaml("templates: [this is: not: valid");
    let err = TemplateSet::load(file.path().to_str()).unwrap_err();
    assert!(err.to_string().contains("Invalid yaml configuration"));
}

#[test]
fn test_load_reports_bad_marker() {
    let file = write_yaml(
        r#"
templates:
  - name: broken
    sql: "SELECT * FROM t WHERE a = :"
"#,
    );
    let err = TemplateSet::load(file.path().to_str()).unwrap_err();
    assert_eq!(err.to_string(), "Invalid template 'broken'");
    assert!(err
        .root_cause()
        .to_string()
        .starts_with("named marker ':' without name"));
}
