use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use command_model_core::{Conflict, DefinitionError, Dispatch, MatchError, Value};
use command_model_loader::{AppConfig, LoadError, ModelSpec, load_tree};
use tempfile::tempdir;

const TODO_YAML: &str = r#"
name: todo
brief: Manage a todo list
commands:
  - name: add
    brief: Add an item
    arguments:
      - name: title
      - name: priority
        kind: option
        short: p
        choices: [low, high]
        default: low
      - name: tags
        kind: option
        arity: zero_or_more
  - name: list
    aliases: [ls]
    doc: |
      List items.

      Parameters
      ----------
      all : bool
          Include finished items.
    arguments:
      - name: all
        kind: option
        type: bool
        short: a
"#;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn yaml_model_resolves_commands() {
    let dir = tempdir().unwrap();
    let model = write(dir.path(), "todo.yaml", TODO_YAML);

    let tree = load_tree(&model, None).unwrap();
    let Dispatch::Invoke { path, arguments, .. } = tree
        .resolve(["add", "buy milk", "-p", "high", "--tags", "home", "--tags", "errand"])
        .unwrap()
    else {
        panic!("expected a match");
    };
    assert_eq!(path, vec!["todo", "add"]);
    assert_eq!(arguments.get_str("title"), Some("buy milk"));
    assert_eq!(arguments.get_str("priority"), Some("high"));
    assert_eq!(
        arguments.get_list("tags"),
        Some(&[Value::from("home"), Value::from("errand")][..])
    );

    let err = tree.resolve(["add", "x", "-p", "urgent"]).unwrap_err();
    assert!(matches!(err.error, MatchError::InvalidValue { .. }));
}

#[test]
fn doc_fields_reach_rendered_help() {
    let dir = tempdir().unwrap();
    let model = write(dir.path(), "todo.yml", TODO_YAML);

    let tree = load_tree(&model, None).unwrap();
    let help = tree.render_help(&["ls"]).unwrap();
    assert!(help.starts_with("List items."));
    assert!(help.contains("Usage: todo list [options]"));
    assert!(help.contains("Include finished items."));
}

#[test]
fn json_model_round_trips_through_save() {
    let dir = tempdir().unwrap();
    let source = write(dir.path(), "todo.yaml", TODO_YAML);
    let spec = ModelSpec::load(&source).unwrap();

    let copy = dir.path().join("todo.json");
    spec.save(&copy).unwrap();
    assert_eq!(ModelSpec::load(&copy).unwrap(), spec);
}

#[test]
fn config_changes_tree_settings_and_dialect() {
    let dir = tempdir().unwrap();
    let model = write(
        dir.path(),
        "serve.json",
        r#"{ "name": "serve", "doc": "Serve files.\n\nParameters\n----------\nport : int\n    Port.",
             "arguments": [ { "name": "port", "kind": "option", "type": "integer" } ] }"#,
    );
    let config = write(
        dir.path(),
        "config.yaml",
        "error_status: 64\ndoc_dialect: plain\nhelp_flag:\n  short: \"?\"\n",
    );

    let tree = load_tree(&model, Some(config.as_path())).unwrap();
    assert_eq!(tree.config().error_status, 64);

    let mut out = Vec::<u8>::new();
    let mut err = Vec::<u8>::new();
    assert_eq!(tree.run(["--port", "x"], &mut out, &mut err), 64);
    assert!(tree.resolve(["-?"]).is_ok());

    // The plain dialect does not parse parameter sections.
    let help = tree.render_help(&[]).unwrap();
    assert!(help.contains("-?, --help"));
    assert!(!help.contains("  Port."));
}

/// Collects formatted log lines written by a test subscriber.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn logs_at(level: tracing::Level, model: &Path) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, || load_tree(model, None).unwrap());
    let bytes = captured.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn loading_logs_only_at_debug_level() {
    let dir = tempdir().unwrap();
    let model = write(dir.path(), "todo.yaml", TODO_YAML);

    assert!(logs_at(tracing::Level::INFO, &model).is_empty());
    assert!(logs_at(tracing::Level::DEBUG, &model).contains("loaded command tree"));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn invalid_default_names_the_argument() {
    let dir = tempdir().unwrap();
    let model = write(
        dir.path(),
        "bad.json",
        r#"{ "name": "count", "arguments": [ { "name": "n", "type": "int", "default": "many" } ] }"#,
    );
    match load_tree(&model, None) {
        Err(LoadError::InvalidDefault { argument, .. }) => assert_eq!(argument, "n"),
        other => panic!("expected InvalidDefault, got {other:?}"),
    }
}

#[test]
fn duplicate_alias_is_a_definition_error() {
    let dir = tempdir().unwrap();
    let model = write(
        dir.path(),
        "dup.yaml",
        "name: app\ncommands:\n  - name: list\n    aliases: [ls]\n  - name: show\n    aliases: [ls]\n",
    );
    let err = load_tree(&model, None).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Definition(DefinitionError::DuplicateDefinition {
            conflict: Conflict::Alias,
            ..
        })
    ));
}

#[test]
fn unsupported_extension_and_missing_file() {
    let dir = tempdir().unwrap();
    let model = write(dir.path(), "todo.toml", "name = 'todo'");
    assert!(matches!(
        load_tree(&model, None),
        Err(LoadError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        ModelSpec::load(dir.path().join("absent.json")),
        Err(LoadError::Io(_))
    ));
}

#[test]
fn unknown_dialect_in_config() {
    let dir = tempdir().unwrap();
    let model = write(dir.path(), "todo.yaml", TODO_YAML);
    let config = write(dir.path(), "config.json", r#"{ "doc_dialect": "google" }"#);
    assert!(matches!(
        load_tree(&model, Some(config.as_path())),
        Err(LoadError::UnknownDialect(name)) if name == "google"
    ));
    assert_eq!(AppConfig::load(&config).unwrap().tree.error_status, 2);
}
