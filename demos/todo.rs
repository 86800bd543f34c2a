//! A todo list driven by a YAML command model.
//!
//! The model (including numpydoc `doc` blocks) is parsed with
//! `ModelSpec::from_yaml`; handlers are attached in code afterwards, since
//! they cannot be serialized. The handlers share state through an
//! `Arc<Mutex<..>>`.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-model-demos --example todo
//! ```

use std::sync::{Arc, Mutex};

use command_model_core::CommandTree;
use command_model_docstring::NumpyDialect;
use command_model_loader::{LoadError, ModelSpec};

const MODEL: &str = r#"
name: todo
doc: |
  Keep track of things to do.

  Notes
  -----
  Items live in memory for the lifetime of the process.
commands:
  - name: add
    doc: |
      Add an item.

      Parameters
      ----------
      title : str
          What needs doing.
      priority : {low, high}
          How urgent it is.
    arguments:
      - name: title
      - name: priority
        kind: option
        short: p
        choices: [low, high]
        default: low
  - name: list
    aliases: [ls]
    doc: |
      List items.

      Parameters
      ----------
      high_only : bool
          Only show high-priority items.
    arguments:
      - name: high_only
        kind: option
        type: bool
        rename: high
"#;

#[derive(Debug)]
struct Item {
    title: String,
    high: bool,
}

fn build(items: &Arc<Mutex<Vec<Item>>>) -> Result<CommandTree, LoadError> {
    let mut root = ModelSpec::from_yaml(MODEL)?.build_with(&NumpyDialect)?;

    if let Some(add) = root.child_mut("add") {
        let items = Arc::clone(items);
        add.set_handler(move |args| {
            let Some(title) = args.get_str("title") else {
                return 2;
            };
            let item = Item {
                title: title.to_string(),
                high: args.get_str("priority") == Some("high"),
            };
            match items.lock() {
                Ok(mut items) => {
                    items.push(item);
                    0
                }
                Err(_) => 1,
            }
        });
    }

    if let Some(list) = root.child_mut("list") {
        let items = Arc::clone(items);
        list.set_handler(move |args| {
            let high_only = args.flag("high_only");
            let Ok(items) = items.lock() else {
                return 1;
            };
            for (index, item) in items.iter().enumerate() {
                if high_only && !item.high {
                    continue;
                }
                let marker = if item.high { "!" } else { " " };
                println!("  {marker} {}. {}", index + 1, item.title);
            }
            0
        });
    }

    Ok(CommandTree::new(root)?)
}

fn main() {
    let items = Arc::new(Mutex::new(Vec::new()));
    let tree = match build(&items) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let samples: &[&[&str]] = &[
        &["add", "write the report", "-p", "high"],
        &["add", "water the plants"],
        &["ls"],
        &["list", "--high"],
        &["add", "--help"],
        &["add", "-p", "urgent", "call mom"],
        &[],
    ];

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    for args in samples {
        println!("$ todo {}", args.join(" "));
        let status = tree.run(args.iter().copied(), &mut stdout, &mut stderr);
        println!("  exit status: {status}");
        println!();
    }
}
