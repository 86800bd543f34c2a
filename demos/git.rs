//! A git-like command tree.
//!
//! Demonstrates nested sub-commands, aliases, variadic positionals and
//! option relationships (`requires` / `conflicts_with`). The example runs a
//! fixed list of argument vectors through the tree and prints what each one
//! produces.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-model-demos --example git
//! ```

use command_model_core::{
    ArgumentDescriptor, Arity, BoundArguments, CommandNode, CommandTree, DefinitionError,
    ValueType,
};

fn echo(args: &BoundArguments) -> i32 {
    match serde_json::to_string(args) {
        Ok(json) => {
            println!("  bound: {json}");
            0
        }
        Err(err) => {
            eprintln!("  failed to serialize arguments: {err}");
            1
        }
    }
}

fn build() -> Result<CommandNode, DefinitionError> {
    let commit = CommandNode::new("commit")
        .with_alias("ci")
        .with_brief("Record changes to the repository")
        .with_argument(
            ArgumentDescriptor::option("message", ValueType::String)
                .with_short('m')
                .with_help("Commit message"),
        )?
        .with_argument(ArgumentDescriptor::flag("amend").with_help("Replace the tip of the branch"))?
        .with_argument(
            ArgumentDescriptor::flag("no_edit")
                .requires("amend")
                .conflicts_with("message")
                .with_help("Reuse the previous message"),
        )?
        .with_argument(ArgumentDescriptor::flag("all").with_short('a'))?
        .with_argument(
            ArgumentDescriptor::positional("paths", ValueType::String)
                .with_arity(Arity::ZeroOrMore)
                .with_help("Files to commit"),
        )?
        .with_handler(echo);

    let remote_add = CommandNode::new("add")
        .with_brief("Add a named remote")
        .with_argument(ArgumentDescriptor::positional("name", ValueType::String))?
        .with_argument(ArgumentDescriptor::positional("url", ValueType::String))?
        .with_argument(
            ArgumentDescriptor::option("fetch_depth", ValueType::Integer).with_rename("depth"),
        )?
        .with_handler(echo);

    let remote_remove = CommandNode::new("remove")
        .with_alias("rm")
        .with_brief("Remove a named remote")
        .with_argument(ArgumentDescriptor::positional("name", ValueType::String))?
        .with_handler(echo);

    let remote = CommandNode::new("remote")
        .with_brief("Manage tracked repositories")
        .with_child(remote_add)?
        .with_child(remote_remove)?;

    let formats = ValueType::Enum(vec!["oneline".into(), "short".into(), "full".into()]);
    let log = CommandNode::new("log")
        .with_brief("Show commit logs")
        .with_argument(ArgumentDescriptor::option("format", formats).with_default("short"))?
        .with_argument(ArgumentDescriptor::option("max_count", ValueType::Integer).with_short('n'))?
        .with_handler(echo);

    CommandNode::new("git")
        .with_brief("A tiny version-control front end")
        .with_child(commit)?
        .with_child(remote)?
        .with_child(log)
}

fn main() {
    let tree = match build().and_then(CommandTree::new) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let samples: &[&[&str]] = &[
        &["ci", "-am", "initial import"],
        &["commit", "--amend", "--no-edit"],
        &["commit", "--no-edit"],
        &["remote", "add", "origin", "https://example.com/repo.git", "--depth=1"],
        &["remote", "rm"],
        &["log", "-n5", "--format", "oneline"],
        &["log", "--format", "fancy"],
        &["remote"],
        &["push"],
    ];

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    for args in samples {
        println!("$ git {}", args.join(" "));
        let status = tree.run(args.iter().copied(), &mut stdout, &mut stderr);
        println!("  exit status: {status}");
        println!();
    }
}
