//! FizzBuzz as a single-command program.
//!
//! Builds the command with the builder API, attaches a handler and hands the
//! process arguments to [`CommandTree::run_from_env`].
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-model-demos --example fizzbuzz -- 1 15 -s
//! cargo run -p command-model-demos --example fizzbuzz -- --help
//! ```

use command_model_core::{ArgumentDescriptor, CommandNode, CommandTree, ValueType};

fn fizzbuzz(n: i64) -> String {
    let mut word = String::new();
    if n % 3 == 0 {
        word.push_str("Fizz");
    }
    if n % 5 == 0 {
        word.push_str("Buzz");
    }
    word
}

fn main() {
    let command = CommandNode::new("fizzbuzz")
        .with_brief("Print the FizzBuzz sequence")
        .with_argument(
            ArgumentDescriptor::positional("min", ValueType::Integer).with_help("First number"),
        )
        .and_then(|node| {
            node.with_argument(
                ArgumentDescriptor::positional("max", ValueType::Integer).with_help("Last number"),
            )
        })
        .and_then(|node| {
            node.with_argument(
                ArgumentDescriptor::flag("skip_empty")
                    .with_short('s')
                    .with_default(false)
                    .with_help("Only print numbers that are Fizz or Buzz"),
            )
        })
        .map(|node| {
            node.with_handler(|args| {
                let (Some(min), Some(max)) = (args.get_integer("min"), args.get_integer("max"))
                else {
                    return 2;
                };
                let skip_empty = args.flag("skip_empty");
                for n in min..=max {
                    match fizzbuzz(n) {
                        word if !word.is_empty() => println!("{n}: {word}"),
                        _ if skip_empty => {}
                        _ => println!("{n}"),
                    }
                }
                0
            })
        });

    let tree = match command.and_then(CommandTree::new) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    std::process::exit(tree.run_from_env());
}
