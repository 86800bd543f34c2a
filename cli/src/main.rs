use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use command_model_core::{BoundArguments, CommandNode, CommandTree, Dispatch};
use command_model_loader::{AppConfig, ModelSpec};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

/// Documentation dialects selectable from the command line.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliDialect {
    Numpy,
    Plain,
}

impl CliDialect {
    fn name(self) -> &'static str {
        match self {
            CliDialect::Numpy => "numpy",
            CliDialect::Plain => "plain",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "command-model")]
#[command(about = "Validate, exercise and document declarative command models")]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Log level filter when RUST_LOG is unset (e.g. warn, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and finalize one or more model files.
    Validate(ValidateArgs),
    /// Resolve an argument vector against a model and print the binding.
    Parse(ParseArgs),
    /// Render the help text of a command in a model.
    Help(HelpArgs),
    /// Parse documentation text into structured fields.
    Doc(DocArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Model files and/or directories containing model files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Optional configuration file applied to every model.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Model file (.json, .yaml or .yml).
    #[arg(long)]
    model: PathBuf,
    /// Optional configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to resolve, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Model file (.json, .yaml or .yml).
    #[arg(long)]
    model: PathBuf,
    /// Optional configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the configured line width.
    #[arg(long)]
    width: Option<usize>,
    /// Sub-command path below the root (names or aliases).
    path: Vec<String>,
}

#[derive(Debug, Args)]
struct DocArgs {
    /// File to read; standard input when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Documentation dialect.
    #[arg(long, default_value = "numpy")]
    dialect: CliDialect,
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    command: &'a [String],
    arguments: &'a BoundArguments,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args).map(|()| 0),
        Command::Parse(args) => run_parse(args),
        Command::Help(args) => run_help(args).map(|()| 0),
        Command::Doc(args) => run_doc(args).map(|()| 0),
    };

    match result {
        Ok(0) => {}
        Ok(status) => std::process::exit(status),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

// ---------------------------------------------------------------------------
// validate command
// ---------------------------------------------------------------------------

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    use rayon::prelude::*;

    let config = load_config(args.config.as_deref())?;
    let paths = collect_model_paths(&args.inputs)?;

    let outcomes: Vec<(PathBuf, Result<usize, String>)> = paths
        .into_par_iter()
        .map(|path| {
            let outcome = build_tree(&path, config.clone()).map(|tree| count_commands(tree.root()));
            (path, outcome)
        })
        .collect();

    let mut failures = 0;
    let mut commands = 0;
    for (path, outcome) in &outcomes {
        match outcome {
            Ok(count) => {
                debug!(path = %path.display(), commands = count, "model is valid");
                commands += count;
            }
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!(
            "{failures} of {} model file(s) failed validation",
            outcomes.len()
        ));
    }
    println!(
        "Validated {} model file(s) with {commands} command(s).",
        outcomes.len()
    );
    Ok(())
}

fn collect_model_paths(inputs: &[PathBuf]) -> Result<BTreeSet<PathBuf>, String> {
    let mut paths = BTreeSet::new();
    for input in inputs {
        if !input.is_dir() {
            paths.insert(input.clone());
            continue;
        }
        let entries = fs::read_dir(input)
            .map_err(|err| format!("Failed to read directory '{}': {err}", input.display()))?;
        for entry in entries {
            let path = entry
                .map_err(|err| format!("Failed to read directory '{}': {err}", input.display()))?
                .path();
            let is_model = path.extension().is_some_and(|ext| {
                [OsStr::new("json"), OsStr::new("yaml"), OsStr::new("yml")].contains(&ext)
            });
            if is_model {
                paths.insert(path);
            }
        }
    }
    if paths.is_empty() {
        return Err("No model files were found".to_string());
    }
    Ok(paths)
}

fn count_commands(node: &CommandNode) -> usize {
    1 + node.children().iter().map(count_commands).sum::<usize>()
}

// ---------------------------------------------------------------------------
// parse command
// ---------------------------------------------------------------------------

fn run_parse(args: ParseArgs) -> Result<i32, String> {
    let tree = build_tree(&args.model, load_config(args.config.as_deref())?)?;

    match tree.resolve(&args.args) {
        Ok(Dispatch::Invoke {
            path, arguments, ..
        }) => {
            let output = ParseOutput {
                command: &path,
                arguments: &arguments,
            };
            let raw = match args.format {
                CliOutputFormat::Json => serde_json::to_string_pretty(&output)
                    .map_err(|err| format!("Failed to serialize binding: {err}"))?,
                CliOutputFormat::Yaml => serde_yaml::to_string(&output)
                    .map_err(|err| format!("Failed to serialize binding: {err}"))?,
            };
            println!("{}", raw.trim_end());
            Ok(0)
        }
        Ok(Dispatch::Help { path, .. }) => {
            let below_root: Vec<&str> = path.iter().skip(1).map(String::as_str).collect();
            if let Some(text) = tree.render_help(&below_root) {
                println!("{text}");
            }
            Ok(0)
        }
        Err(err) => {
            eprintln!("error: {err}");
            let below_root: Vec<&str> = err.path.iter().skip(1).map(String::as_str).collect();
            if let Some(usage) = tree.render_usage(&below_root) {
                eprintln!("{usage}");
            }
            Ok(tree.config().error_status)
        }
    }
}

// ---------------------------------------------------------------------------
// help command
// ---------------------------------------------------------------------------

fn run_help(args: HelpArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.tree.format.width = width;
    }
    let tree = build_tree(&args.model, config)?;

    let path: Vec<&str> = args.path.iter().map(String::as_str).collect();
    let text = tree
        .render_help(&path)
        .ok_or_else(|| format!("No command '{}' in model", args.path.join(" ")))?;
    println!("{text}");
    Ok(())
}

// ---------------------------------------------------------------------------
// doc command
// ---------------------------------------------------------------------------

fn run_doc(args: DocArgs) -> Result<(), String> {
    let text = match &args.input {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            text
        }
    };

    let dialect = command_model_docstring::dialect(args.dialect.name())
        .ok_or_else(|| format!("Unknown dialect '{}'", args.dialect.name()))?;
    let doc = dialect.parse(&text);
    let raw = serde_json::to_string_pretty(&doc)
        .map_err(|err| format!("Failed to serialize documentation: {err}"))?;
    println!("{raw}");
    Ok(())
}

// ---------------------------------------------------------------------------
// shared helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<AppConfig, String> {
    match path {
        Some(path) => AppConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn build_tree(model: &Path, config: AppConfig) -> Result<CommandTree, String> {
    let spec = ModelSpec::load(model)
        .map_err(|err| format!("Failed to load model '{}': {err}", model.display()))?;
    let dialect = config.dialect().map_err(|err| err.to_string())?;
    let root = spec
        .build_with(dialect.as_ref())
        .map_err(|err| format!("Invalid model '{}': {err}", model.display()))?;
    CommandTree::with_config(root, config.tree)
        .map_err(|err| format!("Invalid model '{}': {err}", model.display()))
}
