//! Command-line interface for cmdscript
//! This binary hosts the library for quick experiments: it loads a command
//! registry from a JSON file and feeds stdin lines to the dispatcher, or
//! parses a script file and prints what the front end made of it.
//!
//! Usage:
//!   cmdscript run --registry `<registry.json>`      - Start an interactive prompt session
//!   cmdscript check `<script>` [--tree]             - Parse a script file and print the result

use clap::{Arg, ArgAction, Command};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, BufRead};

use cmdscript::feedback::ResolvedFeedback;
use cmdscript::script;
use cmdscript::{CommandOutcome, InCommand, Prompt, PromptSink, UserFeedback};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = Command::new("cmdscript")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A front end for a small command scripting language")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Start an interactive prompt session")
                .arg(
                    Arg::new("registry")
                        .long("registry")
                        .short('r')
                        .help("Path to a JSON command registry")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse a script file and print its categorized statements")
                .arg(
                    Arg::new("path")
                        .help("Path to the script file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("tree")
                        .long("tree")
                        .help("Decompose the script's leading if/else into a tree")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let registry = run_matches.get_one::<String>("registry").unwrap();
            handle_run_command(registry);
        }
        Some(("check", check_matches)) => {
            let path = check_matches.get_one::<String>("path").unwrap();
            let tree = check_matches.get_flag("tree");
            handle_check_command(path, tree);
        }
        _ => unreachable!(),
    }
}

/// One command entry in a registry file.
#[derive(Deserialize)]
struct RegisteredCommand {
    id: usize,
    #[serde(flatten)]
    command: InCommand,
}

/// One feedback entry in a registry file.
#[derive(Deserialize)]
struct RegisteredFeedback {
    id: usize,
    #[serde(flatten)]
    feedback: UserFeedback,
}

/// The JSON shape of `--registry` files. The core does not prescribe any
/// persistence format; this is just what this host chose.
#[derive(Deserialize)]
struct RegistryFile {
    namespace: String,
    commands: Vec<RegisteredCommand>,
    #[serde(default)]
    extensions: Vec<RegisteredCommand>,
    #[serde(default)]
    feedback: Vec<RegisteredFeedback>,
}

/// Prints every dispatcher channel straight to the terminal.
struct ConsoleSink;

impl PromptSink for ConsoleSink {
    fn on_log(&mut self, message: &str) {
        println!("{message}");
    }

    fn on_command(&mut self, outcome: &CommandOutcome) {
        match outcome {
            Ok(resolved) => println!("=> {resolved}"),
            Err(error) => println!("!! {error}"),
        }
    }

    fn on_feedback(&mut self, resolved: &ResolvedFeedback) {
        println!(
            "=> feedback {} answered `{}` for `{}`",
            resolved.request_id, resolved.answer, resolved.command
        );
    }
}

/// Handle the run command
fn handle_run_command(registry_path: &str) {
    let file = match std::fs::read_to_string(registry_path) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Error reading {registry_path}: {error}");
            std::process::exit(1);
        }
    };
    let registry: RegistryFile = match serde_json::from_str(&file) {
        Ok(registry) => registry,
        Err(error) => {
            eprintln!("Error parsing {registry_path}: {error}");
            std::process::exit(1);
        }
    };

    let commands: BTreeMap<usize, InCommand> = registry
        .commands
        .into_iter()
        .map(|entry| (entry.id, entry.command))
        .collect();
    let extensions: BTreeMap<usize, InCommand> = registry
        .extensions
        .into_iter()
        .map(|entry| (entry.id, entry.command))
        .collect();
    let feedback: HashMap<usize, UserFeedback> = registry
        .feedback
        .into_iter()
        .map(|entry| (entry.id, entry.feedback))
        .collect();

    let mut prompt = Prompt::new(Box::new(ConsoleSink));
    prompt.initiate(&registry.namespace, commands, extensions, feedback);
    println!(
        "Namespace `{}` ready; type a command, or exit to quit.",
        registry.namespace
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                eprintln!("Error reading input: {error}");
                std::process::exit(1);
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        prompt.submit_input(line);
    }
}

/// Handle the check command
fn handle_check_command(path: &str, tree: bool) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error reading {path}: {error}");
            std::process::exit(1);
        }
    };

    if tree {
        match script::parse_if_else(&source) {
            Ok(forest) => {
                for node in forest.iter() {
                    println!("{node}");
                    for (key, category, value) in node.commands.iter() {
                        println!("    [{key}] {category}: {value}");
                    }
                }
            }
            Err(error) => {
                eprintln!("Error: {error}");
                std::process::exit(1);
            }
        }
        return;
    }

    let tokens = script::tokenize(&source);
    match script::parse(&tokens) {
        Ok(statements) => {
            let refined = script::refine(&statements);
            print!("{refined}");
        }
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}
