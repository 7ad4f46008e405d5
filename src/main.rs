#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;

#[macro_use]
mod macros;
mod common;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use cmdgram::completion::{Candidate, Completer, CompletionError};
use cmdgram::parser::Quoting;
use cmdgram::{
    invoke_pipeline, manifest, CommandDescriptor, CompletionMatcher, InvocationMatch, Parameter,
    PathCompleter, TypeRegistry, ValueType, ValueTypeCompleter,
};
use structopt::StructOpt;

use crate::common::logger::install_logger;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "cmdgram",
    about = "Matches and completes command lines against a command manifest."
)]
struct Opt {
    /// The manifest declaring the commands.
    #[structopt(short = "m", long = "manifest", parse(from_os_str))]
    manifest: PathBuf,
    /// Log everything (to ~/.cmdgram/log/cmdgram.log).
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Matches a line and prints the call tree of each stage.
    #[structopt(name = "invoke")]
    Invoke { line: String },
    /// Prints what can be typed at the end of a line. Terminal candidates are
    /// marked with `*`.
    #[structopt(name = "complete")]
    Complete {
        line: String,
        /// Read quotes and backslashes as ordinary characters.
        #[structopt(long = "plain")]
        plain: bool,
    },
    /// Prints the synopsis of a command.
    #[structopt(name = "usage")]
    Usage { path: Vec<String> },
    /// Prints the manual of a command.
    #[structopt(name = "manual")]
    Manual { path: Vec<String> },
}

/// Completes strings as paths and everything else from the declared type.
#[derive(Debug)]
struct DefaultCompleter {
    paths: PathCompleter,
}

impl Completer for DefaultCompleter {
    fn complete(
        &self,
        parameter: Parameter<'_>,
        prefix: &str,
    ) -> Result<Vec<Candidate>, CompletionError> {
        match parameter.value_type() {
            ValueType::String => self.paths.complete(parameter, prefix),
            _ => ValueTypeCompleter.complete(parameter, prefix),
        }
    }
}

fn print_match(m: &InvocationMatch<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut depth = depth;
    if !m.descriptor().name().is_empty() {
        println!("{}{}", indent, m.descriptor().name());
        depth += 1;
    }

    let indent = "  ".repeat(depth);
    for option in m.options() {
        println!("{}{} = {}", indent, option.descriptor().display_name(), option.value());
    }

    for argument in m.arguments() {
        println!("{}{} = {}", indent, argument.descriptor().name(), argument.value());
    }

    if let Some(sub) = m.subordinate() {
        print_match(sub, depth);
    }
}

/// One line per candidate. A failing completer gives no candidates.
fn completion_lines(matcher: CompletionMatcher<'_, '_>, line: &str) -> Vec<String> {
    match matcher.complete(line) {
        Ok(completion) => completion
            .candidates()
            .iter()
            .map(|candidate| {
                let mark = if candidate.terminal { " *" } else { "" };
                format!("{}{}{}", completion.prefix(), candidate.value, mark)
            })
            .collect(),
        Err(err) => {
            warn!("completion of `{}' failed: {}", line, err);
            print_err!("completion failed: {}", err);
            Vec::new()
        }
    }
}

fn find<'a>(root: &'a CommandDescriptor, path: &[String]) -> Result<&'a CommandDescriptor> {
    root.find(path)
        .ok_or_else(|| anyhow!("no such command `{}'", path.join(" ")))
}

/// The names of the commands enclosing the last one of `path`.
fn parents(path: &[String]) -> Vec<&str> {
    let len = path.len().saturating_sub(1);
    path[..len].iter().map(String::as_str).collect()
}

fn run(opt: Opt) -> Result<()> {
    let registry = TypeRegistry::new();
    let root = manifest::load_file(&opt.manifest, &registry)
        .with_context(|| format!("failed to load {}", opt.manifest.display()))?;

    match opt.command {
        Command::Invoke { line } => {
            let stages = invoke_pipeline(&root, &line)?;
            for (i, stage) in stages.iter().enumerate() {
                if i > 0 {
                    println!("|");
                }
                print_match(stage, 0);
            }
        }
        Command::Complete { line, plain } => {
            let completer = DefaultCompleter {
                paths: PathCompleter::new(),
            };
            let quoting = if plain { Quoting::Plain } else { Quoting::Shell };
            let matcher = CompletionMatcher::new(&root, &completer).quoting(quoting);
            for candidate in completion_lines(matcher, &line) {
                println!("{}", candidate);
            }
        }
        Command::Usage { path } => {
            let command = find(&root, &path)?;
            if path.is_empty() {
                for sub in command.subordinates() {
                    println!("{}", sub.usage(&[]));
                }
            } else {
                println!("{}", command.usage(&parents(&path)));
            }
        }
        Command::Manual { path } => {
            let command = find(&root, &path)?;
            if path.is_empty() {
                for sub in command.subordinates() {
                    println!("{}", sub.manual(&[]));
                }
            } else {
                print!("{}", command.manual(&parents(&path)));
            }
        }
    }

    Ok(())
}

fn main() {
    let opt = Opt::from_args();
    if let Err(err) = install_logger("cmdgram", opt.verbose) {
        print_err!("failed to install the logger: {:#}", err);
    }

    trace!("options: {:?}", opt);
    if let Err(err) = run(opt) {
        print_err!("{:#}", err);
        std::process::exit(1);
    }
}
