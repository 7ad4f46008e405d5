#![allow(dead_code)]
use std::sync::Mutex;

use cmdgram::{
    ArgumentBuilder, Candidate, CommandBuilder, CommandDescriptor, Completer, CompletionError,
    InvocationMatch, OptionBuilder, Parameter, ValueType,
};

pub fn cp() -> CommandBuilder {
    CommandBuilder::new("cp")
        .description("copy files")
        .option(OptionBuilder::flag(vec!["f", "force"]).description("overwrite"))
        .argument(ArgumentBuilder::new("src").required(true))
        .argument(ArgumentBuilder::new("dst").required(true))
}

pub fn git() -> CommandBuilder {
    CommandBuilder::new("git")
        .description("version control")
        .subordinate(
            CommandBuilder::new("commit")
                .description("record changes")
                .option(
                    OptionBuilder::new(vec!["m", "message"])
                        .required(true)
                        .description("commit message"),
                )
                .option(OptionBuilder::flag(vec!["a", "all"])),
        )
        .subordinate(
            CommandBuilder::new("push")
                .argument(ArgumentBuilder::new("remote"))
                .argument(ArgumentBuilder::new("branch")),
        )
}

pub fn grep() -> CommandBuilder {
    CommandBuilder::new("grep")
        .option(OptionBuilder::new(vec!["e", "regexp"]).multi())
        .option(OptionBuilder::new(vec!["n", "max-count"]).value_type(ValueType::Integer))
        .argument(ArgumentBuilder::new("files").multi())
}

/// `cp`, `git` and `grep` under a nameless root.
pub fn root() -> CommandDescriptor {
    CommandBuilder::root()
        .subordinate(cp())
        .subordinate(git())
        .subordinate(grep())
        .build()
        .unwrap()
}

/// One line per matched parameter: `path name=value`.
pub fn summary(m: &InvocationMatch<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = Some(m);
    let mut path = Vec::new();
    while let Some(m) = current {
        path.push(m.descriptor().name().to_owned());
        let prefix = path.join("/");
        for option in m.options() {
            lines.push(format!("{} {}={}", prefix, option.descriptor().display_name(), option.value()));
        }
        for argument in m.arguments() {
            lines.push(format!("{} {}={}", prefix, argument.descriptor().name(), argument.value()));
        }
        current = m.subordinate();
    }
    lines
}

/// Remembers what it has been asked and suggests `<prefix>value`.
#[derive(Debug, Default)]
pub struct RecordingCompleter {
    pub calls: Mutex<Vec<(String, String)>>,
}

impl Completer for RecordingCompleter {
    fn complete(
        &self,
        parameter: Parameter<'_>,
        prefix: &str,
    ) -> Result<Vec<Candidate>, CompletionError> {
        self.calls
            .lock()
            .unwrap()
            .push((parameter.name(), prefix.to_owned()));
        Ok(vec![Candidate::new(&format!("{}value", prefix), true)])
    }
}

#[derive(Debug)]
pub struct FailingCompleter;

impl Completer for FailingCompleter {
    fn complete(&self, _: Parameter<'_>, _: &str) -> Result<Vec<Candidate>, CompletionError> {
        Err(CompletionError::Completer("boom".to_owned()))
    }
}
