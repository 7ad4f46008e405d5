use super::{Candidate, Completer, Completion, CompletionBuilder, CompletionError};
use crate::descriptor::{ArgumentDescriptor, CommandDescriptor, Multiplicity, Parameter};
use crate::parser::{
    self, Delimiter, Event, Literal, LiteralKind, Mode, Quoting, StopReason, Token, Unresolved,
};

/// Completes lines against a command tree.
#[derive(Clone, Copy, Debug)]
pub struct CompletionMatcher<'d, 'c> {
    root: &'d CommandDescriptor,
    completer: &'c dyn Completer,
    quoting: Quoting,
}

impl<'d, 'c> CompletionMatcher<'d, 'c> {
    /// `completer` is used for the parameters which have no completer of
    /// their own.
    pub fn new(
        root: &'d CommandDescriptor,
        completer: &'c dyn Completer,
    ) -> CompletionMatcher<'d, 'c> {
        CompletionMatcher {
            root,
            completer,
            quoting: Quoting::Shell,
        }
    }

    pub fn quoting(mut self, quoting: Quoting) -> CompletionMatcher<'d, 'c> {
        self.quoting = quoting;
        self
    }

    /// Computes what can be typed at the end of `line`.
    pub fn complete(&self, line: &str) -> Result<Completion, CompletionError> {
        trace!("completion: line='{}'", line);
        // Each stage of a pipeline starts over from the root, whatever
        // happened to the stages before it.
        let last_pipe = parser::Tokenizer::with_quoting(line, self.quoting)
            .filter_map(|token| match token {
                Token::Pipe { offset } => Some(offset),
                _ => None,
            })
            .last();
        if let Some(offset) = last_pipe {
            return self.complete(&line[offset + 1..]);
        }

        let delimiter = parser::Tokenizer::with_quoting(line, self.quoting).ending_delimiter();
        let mut parser = parser::parse_with_quoting(self.root, line, Mode::Complete, self.quoting);

        // The last event which is not a separator, and whether a separator
        // follows it.
        let mut last = None;
        let mut separator = false;
        // The last argument consumed by the active command.
        let mut argument = None;
        let mut stop = None;
        for event in parser.by_ref() {
            match event {
                Event::Separator { .. } => separator = true,
                Event::Stop(s) => stop = Some(s),
                event => {
                    match &event {
                        Event::Argument { descriptor, .. } => argument = Some(*descriptor),
                        Event::Subordinate { .. } => argument = None,
                        _ => {}
                    }
                    separator = false;
                    last = Some(event);
                }
            }
        }

        let stop = match stop {
            Some(stop) => stop,
            None => return Ok(Completion::empty("")),
        };

        let command = stop.command;
        match stop.reason {
            StopReason::Unresolved(Unresolved::NoSuchOption { token }) => {
                Ok(option_names(command, &token, delimiter))
            }
            StopReason::Unresolved(Unresolved::TooManyArguments { .. }) => {
                let rest = parser.rest();
                debug!("completion: too many arguments, rest='{}'", rest);
                // Sub-commands are only entered before the first argument.
                if argument.is_none() && !command.subordinates().is_empty() {
                    Ok(subordinate_names(command, &rest, delimiter))
                } else {
                    Ok(CompletionBuilder::new(&rest).delimiter(delimiter).build())
                }
            }
            _ => match last {
                None => self.next_parameter(command, None),
                Some(Event::Option {
                    command: owner,
                    descriptor,
                    token,
                    values,
                }) => {
                    let parameter = Parameter::Option(descriptor);
                    if !separator {
                        match values.last() {
                            None => Ok(CompletionBuilder::new(&token.raw)
                                .delimiter(delimiter)
                                .add("", true)
                                .build()),
                            Some(value) => self.parameter(parameter, &value.value, delimiter),
                        }
                    } else if values.len() < descriptor.arity() {
                        self.parameter(parameter, "", self.quoting.delimiter())
                    } else {
                        self.next_parameter(owner, argument)
                    }
                }
                Some(Event::Argument {
                    command: owner,
                    descriptor,
                    values,
                }) => {
                    if separator {
                        self.next_parameter(owner, Some(descriptor))
                    } else {
                        let prefix = values.last().map(|v| v.value.as_str()).unwrap_or("");
                        self.parameter(Parameter::Argument(descriptor), prefix, delimiter)
                    }
                }
                Some(Event::Subordinate { descriptor, token }) => {
                    if separator {
                        self.next_parameter(descriptor, None)
                    } else {
                        // The name is complete: only the separator is missing.
                        Ok(CompletionBuilder::new(&token.value)
                            .delimiter(delimiter)
                            .add("", true)
                            .build())
                    }
                }
                Some(Event::Separator { .. }) | Some(Event::Stop(_)) => {
                    self.next_parameter(command, argument)
                }
            },
        }
    }

    /// Completes the word following `argument` (or following the command
    /// name if no argument has been consumed).
    fn next_parameter(
        &self,
        command: &'d CommandDescriptor,
        argument: Option<&'d ArgumentDescriptor>,
    ) -> Result<Completion, CompletionError> {
        let next = match argument {
            None if !command.subordinates().is_empty() => {
                return Ok(subordinate_names(command, "", self.quoting.delimiter()));
            }
            None => command.arguments().first(),
            Some(argument) if argument.multiplicity() == Multiplicity::Multi => Some(argument),
            Some(argument) => command.arguments().get(argument.index() + 1),
        };

        match next {
            Some(argument) => {
                self.parameter(Parameter::Argument(argument), "", self.quoting.delimiter())
            }
            None => Ok(Completion::empty("")),
        }
    }

    fn parameter(
        &self,
        parameter: Parameter<'d>,
        prefix: &str,
        delimiter: Delimiter,
    ) -> Result<Completion, CompletionError> {
        let builder = CompletionBuilder::new(prefix).delimiter(delimiter);
        if parameter.is_password() {
            return Ok(builder.build());
        }

        let completer: &dyn Completer = match parameter.completer() {
            Some(completer) => &**completer,
            None => self.completer,
        };

        let candidates = completer.complete(parameter, prefix)?;
        trace!(
            "completion: {} candidates for `{}' (prefix='{}')",
            candidates.len(),
            parameter.name(),
            prefix
        );
        Ok(builder.matching(candidates).build())
    }
}

/// Long aliases of the options of `command` which start with the name typed
/// in `token`.
fn option_names(
    command: &CommandDescriptor,
    token: &Literal,
    delimiter: Delimiter,
) -> Completion {
    let long = token.kind == LiteralKind::LongOption;
    let candidates = command
        .options()
        .iter()
        .flat_map(|option| option.names())
        .filter(|name| name.chars().count() > 1)
        .map(|name| Candidate::new(name, long));

    CompletionBuilder::new(token.name())
        .delimiter(delimiter)
        .matching(candidates)
        .build()
}

fn subordinate_names(
    command: &CommandDescriptor,
    prefix: &str,
    delimiter: Delimiter,
) -> Completion {
    let candidates = command
        .subordinates()
        .iter()
        .map(|sub| Candidate::new(sub.name(), true));

    CompletionBuilder::new(prefix)
        .delimiter(delimiter)
        .matching(candidates)
        .build()
}

/// Computes what can be typed at the end of `line`.
pub fn complete(
    root: &CommandDescriptor,
    completer: &dyn Completer,
    line: &str,
) -> Result<Completion, CompletionError> {
    CompletionMatcher::new(root, completer).complete(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{EmptyCompleter, ValueTypeCompleter};
    use crate::descriptor::{ArgumentBuilder, CommandBuilder, OptionBuilder};
    use crate::types::ValueType;
    use pretty_assertions::assert_eq;

    fn root() -> CommandDescriptor {
        CommandBuilder::root()
            .subordinate(
                CommandBuilder::new("log")
                    .option(
                        OptionBuilder::new(vec!["l", "level"])
                            .value_type(ValueType::enumeration(vec!["debug", "info", "warn"])),
                    )
                    .option(OptionBuilder::new(vec!["p", "pass"]).value_type(ValueType::Password))
                    .argument(ArgumentBuilder::new("verbose").value_type(ValueType::Boolean))
                    .argument(
                        ArgumentBuilder::new("levels")
                            .value_type(ValueType::enumeration(vec!["debug", "info"]))
                            .multi(),
                    ),
            )
            .build()
            .unwrap()
    }

    fn values(line: &str) -> Vec<String> {
        let root = root();
        complete(&root, &ValueTypeCompleter, line)
            .unwrap()
            .suffixes()
    }

    #[test]
    fn option_values() {
        assert_eq!(values("log --level "), vec!["debug ", "info ", "warn "]);
        assert_eq!(values("log --level i"), vec!["nfo "]);
        assert_eq!(values("log -l 'w"), vec!["arn' "]);
        assert_eq!(values("log --pass "), Vec::<String>::new());
    }

    #[test]
    fn argument_slots() {
        assert_eq!(values("log "), vec!["true ", "false "]);
        assert_eq!(values("log t"), vec!["rue "]);
        assert_eq!(values("log true "), vec!["debug ", "info "]);
        assert_eq!(values("log true debug "), vec!["debug ", "info "]);
        assert_eq!(values("log -l info "), vec!["true ", "false "]);
    }

    #[test]
    fn names() {
        assert_eq!(values(""), vec!["log "]);
        assert_eq!(values("lo"), vec!["g "]);
        assert_eq!(values("log"), vec![" "]);
        assert_eq!(values("log --le"), vec!["vel "]);
        assert_eq!(values("log -"), vec!["level", "pass"]);
        assert_eq!(values("log -l"), vec![" "]);
    }

    #[test]
    fn pipes() {
        assert_eq!(values("log true | lo"), vec!["g "]);
    }

    #[test]
    fn parameter_completer_wins() {
        let root = CommandBuilder::root()
            .subordinate(
                CommandBuilder::new("use").argument(
                    ArgumentBuilder::new("flag")
                        .value_type(ValueType::Boolean)
                        .completer(std::sync::Arc::new(EmptyCompleter)),
                ),
            )
            .build()
            .unwrap();
        assert!(complete(&root, &ValueTypeCompleter, "use ").unwrap().is_empty());
    }
}
