use std::mem;
use std::ptr;

use crate::descriptor::{CommandDescriptor, Multiplicity, OptionDescriptor};
use crate::parser::event::{Event, Stop, StopReason, Unresolved};
use crate::parser::lexer::{Literal, Token};

/// How tolerant the parser is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Unmet requirements stop the parse as unresolved.
    Invoke,
    /// The line is being typed: the end of the input is always fine.
    Complete,
}

enum State<'d> {
    /// Expecting an option, a sub-command or an argument.
    Command,
    /// Consuming the values of an option.
    Values {
        descriptor: &'d OptionDescriptor,
        token: Literal,
        values: Vec<Literal>,
    },
    Stopped,
}

/// Walks tokens against a command tree and yields `Event`s, ending with
/// exactly one `Event::Stop`.
pub struct Parser<'d, I: Iterator<Item = Token>> {
    tokens: I,
    mode: Mode,
    command: &'d CommandDescriptor,
    state: State<'d>,
    /// The next argument slot of the active command.
    argument: usize,
    /// The values consumed by the current argument slot.
    argument_values: Vec<Literal>,
    /// Options of the active command seen so far.
    seen: Vec<&'d OptionDescriptor>,
    /// The raw text of the token which stopped the parse.
    stop_raw: String,
    offset: usize,
}

impl<'d, I: Iterator<Item = Token>> Parser<'d, I> {
    pub fn new(tokens: I, root: &'d CommandDescriptor, mode: Mode) -> Parser<'d, I> {
        Parser {
            tokens,
            mode,
            command: root,
            state: State::Command,
            argument: 0,
            argument_values: Vec::new(),
            seen: Vec::new(),
            stop_raw: String::new(),
            offset: 0,
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The active command.
    #[inline]
    pub fn command(&self) -> &'d CommandDescriptor {
        self.command
    }

    /// The text left unconsumed once the parse has stopped, starting with
    /// the token which stopped it.
    pub fn rest(&mut self) -> String {
        let mut rest = mem::replace(&mut self.stop_raw, String::new());
        for token in &mut self.tokens {
            rest.push_str(token.raw());
        }
        rest
    }

    fn stop(&mut self, reason: StopReason<'d>, offset: usize, raw: &str) -> Event<'d> {
        self.state = State::Stopped;
        self.stop_raw = raw.to_owned();
        trace!("parser: stop at {}: {}", offset, reason_name(&reason));
        Event::Stop(Stop {
            reason,
            offset,
            command: self.command,
        })
    }

    /// Looks for the first requirement of the active command which is not
    /// met.
    fn unmet_requirement(&self) -> Option<Unresolved<'d>> {
        if self.mode == Mode::Complete {
            return None;
        }

        let command = self.command;
        for option in command.options() {
            if option.is_required() && !self.seen.iter().any(|seen| ptr::eq(*seen, option)) {
                return Some(Unresolved::MissingOption { option });
            }
        }

        for argument in &command.arguments()[self.argument.min(command.arguments().len())..] {
            let filled = argument.index() == self.argument && !self.argument_values.is_empty();
            if argument.is_required() && !filled {
                return Some(Unresolved::MissingArgument { argument });
            }
        }

        None
    }

    /// Stops the parse at the end of the input or at a pipe.
    fn finish(&mut self, token: &Token) -> Event<'d> {
        let reason = match self.unmet_requirement() {
            Some(unresolved) => StopReason::Unresolved(unresolved),
            None => StopReason::Done,
        };
        self.stop(reason, token.offset(), token.raw())
    }

    fn on_value(
        &mut self,
        token: Token,
        descriptor: &'d OptionDescriptor,
        option: Literal,
        mut values: Vec<Literal>,
    ) -> Event<'d> {
        match token {
            Token::Separator { offset, raw } => {
                self.state = State::Values {
                    descriptor,
                    token: option,
                    values,
                };
                Event::Separator { offset, raw }
            }
            Token::Literal(literal) if !literal.is_option() => {
                values.push(literal);
                if values.len() < descriptor.arity() {
                    self.state = State::Values {
                        descriptor,
                        token: option.clone(),
                        values: values.clone(),
                    };
                }

                Event::Option {
                    command: self.command,
                    descriptor,
                    token: option,
                    values,
                }
            }
            // While completing, the option is left incomplete and the token
            // read as usual.
            token if self.mode == Mode::Complete => match token {
                Token::Literal(_) => self.on_token(token),
                _ => self.stop(StopReason::Done, token.offset(), token.raw()),
            },
            token => {
                let unresolved = Unresolved::MissingValue {
                    option: descriptor,
                    token: option,
                };
                self.stop(StopReason::Unresolved(unresolved), token.offset(), token.raw())
            }
        }
    }

    fn on_token(&mut self, token: Token) -> Event<'d> {
        let literal = match token {
            Token::Separator { offset, raw } => return Event::Separator { offset, raw },
            Token::End { .. } | Token::Pipe { .. } => return self.finish(&token),
            Token::Literal(literal) => literal,
        };

        if literal.is_option() {
            return self.on_option(literal);
        }

        if self.argument == 0 && self.argument_values.is_empty() {
            if let Some(sub) = self.command.subordinate(&literal.value) {
                if let Some(unresolved) = self.unmet_requirement() {
                    let offset = literal.offset;
                    return self.stop(StopReason::Unresolved(unresolved), offset, &literal.raw);
                }

                trace!("parser: entering `{}'", sub.name());
                self.command = sub;
                self.seen.clear();
                return Event::Subordinate {
                    descriptor: sub,
                    token: literal,
                };
            }
        }

        let command = self.command;
        let descriptor = match command.arguments().get(self.argument) {
            Some(descriptor) => descriptor,
            None => {
                let offset = literal.offset;
                let raw = literal.raw.clone();
                let unresolved = Unresolved::TooManyArguments { token: literal };
                return self.stop(StopReason::Unresolved(unresolved), offset, &raw);
            }
        };

        self.argument_values.push(literal);
        let values = match descriptor.multiplicity() {
            Multiplicity::Single => {
                self.argument += 1;
                mem::replace(&mut self.argument_values, Vec::new())
            }
            Multiplicity::Multi => self.argument_values.clone(),
        };

        Event::Argument {
            command,
            descriptor,
            values,
        }
    }

    fn on_option(&mut self, literal: Literal) -> Event<'d> {
        let command = self.command;
        let descriptor = match command.resolve_option(&literal.raw) {
            Some(descriptor) => descriptor,
            None => {
                let offset = literal.offset;
                let raw = literal.raw.clone();
                let unresolved = Unresolved::NoSuchOption { token: literal };
                return self.stop(StopReason::Unresolved(unresolved), offset, &raw);
            }
        };

        self.seen.push(descriptor);
        if descriptor.arity() > 0 {
            self.state = State::Values {
                descriptor,
                token: literal.clone(),
                values: Vec::new(),
            };
        }

        Event::Option {
            command,
            descriptor,
            token: literal,
            values: Vec::new(),
        }
    }
}

fn reason_name(reason: &StopReason<'_>) -> &'static str {
    match reason {
        StopReason::Done => "done",
        StopReason::Unresolved(Unresolved::NoSuchOption { .. }) => "no such option",
        StopReason::Unresolved(Unresolved::TooManyArguments { .. }) => "too many arguments",
        StopReason::Unresolved(Unresolved::MissingValue { .. }) => "missing value",
        StopReason::Unresolved(Unresolved::MissingOption { .. }) => "missing option",
        StopReason::Unresolved(Unresolved::MissingArgument { .. }) => "missing argument",
    }
}

impl<'d, I: Iterator<Item = Token>> Iterator for Parser<'d, I> {
    type Item = Event<'d>;

    fn next(&mut self) -> Option<Event<'d>> {
        if let State::Stopped = self.state {
            return None;
        }

        let token = match self.tokens.next() {
            Some(token) => token,
            // The tokenizer always ends with `End` but other sources may not.
            None => Token::End {
                offset: self.offset,
            },
        };

        self.offset = token.offset() + token.raw().len();
        let event = match mem::replace(&mut self.state, State::Command) {
            State::Command => self.on_token(token),
            State::Values {
                descriptor,
                token: option,
                values,
            } => self.on_value(token, descriptor, option, values),
            State::Stopped => return None,
        };

        Some(event)
    }
}
