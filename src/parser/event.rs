use crate::descriptor::{ArgumentDescriptor, CommandDescriptor, OptionDescriptor};
use crate::parser::lexer::Literal;

/// One step of matching a line against a command tree.
#[derive(Clone, Debug)]
pub enum Event<'d> {
    /// Whitespaces between two literals.
    Separator { offset: usize, raw: String },
    /// An occurrence of an option. The first event of an occurrence carries no
    /// values; each value consumed afterwards yields another event carrying
    /// all values consumed so far.
    Option {
        command: &'d CommandDescriptor,
        descriptor: &'d OptionDescriptor,
        token: Literal,
        values: Vec<Literal>,
    },
    /// A value of a positional argument, with the values of the same argument
    /// consumed so far.
    Argument {
        command: &'d CommandDescriptor,
        descriptor: &'d ArgumentDescriptor,
        values: Vec<Literal>,
    },
    /// The sub-command `descriptor` becomes the active command.
    Subordinate {
        descriptor: &'d CommandDescriptor,
        token: Literal,
    },
    /// The last event of a parse.
    Stop(Stop<'d>),
}

impl<'d> Event<'d> {
    #[inline]
    pub fn is_separator(&self) -> bool {
        matches!(self, Event::Separator { .. })
    }

    /// The byte offset just after the text this event covers.
    pub fn end(&self) -> usize {
        match self {
            Event::Separator { offset, raw } => offset + raw.len(),
            Event::Option { token, values, .. } => {
                values.last().map(Literal::end).unwrap_or_else(|| token.end())
            }
            Event::Argument { values, .. } => values.last().map(Literal::end).unwrap_or(0),
            Event::Subordinate { token, .. } => token.end(),
            Event::Stop(stop) => stop.offset,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Stop<'d> {
    pub reason: StopReason<'d>,
    /// The byte offset where the parse stopped.
    pub offset: usize,
    /// The active command when the parse stopped.
    pub command: &'d CommandDescriptor,
}

#[derive(Clone, Debug)]
pub enum StopReason<'d> {
    /// The end of the input or a pipe.
    Done,
    Unresolved(Unresolved<'d>),
}

/// Why the input cannot be matched.
#[derive(Clone, Debug)]
pub enum Unresolved<'d> {
    /// An option-shaped literal which the active command does not declare.
    NoSuchOption { token: Literal },
    /// A word which fits no remaining argument.
    TooManyArguments { token: Literal },
    /// The input ran out (or hit another option) before `option` got all of
    /// its values.
    MissingValue {
        option: &'d OptionDescriptor,
        token: Literal,
    },
    MissingOption { option: &'d OptionDescriptor },
    MissingArgument { argument: &'d ArgumentDescriptor },
}

impl<'d> Stop<'d> {
    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self.reason, StopReason::Done)
    }
}
