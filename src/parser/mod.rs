//! Tokenizing a line and walking it against a command tree.
mod event;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;

use crate::descriptor::CommandDescriptor;

pub use event::{Event, Stop, StopReason, Unresolved};
pub use lexer::{Delimiter, Literal, LiteralKind, Quoting, Token, Tokenizer};
pub use parser::{Mode, Parser};

/// Parses `line` starting from `root`, with shell-style quoting.
pub fn parse<'d, 'a>(
    root: &'d CommandDescriptor,
    line: &'a str,
    mode: Mode,
) -> Parser<'d, Tokenizer<'a>> {
    parse_with_quoting(root, line, mode, Quoting::Shell)
}

pub fn parse_with_quoting<'d, 'a>(
    root: &'d CommandDescriptor,
    line: &'a str,
    mode: Mode,
    quoting: Quoting,
) -> Parser<'d, Tokenizer<'a>> {
    Parser::new(Tokenizer::with_quoting(line, quoting), root, mode)
}
