//! Tolerant matching: what can be typed next at the end of a line.
use std::fmt;
use std::io;

use thiserror::Error;

use crate::descriptor::Parameter;
use crate::parser::Delimiter;

mod completers;
mod matcher;

pub use completers::{EmptyCompleter, PathCompleter, ValueTypeCompleter};
pub use matcher::{complete, CompletionMatcher};

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completer failed: {0}")]
    Completer(String),
    #[error("failed to read `{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// A suggested continuation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub value: String,
    /// Whether the word is complete, i.e. a separator should follow it.
    pub terminal: bool,
}

impl Candidate {
    pub fn new(value: &str, terminal: bool) -> Candidate {
        Candidate {
            value: value.to_owned(),
            terminal,
        }
    }
}

/// Enumerates the values of a parameter.
pub trait Completer: Send + Sync + fmt::Debug {
    /// Values of `parameter` starting with `prefix`. The values are whole
    /// words, not the text after `prefix`.
    fn complete(
        &self,
        parameter: Parameter<'_>,
        prefix: &str,
    ) -> Result<Vec<Candidate>, CompletionError>;
}

/// The continuations of a line: each candidate is the text to append to
/// `prefix`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    delimiter: Delimiter,
    prefix: String,
    candidates: Vec<Candidate>,
}

impl Completion {
    /// Nothing to suggest.
    pub fn empty(prefix: &str) -> Completion {
        CompletionBuilder::new(prefix).build()
    }

    /// The quoting context the candidates are typed in.
    #[inline]
    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// The text of the word being completed, as decoded.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The candidate values, without their flags.
    pub fn values(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.value.as_str()).collect()
    }

    /// The text to insert for each candidate: escaped for the quoting context,
    /// followed by the closing quote and a space if it is terminal.
    pub fn suffixes(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|candidate| {
                let mut suffix = String::new();
                self.delimiter.escape(&candidate.value, &mut suffix);
                if candidate.terminal {
                    if let Some(quote) = self.delimiter.closing() {
                        suffix.push(quote);
                    }
                    suffix.push(' ');
                }
                suffix
            })
            .collect()
    }
}

/// The `Completion` builder.
pub struct CompletionBuilder {
    delimiter: Delimiter,
    prefix: String,
    candidates: Vec<Candidate>,
}

impl CompletionBuilder {
    #[inline]
    pub fn new(prefix: &str) -> CompletionBuilder {
        CompletionBuilder {
            delimiter: Delimiter::Empty,
            prefix: prefix.to_owned(),
            candidates: Vec::new(),
        }
    }

    #[inline]
    pub fn delimiter(mut self, delimiter: Delimiter) -> CompletionBuilder {
        self.delimiter = delimiter;
        self
    }

    #[inline]
    pub fn add(mut self, value: &str, terminal: bool) -> CompletionBuilder {
        self.candidates.push(Candidate::new(value, terminal));
        self
    }

    /// Adds the candidates starting with the prefix, keeping only the text
    /// after it.
    pub fn matching<I>(mut self, candidates: I) -> CompletionBuilder
    where
        I: IntoIterator<Item = Candidate>,
    {
        for candidate in candidates {
            if let Some(suffix) = candidate.value.strip_prefix(self.prefix.as_str()) {
                let suffix = suffix.to_owned();
                self.candidates.push(Candidate {
                    value: suffix,
                    terminal: candidate.terminal,
                });
            }
        }
        self
    }

    #[inline]
    pub fn build(self) -> Completion {
        Completion {
            delimiter: self.delimiter,
            prefix: self.prefix,
            candidates: self.candidates,
        }
    }
}
