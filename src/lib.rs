//! A declarative command grammar engine.
//!
//! A command tree is described once with the builders in [`descriptor`] (or
//! loaded from a [`manifest`]) and then used to match lines in two ways:
//! [`invoke`] turns a complete line into a typed call tree, and [`complete`]
//! tells what can be typed at the end of a partial one. Both walk the line
//! with the same [`parser::Parser`].
#[macro_use]
extern crate log;

pub mod completion;
pub mod descriptor;
pub mod invocation;
pub mod manifest;
pub mod parser;
pub mod types;

pub use completion::{
    complete, Candidate, Completer, Completion, CompletionBuilder, CompletionError,
    CompletionMatcher, EmptyCompleter, PathCompleter, ValueTypeCompleter,
};
pub use descriptor::{
    ArgumentBuilder, ArgumentDescriptor, CommandBuilder, CommandDescriptor, DescriptorError,
    Multiplicity, OptionBuilder, OptionDescriptor, Parameter,
};
pub use invocation::{
    invoke, invoke_pipeline, ArgumentMatch, InvocationMatch, InvocationMatcher, OptionMatch,
    SyntaxError,
};
pub use manifest::ManifestError;
pub use types::{ConversionError, TypeRegistry, Value, ValueConverter, ValueType};
