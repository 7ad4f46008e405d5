//! Immutable descriptions of commands, their options and their positional
//! arguments. Descriptors are built once through the builders and shared by
//! every subsequent parse.
use std::sync::Arc;

use thiserror::Error;

use crate::completion::Completer;
use crate::types::ValueType;

mod argument;
mod command;
mod option;

pub use argument::{ArgumentBuilder, ArgumentDescriptor};
pub use command::{CommandBuilder, CommandDescriptor};
pub use option::{OptionBuilder, OptionDescriptor};
pub(crate) use option::dashed;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DescriptorError {
    #[error("option name `{name}' {reason}")]
    InvalidOptionName { name: String, reason: String },
    #[error("an option must have at least one name")]
    NoOptionNames,
    #[error("option `{option}' takes a single value but declares arity {arity}")]
    ArityOnSingle { option: String, arity: usize },
    #[error("boolean option `{option}' cannot be multi-valued")]
    MultiBoolean { option: String },
    #[error("option `{option}' must take at least one value")]
    ZeroArity { option: String },
    #[error("multi-valued argument `{argument}' must be the last one")]
    MultiArgumentNotLast { argument: String },
    #[error("invalid command name `{0}'")]
    InvalidCommandName(String),
    #[error("invalid argument name `{0}'")]
    InvalidArgumentName(String),
    #[error("duplicated option name `{0}'")]
    DuplicatedOption(String),
    #[error("duplicated argument name `{0}'")]
    DuplicatedArgument(String),
    #[error("duplicated sub-command `{0}'")]
    DuplicatedSubordinate(String),
}

/// Whether a parameter accepts one value or any number of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Multiplicity {
    Single,
    Multi,
}

/// Properties shared by options and arguments.
#[derive(Clone, Debug)]
pub(crate) struct ParameterInfo {
    pub description: String,
    pub value_type: ValueType,
    pub multiplicity: Multiplicity,
    pub required: bool,
    pub password: bool,
    pub unquote: bool,
    pub completer: Option<Arc<dyn Completer>>,
}

impl ParameterInfo {
    fn new(value_type: ValueType) -> ParameterInfo {
        ParameterInfo {
            description: String::new(),
            password: matches!(value_type, ValueType::Password),
            value_type,
            multiplicity: Multiplicity::Single,
            required: false,
            unquote: true,
            completer: None,
        }
    }
}

/// Either kind of parameter.
#[derive(Clone, Copy, Debug)]
pub enum Parameter<'a> {
    Option(&'a OptionDescriptor),
    Argument(&'a ArgumentDescriptor),
}

impl<'a> Parameter<'a> {
    fn info(&self) -> &'a ParameterInfo {
        match self {
            Parameter::Option(option) => &option.info,
            Parameter::Argument(argument) => &argument.info,
        }
    }

    /// The option name in its dashed form or the argument name.
    pub fn name(&self) -> String {
        match self {
            Parameter::Option(option) => option.display_name(),
            Parameter::Argument(argument) => argument.name().to_owned(),
        }
    }

    pub fn value_type(&self) -> &'a ValueType {
        &self.info().value_type
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.info().multiplicity
    }

    pub fn is_password(&self) -> bool {
        self.info().password
    }

    /// The completer dedicated to this parameter, if any.
    pub fn completer(&self) -> Option<&'a Arc<dyn Completer>> {
        self.info().completer.as_ref()
    }
}
