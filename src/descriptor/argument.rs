use std::fmt::{self, Write};
use std::sync::Arc;

use super::{DescriptorError, Multiplicity, ParameterInfo};
use crate::completion::Completer;
use crate::types::ValueType;

/// A positional parameter.
#[derive(Clone, Debug)]
pub struct ArgumentDescriptor {
    name: String,
    index: usize,
    pub(crate) info: ParameterInfo,
}

impl ArgumentDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The position among the arguments of the command.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn description(&self) -> &str {
        &self.info.description
    }

    pub fn value_type(&self) -> &ValueType {
        &self.info.value_type
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.info.multiplicity
    }

    pub fn is_required(&self) -> bool {
        self.info.required
    }

    pub fn is_password(&self) -> bool {
        self.info.password
    }

    pub fn unquote(&self) -> bool {
        self.info.unquote
    }

    /// `name`, `[name]` if optional, with a trailing `...` if multi-valued.
    pub fn print_usage<W: Write>(&self, out: &mut W) -> fmt::Result {
        let ellipsis = match self.info.multiplicity {
            Multiplicity::Single => "",
            Multiplicity::Multi => "...",
        };

        if self.info.required {
            write!(out, "{}{}", self.name, ellipsis)
        } else {
            write!(out, "[{}{}]", self.name, ellipsis)
        }
    }

    pub fn usage(&self) -> String {
        let mut usage = String::new();
        self.print_usage(&mut usage).ok();
        usage
    }
}

/// The `ArgumentDescriptor` builder.
#[derive(Clone, Debug)]
pub struct ArgumentBuilder {
    name: String,
    info: ParameterInfo,
}

impl ArgumentBuilder {
    /// An optional string argument.
    pub fn new(name: &str) -> ArgumentBuilder {
        ArgumentBuilder {
            name: name.to_owned(),
            info: ParameterInfo::new(ValueType::String),
        }
    }

    #[inline]
    pub fn description(mut self, description: &str) -> ArgumentBuilder {
        self.info.description = description.to_owned();
        self
    }

    #[inline]
    pub fn value_type(mut self, value_type: ValueType) -> ArgumentBuilder {
        if matches!(value_type, ValueType::Password) {
            self.info.password = true;
        }
        self.info.value_type = value_type;
        self
    }

    #[inline]
    pub fn multiplicity(mut self, multiplicity: Multiplicity) -> ArgumentBuilder {
        self.info.multiplicity = multiplicity;
        self
    }

    #[inline]
    pub fn multi(self) -> ArgumentBuilder {
        self.multiplicity(Multiplicity::Multi)
    }

    #[inline]
    pub fn required(mut self, required: bool) -> ArgumentBuilder {
        self.info.required = required;
        self
    }

    #[inline]
    pub fn password(mut self, password: bool) -> ArgumentBuilder {
        self.info.password = password;
        self
    }

    #[inline]
    pub fn unquote(mut self, unquote: bool) -> ArgumentBuilder {
        self.info.unquote = unquote;
        self
    }

    #[inline]
    pub fn completer(mut self, completer: Arc<dyn Completer>) -> ArgumentBuilder {
        self.info.completer = Some(completer);
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_multi(&self) -> bool {
        self.info.multiplicity == Multiplicity::Multi
    }

    pub(crate) fn build(self, index: usize) -> Result<ArgumentDescriptor, DescriptorError> {
        if self.name.is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(DescriptorError::InvalidArgumentName(self.name));
        }

        Ok(ArgumentDescriptor {
            name: self.name,
            index,
            info: self.info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn usage() {
        let usage = |builder: ArgumentBuilder| builder.build(0).unwrap().usage();
        assert_eq!(usage(ArgumentBuilder::new("src").required(true)), "src");
        assert_eq!(usage(ArgumentBuilder::new("dst")), "[dst]");
        assert_eq!(usage(ArgumentBuilder::new("files").multi()), "[files...]");
        assert_eq!(usage(ArgumentBuilder::new("files").multi().required(true)), "files...");
    }

    #[test]
    fn attributes() {
        let key = ArgumentBuilder::new("key")
            .value_type(ValueType::Password)
            .build(2)
            .unwrap();
        assert_eq!(key.index(), 2);
        assert!(key.is_password());
        assert!(key.unquote());

        assert_eq!(
            ArgumentBuilder::new("a b").build(0).unwrap_err(),
            DescriptorError::InvalidArgumentName("a b".to_owned())
        );
    }
}
