use std::fmt::{self, Write};
use std::sync::Arc;

use super::{DescriptorError, Multiplicity, ParameterInfo};
use crate::completion::Completer;
use crate::types::ValueType;

/// A named switch such as `-f` or `--force`.
#[derive(Clone, Debug)]
pub struct OptionDescriptor {
    names: Vec<String>,
    arity: usize,
    pub(crate) info: ParameterInfo,
}

impl OptionDescriptor {
    /// Aliases without dashes: one-character names are written `-f`, longer
    /// ones `--force`.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The number of values each occurrence consumes.
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
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

    /// Whether `token` (`-f`, `--force`) designates this option.
    pub fn matches(&self, token: &str) -> bool {
        self.names.iter().any(|name| dashed(name) == token)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// The first alias in its dashed form, used in messages.
    pub fn display_name(&self) -> String {
        dashed(&self.names[0])
    }

    /// Writes the aliases as alternatives, e.g. `[-f | --force]`.
    pub fn print_usage<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_char('[')?;
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                out.write_str(" | ")?;
            }
            out.write_str(&dashed(name))?;
        }
        out.write_char(']')
    }

    pub fn usage(&self) -> String {
        let mut usage = String::new();
        self.print_usage(&mut usage).ok();
        usage
    }
}

pub(crate) fn dashed(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{}", name)
    } else {
        format!("--{}", name)
    }
}

fn validate_name(name: &str) -> Result<(), DescriptorError> {
    let invalid = |reason: String| DescriptorError::InvalidOptionName {
        name: name.to_owned(),
        reason,
    };

    let chars: Vec<char> = name.chars().collect();
    let (first, last) = match (chars.first(), chars.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(invalid("cannot be empty".to_owned())),
    };

    if !first.is_ascii_alphabetic() {
        return Err(invalid(format!("cannot start with `{}'", first)));
    }

    if !last.is_ascii_alphabetic() {
        return Err(invalid(format!("cannot end with `{}'", last)));
    }

    for (i, c) in chars.iter().enumerate().skip(1) {
        if !c.is_ascii_alphabetic() && *c != '-' {
            return Err(invalid(format!("cannot contain `{}' at position {}", c, i)));
        }
    }

    Ok(())
}

/// The `OptionDescriptor` builder.
#[derive(Clone, Debug)]
pub struct OptionBuilder {
    names: Vec<String>,
    arity: Option<usize>,
    info: ParameterInfo,
}

impl OptionBuilder {
    /// A string option.
    pub fn new<I, S>(names: I) -> OptionBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionBuilder {
            names: names.into_iter().map(Into::into).collect(),
            arity: None,
            info: ParameterInfo::new(ValueType::String),
        }
    }

    /// A boolean option, which takes no values.
    pub fn flag<I, S>(names: I) -> OptionBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionBuilder::new(names).value_type(ValueType::Boolean)
    }

    #[inline]
    pub fn description(mut self, description: &str) -> OptionBuilder {
        self.info.description = description.to_owned();
        self
    }

    #[inline]
    pub fn value_type(mut self, value_type: ValueType) -> OptionBuilder {
        if matches!(value_type, ValueType::Password) {
            self.info.password = true;
        }
        self.info.value_type = value_type;
        self
    }

    #[inline]
    pub fn multiplicity(mut self, multiplicity: Multiplicity) -> OptionBuilder {
        self.info.multiplicity = multiplicity;
        self
    }

    #[inline]
    pub fn multi(self) -> OptionBuilder {
        self.multiplicity(Multiplicity::Multi)
    }

    #[inline]
    pub fn arity(mut self, arity: usize) -> OptionBuilder {
        self.arity = Some(arity);
        self
    }

    #[inline]
    pub fn required(mut self, required: bool) -> OptionBuilder {
        self.info.required = required;
        self
    }

    #[inline]
    pub fn password(mut self, password: bool) -> OptionBuilder {
        self.info.password = password;
        self
    }

    /// Whether values are bound decoded (the default) or as written.
    #[inline]
    pub fn unquote(mut self, unquote: bool) -> OptionBuilder {
        self.info.unquote = unquote;
        self
    }

    #[inline]
    pub fn completer(mut self, completer: Arc<dyn Completer>) -> OptionBuilder {
        self.info.completer = Some(completer);
        self
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    pub fn build(self) -> Result<OptionDescriptor, DescriptorError> {
        if self.names.is_empty() {
            return Err(DescriptorError::NoOptionNames);
        }

        for name in &self.names {
            validate_name(name)?;
        }

        let option = dashed(&self.names[0]);
        let boolean = self.info.value_type.is_boolean();
        if boolean && self.info.multiplicity == Multiplicity::Multi {
            return Err(DescriptorError::MultiBoolean { option });
        }

        let arity = if boolean {
            0
        } else {
            match self.arity.unwrap_or(1) {
                0 => return Err(DescriptorError::ZeroArity { option }),
                arity if arity > 1 && self.info.multiplicity == Multiplicity::Single => {
                    return Err(DescriptorError::ArityOnSingle { option, arity });
                }
                arity => arity,
            }
        };

        Ok(OptionDescriptor {
            names: self.names,
            arity,
            info: self.info,
        })
    }
}
