use std::collections::BTreeSet;
use std::fmt::{self, Write};

use super::option::dashed;
use super::{ArgumentBuilder, ArgumentDescriptor, DescriptorError, OptionBuilder, OptionDescriptor};

/// A command or a sub-command.
#[derive(Clone, Debug)]
pub struct CommandDescriptor {
    name: String,
    description: String,
    options: Vec<OptionDescriptor>,
    arguments: Vec<ArgumentDescriptor>,
    subordinates: Vec<CommandDescriptor>,
}

impl CommandDescriptor {
    /// The name. It is empty for the root built by `CommandBuilder::root`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    pub fn arguments(&self) -> &[ArgumentDescriptor] {
        &self.arguments
    }

    /// Sub-commands in the declaration order.
    pub fn subordinates(&self) -> &[CommandDescriptor] {
        &self.subordinates
    }

    pub fn subordinate(&self, name: &str) -> Option<&CommandDescriptor> {
        self.subordinates.iter().find(|sub| sub.name == name)
    }

    /// Looks for the option designated by a dashed token such as `--force`.
    pub fn resolve_option(&self, token: &str) -> Option<&OptionDescriptor> {
        self.options.iter().find(|option| option.matches(token))
    }

    /// Looks for an option by one of its aliases (without dashes).
    pub fn option(&self, name: &str) -> Option<&OptionDescriptor> {
        self.options.iter().find(|option| option.has_name(name))
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.arguments.iter().find(|argument| argument.name() == name)
    }

    /// Looks for a descendant following the sub-command names in `path`.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&CommandDescriptor> {
        let mut command = self;
        for name in path {
            command = command.subordinate(name.as_ref())?;
        }
        Some(command)
    }

    /// Writes the synopsis, e.g. `git commit [-a | --all] [-m | --message]`.
    /// `parents` are the names of the enclosing commands.
    pub fn print_usage<W: Write>(&self, parents: &[&str], out: &mut W) -> fmt::Result {
        let mut words: Vec<String> = parents
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| (*p).to_owned())
            .collect();
        if !self.name.is_empty() {
            words.push(self.name.clone());
        }

        words.extend(self.options.iter().map(OptionDescriptor::usage));
        if !self.subordinates.is_empty() {
            words.push("<command>".to_owned());
        }
        words.extend(self.arguments.iter().map(ArgumentDescriptor::usage));
        out.write_str(&words.join(" "))
    }

    pub fn usage(&self, parents: &[&str]) -> String {
        let mut usage = String::new();
        self.print_usage(parents, &mut usage).ok();
        usage
    }

    /// Writes a manual page.
    pub fn print_manual<W: Write>(&self, parents: &[&str], out: &mut W) -> fmt::Result {
        let mut path: Vec<&str> = parents.iter().copied().filter(|p| !p.is_empty()).collect();
        if !self.name.is_empty() {
            path.push(&self.name);
        }

        writeln!(out, "NAME")?;
        if self.description.is_empty() {
            writeln!(out, "       {}", path.join(" "))?;
        } else {
            writeln!(out, "       {} - {}", path.join(" "), self.description)?;
        }

        writeln!(out)?;
        writeln!(out, "SYNOPSIS")?;
        write!(out, "       ")?;
        self.print_usage(parents, out)?;
        writeln!(out)?;

        if !self.options.is_empty() || !self.arguments.is_empty() {
            writeln!(out)?;
            writeln!(out, "PARAMETERS")?;
            for option in &self.options {
                write!(out, "       ")?;
                option.print_usage(out)?;
                if option.arity() > 0 {
                    write!(out, " <{}>", option.value_type().name())?;
                }
                if option.is_required() {
                    write!(out, " (required)")?;
                }
                writeln!(out)?;
                if !option.description().is_empty() {
                    writeln!(out, "           {}", option.description())?;
                }
            }

            for argument in &self.arguments {
                write!(out, "       ")?;
                argument.print_usage(out)?;
                writeln!(out, " <{}>", argument.value_type().name())?;
                if !argument.description().is_empty() {
                    writeln!(out, "           {}", argument.description())?;
                }
            }
        }

        if !self.subordinates.is_empty() {
            writeln!(out)?;
            writeln!(out, "COMMANDS")?;
            let width = self.subordinates.iter().map(|s| s.name.len()).max().unwrap_or(0);
            for sub in &self.subordinates {
                writeln!(
                    out,
                    "       {:width$}   {}",
                    sub.name,
                    sub.description,
                    width = width
                )?;
            }
        }

        Ok(())
    }

    pub fn manual(&self, parents: &[&str]) -> String {
        let mut manual = String::new();
        self.print_manual(parents, &mut manual).ok();
        manual
    }
}

/// The `CommandDescriptor` builder.
#[derive(Clone, Debug)]
pub struct CommandBuilder {
    name: String,
    root: bool,
    description: String,
    options: Vec<OptionBuilder>,
    arguments: Vec<ArgumentBuilder>,
    subordinates: Vec<CommandBuilder>,
}

impl CommandBuilder {
    pub fn new(name: &str) -> CommandBuilder {
        CommandBuilder {
            name: name.to_owned(),
            root: false,
            description: String::new(),
            options: Vec::new(),
            arguments: Vec::new(),
            subordinates: Vec::new(),
        }
    }

    /// The nameless command holding the top-level commands as its
    /// sub-commands.
    pub fn root() -> CommandBuilder {
        CommandBuilder {
            root: true,
            ..CommandBuilder::new("")
        }
    }

    #[inline]
    pub fn description(mut self, description: &str) -> CommandBuilder {
        self.description = description.to_owned();
        self
    }

    #[inline]
    pub fn option(mut self, option: OptionBuilder) -> CommandBuilder {
        self.options.push(option);
        self
    }

    #[inline]
    pub fn argument(mut self, argument: ArgumentBuilder) -> CommandBuilder {
        self.arguments.push(argument);
        self
    }

    #[inline]
    pub fn subordinate(mut self, subordinate: CommandBuilder) -> CommandBuilder {
        self.subordinates.push(subordinate);
        self
    }

    /// Copies the options and the arguments of `parent` in front of the ones
    /// declared by this command.
    pub fn inherit(mut self, parent: &CommandBuilder) -> CommandBuilder {
        let mut options = parent.options.clone();
        options.append(&mut self.options);
        self.options = options;

        let mut arguments = parent.arguments.clone();
        arguments.append(&mut self.arguments);
        self.arguments = arguments;
        self
    }

    pub fn build(self) -> Result<CommandDescriptor, DescriptorError> {
        let valid_name = !self.name.is_empty()
            && !self.name.starts_with('-')
            && !self
                .name
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '|' | '\'' | '"' | '\\'));
        if !self.root && !valid_name {
            return Err(DescriptorError::InvalidCommandName(self.name));
        }

        let mut aliases = BTreeSet::new();
        for option in &self.options {
            for name in option.names() {
                if !aliases.insert(name.clone()) {
                    return Err(DescriptorError::DuplicatedOption(dashed(name)));
                }
            }
        }

        let options = self
            .options
            .into_iter()
            .map(OptionBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;

        let mut names = BTreeSet::new();
        let count = self.arguments.len();
        let mut arguments = Vec::with_capacity(count);
        for (index, argument) in self.arguments.into_iter().enumerate() {
            if argument.is_multi() && index + 1 != count {
                return Err(DescriptorError::MultiArgumentNotLast {
                    argument: argument.name().to_owned(),
                });
            }

            if !names.insert(argument.name().to_owned()) {
                return Err(DescriptorError::DuplicatedArgument(argument.name().to_owned()));
            }

            arguments.push(argument.build(index)?);
        }

        let mut names = BTreeSet::new();
        let mut subordinates = Vec::with_capacity(self.subordinates.len());
        for sub in self.subordinates {
            if !names.insert(sub.name.clone()) {
                return Err(DescriptorError::DuplicatedSubordinate(sub.name));
            }
            subordinates.push(sub.build()?);
        }

        trace!(
            "built command `{}': {} options, {} arguments, {} sub-commands",
            self.name,
            options.len(),
            arguments.len(),
            subordinates.len()
        );

        Ok(CommandDescriptor {
            name: self.name,
            description: self.description,
            options,
            arguments,
            subordinates,
        })
    }
}
