//! Strict matching: turns a line into a typed call tree or a syntax error.
use thiserror::Error;

use crate::descriptor::{
    dashed, ArgumentDescriptor, CommandDescriptor, Multiplicity, OptionDescriptor, Parameter,
};
use crate::parser::{self, Delimiter, Event, Literal, Mode, StopReason, Unresolved};
use crate::types::{ConversionError, Value};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("no such option `{0}'")]
    NoSuchOption(String),
    #[error("no such command `{0}'")]
    NoSuchCommand(String),
    #[error("missing command{}", after(.0))]
    MissingCommand(String),
    #[error("too many arguments: `{0}'")]
    TooManyArguments(String),
    #[error("option `{0}' requires a value")]
    MissingValue(String),
    #[error("missing required option `{0}'")]
    MissingOption(String),
    #[error("missing required argument `{0}'")]
    MissingArgument(String),
    #[error("too many values for `{0}'")]
    TooManyValues(String),
    #[error("invalid value `{literal}' for `{parameter}': {source}")]
    InvalidValue {
        parameter: String,
        literal: String,
        #[source]
        source: ConversionError,
    },
}

fn after(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" after `{}'", path)
    }
}

/// One occurrence of an option: the alias as typed and its values.
#[derive(Clone, Debug)]
pub struct Occurrence {
    pub token: Literal,
    pub values: Vec<Literal>,
}

#[derive(Clone, Debug)]
pub struct OptionMatch<'d> {
    descriptor: &'d OptionDescriptor,
    occurrences: Vec<Occurrence>,
    value: Value,
}

impl<'d> OptionMatch<'d> {
    #[inline]
    pub fn descriptor(&self) -> &'d OptionDescriptor {
        self.descriptor
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// The aliases used in the line, without dashes and duplicates.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for occurrence in &self.occurrences {
            let name = occurrence.token.name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// `true` for boolean options, the converted value for single-valued
    /// options, and a `Value::List` for multi-valued ones.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The byte range from the first alias to the end of the last value.
    pub fn span(&self) -> (usize, usize) {
        match (self.occurrences.first(), self.occurrences.last()) {
            (Some(first), Some(last)) => {
                let end = last.values.last().unwrap_or(&last.token).end();
                (first.token.offset, end)
            }
            _ => (0, 0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ArgumentMatch<'d> {
    descriptor: &'d ArgumentDescriptor,
    values: Vec<Literal>,
    value: Value,
}

impl<'d> ArgumentMatch<'d> {
    #[inline]
    pub fn descriptor(&self) -> &'d ArgumentDescriptor {
        self.descriptor
    }

    pub fn literals(&self) -> &[Literal] {
        &self.values
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The byte range covered in the line.
    pub fn span(&self) -> (usize, usize) {
        match (self.values.first(), self.values.last()) {
            (Some(first), Some(last)) => (first.offset, last.end()),
            _ => (0, 0),
        }
    }
}

/// A matched command, with its sub-command if one was invoked.
#[derive(Clone, Debug)]
pub struct InvocationMatch<'d> {
    descriptor: &'d CommandDescriptor,
    options: Vec<OptionMatch<'d>>,
    arguments: Vec<ArgumentMatch<'d>>,
    subordinate: Option<Box<InvocationMatch<'d>>>,
    rest: String,
}

impl<'d> InvocationMatch<'d> {
    #[inline]
    pub fn descriptor(&self) -> &'d CommandDescriptor {
        self.descriptor
    }

    pub fn options(&self) -> &[OptionMatch<'d>] {
        &self.options
    }

    pub fn arguments(&self) -> &[ArgumentMatch<'d>] {
        &self.arguments
    }

    pub fn subordinate(&self) -> Option<&InvocationMatch<'d>> {
        self.subordinate.as_deref()
    }

    /// The innermost sub-command match, i.e. the command to run.
    pub fn leaf(&self) -> &InvocationMatch<'d> {
        let mut current = self;
        while let Some(sub) = current.subordinate() {
            current = sub;
        }
        current
    }

    /// The names of the matched commands from the root to the leaf.
    pub fn path(&self) -> Vec<&'d str> {
        let mut path = Vec::new();
        let mut current = Some(self);
        while let Some(m) = current {
            if !m.descriptor.name().is_empty() {
                path.push(m.descriptor.name());
            }
            current = m.subordinate();
        }
        path
    }

    /// The text after the pipe which ended the match, starting with the pipe.
    /// Only the top-level match carries it.
    pub fn rest(&self) -> &str {
        &self.rest
    }

    /// Looks for an option of this command by one of its aliases.
    pub fn option(&self, name: &str) -> Option<&OptionMatch<'d>> {
        self.options.iter().find(|m| m.descriptor.has_name(name))
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentMatch<'d>> {
        self.arguments.iter().find(|m| m.descriptor.name() == name)
    }

    pub fn option_value(&self, name: &str) -> Option<&Value> {
        self.option(name).map(OptionMatch::value)
    }

    pub fn argument_value(&self, name: &str) -> Option<&Value> {
        self.argument(name).map(ArgumentMatch::value)
    }

    /// Whether the boolean option `name` is set.
    pub fn flag(&self, name: &str) -> bool {
        self.option_value(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Writes the match back as a line which matches the same way.
    pub fn to_line(&self) -> String {
        let mut words = Vec::new();
        let mut current = Some(self);
        while let Some(m) = current {
            if !m.descriptor.name().is_empty() {
                words.push(m.descriptor.name().to_owned());
            }

            for option in &m.options {
                for occurrence in &option.occurrences {
                    words.push(occurrence.token.raw.clone());
                    words.extend(occurrence.values.iter().map(|v| v.raw.clone()));
                }
            }

            for argument in &m.arguments {
                words.extend(argument.values.iter().map(|v| v.raw.clone()));
            }

            current = m.subordinate();
        }

        if !self.rest.is_empty() {
            words.push(self.rest.clone());
        }

        words.join(" ")
    }
}

/// An `InvocationMatch` before its values are converted.
struct Frame<'d> {
    descriptor: &'d CommandDescriptor,
    options: Vec<(&'d OptionDescriptor, Vec<Occurrence>)>,
    arguments: Vec<(&'d ArgumentDescriptor, Vec<Literal>)>,
}

impl<'d> Frame<'d> {
    fn new(descriptor: &'d CommandDescriptor) -> Frame<'d> {
        Frame {
            descriptor,
            options: Vec::new(),
            arguments: Vec::new(),
        }
    }

    fn on_option(
        &mut self,
        descriptor: &'d OptionDescriptor,
        token: Literal,
        values: Vec<Literal>,
    ) -> Result<(), SyntaxError> {
        let index = match self
            .options
            .iter()
            .position(|(d, _)| std::ptr::eq(*d, descriptor))
        {
            Some(index) => index,
            None => {
                self.options.push((descriptor, Vec::new()));
                self.options.len() - 1
            }
        };

        let occurrences = &mut self.options[index].1;
        if values.is_empty() {
            let repeated = !occurrences.is_empty()
                && descriptor.arity() > 0
                && descriptor.multiplicity() == Multiplicity::Single;
            if repeated {
                return Err(SyntaxError::TooManyValues(descriptor.display_name()));
            }

            occurrences.push(Occurrence { token, values });
        } else if let Some(occurrence) = occurrences.last_mut() {
            occurrence.values = values;
        }

        Ok(())
    }

    fn on_argument(&mut self, descriptor: &'d ArgumentDescriptor, values: Vec<Literal>) {
        match self
            .arguments
            .iter_mut()
            .find(|(d, _)| std::ptr::eq(*d, descriptor))
        {
            Some((_, current)) => *current = values,
            None => self.arguments.push((descriptor, values)),
        }
    }

    fn convert(
        self,
        subordinate: Option<InvocationMatch<'d>>,
    ) -> Result<InvocationMatch<'d>, SyntaxError> {
        let mut options = Vec::with_capacity(self.options.len());
        for (descriptor, occurrences) in self.options {
            let parameter = Parameter::Option(descriptor);
            let value = if descriptor.arity() == 0 {
                Value::Boolean(true)
            } else {
                let mut values = Vec::new();
                for occurrence in &occurrences {
                    let mut group = occurrence
                        .values
                        .iter()
                        .map(|literal| convert(parameter, descriptor.unquote(), literal))
                        .collect::<Result<Vec<_>, _>>()?;
                    if descriptor.arity() == 1 {
                        values.append(&mut group);
                    } else {
                        values.push(Value::List(group));
                    }
                }

                match descriptor.multiplicity() {
                    Multiplicity::Single if values.len() == 1 => values.remove(0),
                    _ => Value::List(values),
                }
            };

            options.push(OptionMatch {
                descriptor,
                occurrences,
                value,
            });
        }

        let mut arguments = Vec::with_capacity(self.arguments.len());
        for (descriptor, values) in self.arguments {
            let parameter = Parameter::Argument(descriptor);
            let mut converted = values
                .iter()
                .map(|literal| convert(parameter, descriptor.unquote(), literal))
                .collect::<Result<Vec<_>, _>>()?;
            let value = match descriptor.multiplicity() {
                Multiplicity::Single if converted.len() == 1 => converted.remove(0),
                _ => Value::List(converted),
            };

            arguments.push(ArgumentMatch {
                descriptor,
                values,
                value,
            });
        }

        Ok(InvocationMatch {
            descriptor: self.descriptor,
            options,
            arguments,
            subordinate: subordinate.map(Box::new),
            rest: String::new(),
        })
    }
}

fn convert(
    parameter: Parameter<'_>,
    unquote: bool,
    literal: &Literal,
) -> Result<Value, SyntaxError> {
    let text = if unquote { &literal.value } else { &literal.raw };
    parameter
        .value_type()
        .parse(text)
        .map_err(|source| SyntaxError::InvalidValue {
            parameter: parameter.name(),
            literal: text.clone(),
            source,
        })
}

/// Quotes `value` so that it reads back as a single word.
fn quote(value: &str) -> String {
    let mut quoted = String::new();
    if value.is_empty() || value.starts_with('-') {
        quoted.push('\'');
        Delimiter::SingleQuote.escape(value, &mut quoted);
        quoted.push('\'');
    } else {
        Delimiter::Empty.escape(value, &mut quoted);
    }
    quoted
}

/// Matches lines against a command tree. The line can be prefixed with
/// sub-commands, options and arguments given programmatically.
#[derive(Clone, Debug)]
pub struct InvocationMatcher<'d> {
    root: &'d CommandDescriptor,
    current: &'d CommandDescriptor,
    prefix: Vec<String>,
}

impl<'d> InvocationMatcher<'d> {
    pub fn new(root: &'d CommandDescriptor) -> InvocationMatcher<'d> {
        InvocationMatcher {
            root,
            current: root,
            prefix: Vec::new(),
        }
    }

    /// Selects the sub-command `name` of the current command.
    pub fn subordinate(mut self, name: &str) -> Result<InvocationMatcher<'d>, SyntaxError> {
        self.current = self
            .current
            .subordinate(name)
            .ok_or_else(|| SyntaxError::NoSuchCommand(name.to_owned()))?;
        self.prefix.push(quote(name));
        Ok(self)
    }

    /// Adds occurrences of the option `name` (an alias without dashes)
    /// consuming `values`, `arity` values per occurrence.
    pub fn option(
        mut self,
        name: &str,
        values: &[&str],
    ) -> Result<InvocationMatcher<'d>, SyntaxError> {
        let option = self
            .current
            .option(name)
            .ok_or_else(|| SyntaxError::NoSuchOption(name.to_owned()))?;
        let alias = dashed(name);

        if option.arity() == 0 {
            if !values.is_empty() {
                return Err(SyntaxError::TooManyValues(alias));
            }
            self.prefix.push(alias);
            return Ok(self);
        }

        if values.is_empty() || values.len() % option.arity() != 0 {
            return Err(SyntaxError::MissingValue(alias));
        }

        for chunk in values.chunks(option.arity()) {
            self.prefix.push(alias.clone());
            self.prefix.extend(chunk.iter().map(|value| quote(value)));
        }
        Ok(self)
    }

    /// Adds argument values.
    pub fn arguments(mut self, values: &[&str]) -> InvocationMatcher<'d> {
        self.prefix.extend(values.iter().map(|value| quote(value)));
        self
    }

    /// Matches the line built so far followed by `line`.
    pub fn parse(&self, line: &str) -> Result<InvocationMatch<'d>, SyntaxError> {
        let mut full = self.prefix.join(" ");
        if !line.is_empty() {
            if !full.is_empty() {
                full.push(' ');
            }
            full.push_str(line);
        }

        trace!("invocation: line='{}'", full);
        match_line(self.root, &full)
    }

    /// Matches the line built so far.
    pub fn invoke(&self) -> Result<InvocationMatch<'d>, SyntaxError> {
        self.parse("")
    }
}

fn match_line<'d>(
    root: &'d CommandDescriptor,
    line: &str,
) -> Result<InvocationMatch<'d>, SyntaxError> {
    let mut parser = parser::parse(root, line, Mode::Invoke);
    let mut frames = vec![Frame::new(root)];
    let mut stop = None;
    for event in parser.by_ref() {
        // `frames` is never empty.
        let frame = match frames.last_mut() {
            Some(frame) => frame,
            None => break,
        };

        match event {
            Event::Separator { .. } => {}
            Event::Option {
                descriptor,
                token,
                values,
                ..
            } => frame.on_option(descriptor, token, values)?,
            Event::Argument {
                descriptor, values, ..
            } => frame.on_argument(descriptor, values),
            Event::Subordinate { descriptor, .. } => frames.push(Frame::new(descriptor)),
            Event::Stop(s) => stop = Some(s),
        }
    }

    let stop = match stop {
        Some(stop) => stop,
        None => return Err(SyntaxError::MissingCommand(String::new())),
    };

    if let StopReason::Unresolved(unresolved) = stop.reason {
        debug!("invocation: unresolved: {:?}", unresolved);
        return Err(match unresolved {
            Unresolved::NoSuchOption { token } => SyntaxError::NoSuchOption(token.raw),
            Unresolved::TooManyArguments { token } => {
                let consumed = frames.last().map(|f| !f.arguments.is_empty()).unwrap_or(false);
                if !stop.command.subordinates().is_empty() && !consumed {
                    SyntaxError::NoSuchCommand(token.value)
                } else {
                    SyntaxError::TooManyArguments(token.value)
                }
            }
            Unresolved::MissingValue { option, .. } => {
                SyntaxError::MissingValue(option.display_name())
            }
            Unresolved::MissingOption { option } => {
                SyntaxError::MissingOption(option.display_name())
            }
            Unresolved::MissingArgument { argument } => {
                SyntaxError::MissingArgument(argument.name().to_owned())
            }
        });
    }

    if let Some(leaf) = frames.last() {
        let command = leaf.descriptor;
        if !command.subordinates().is_empty() && command.arguments().is_empty() {
            let path: Vec<&str> = frames
                .iter()
                .map(|f| f.descriptor.name())
                .filter(|name| !name.is_empty())
                .collect();
            return Err(SyntaxError::MissingCommand(path.join(" ")));
        }
    }

    let mut invocation = None;
    while let Some(frame) = frames.pop() {
        invocation = Some(frame.convert(invocation)?);
    }

    let mut invocation = match invocation {
        Some(invocation) => invocation,
        None => return Err(SyntaxError::MissingCommand(String::new())),
    };
    invocation.rest = parser.rest();
    Ok(invocation)
}

/// Matches `line` against the command tree `root`.
pub fn invoke<'d>(
    root: &'d CommandDescriptor,
    line: &str,
) -> Result<InvocationMatch<'d>, SyntaxError> {
    InvocationMatcher::new(root).parse(line)
}

/// Matches each stage of a pipeline such as `cat a | grep b`.
pub fn invoke_pipeline<'d>(
    root: &'d CommandDescriptor,
    line: &str,
) -> Result<Vec<InvocationMatch<'d>>, SyntaxError> {
    let mut stages = Vec::new();
    let mut line = line.to_owned();
    loop {
        let stage = invoke(root, &line)?;
        let rest = stage.rest().strip_prefix('|').map(str::to_owned);
        stages.push(stage);
        match rest {
            Some(rest) => line = rest,
            None => break,
        }
    }

    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ArgumentBuilder, CommandBuilder, OptionBuilder};
    use crate::types::ValueType;
    use pretty_assertions::assert_eq;

    fn root() -> CommandDescriptor {
        CommandBuilder::root()
            .subordinate(
                CommandBuilder::new("cp")
                    .option(OptionBuilder::flag(vec!["f", "force"]))
                    .argument(ArgumentBuilder::new("src").required(true))
                    .argument(ArgumentBuilder::new("dst").required(true)),
            )
            .subordinate(
                CommandBuilder::new("plot")
                    .option(
                        OptionBuilder::new(vec!["p", "point"])
                            .value_type(ValueType::Integer)
                            .multi()
                            .arity(2),
                    )
                    .option(OptionBuilder::new(vec!["title"]))
                    .argument(ArgumentBuilder::new("files").multi()),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn deltas_are_folded() {
        let root = root();
        let m = invoke(&root, "plot -p 1 2 --point 3 4 a b").unwrap();
        let plot = m.leaf();
        assert_eq!(plot.descriptor().name(), "plot");

        let point = plot.option("point").unwrap();
        assert_eq!(point.names(), vec!["p", "point"]);
        assert_eq!(
            point.value(),
            &Value::List(vec![
                Value::List(vec![Value::Integer(1), Value::Integer(2)]),
                Value::List(vec![Value::Integer(3), Value::Integer(4)]),
            ])
        );
        assert_eq!(
            plot.argument_value("files"),
            Some(&Value::List(vec![
                Value::String("a".to_owned()),
                Value::String("b".to_owned())
            ]))
        );
        assert_eq!(plot.argument("files").map(ArgumentMatch::span), Some((24, 27)));
    }

    #[test]
    fn single_options_do_not_repeat() {
        let root = root();
        assert_eq!(
            invoke(&root, "plot --title a --title b").unwrap_err(),
            SyntaxError::TooManyValues("--title".to_owned())
        );
        assert!(invoke(&root, "cp -f -f a b").unwrap().leaf().flag("force"));
    }

    #[test]
    fn programmatic() {
        let root = root();
        let m = InvocationMatcher::new(&root)
            .subordinate("plot")
            .unwrap()
            .option("point", &["1", "-2"])
            .unwrap()
            .arguments(&["my file"])
            .invoke()
            .unwrap();
        assert_eq!(m.to_line(), "plot --point 1 '-2' my\\ file");
        assert_eq!(
            m.leaf().argument_value("files"),
            Some(&Value::List(vec![Value::String("my file".to_owned())]))
        );

        let matcher = InvocationMatcher::new(&root).subordinate("plot").unwrap();
        assert_eq!(
            matcher.clone().option("point", &["1"]).unwrap_err(),
            SyntaxError::MissingValue("--point".to_owned())
        );
        assert_eq!(
            matcher.option("x", &[]).unwrap_err(),
            SyntaxError::NoSuchOption("x".to_owned())
        );
    }

    #[test]
    fn missing_command() {
        let root = root();
        assert_eq!(
            invoke(&root, "").unwrap_err(),
            SyntaxError::MissingCommand(String::new())
        );
        assert_eq!(
            invoke(&root, "rm x").unwrap_err(),
            SyntaxError::NoSuchCommand("rm".to_owned())
        );
    }
}
