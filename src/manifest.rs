//! Declares command trees in a small text format:
//!
//! ```text
//! params common { option v,verbose "be chatty"; }
//! command git "version control" {
//!     use common;
//!     command commit "record changes" {
//!         option m,message: string required "commit message";
//!     }
//! }
//! ```
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::descriptor::{
    ArgumentBuilder, CommandBuilder, CommandDescriptor, DescriptorError, OptionBuilder,
};
use crate::types::{TypeRegistry, ValueType};

#[derive(Parser)]
#[grammar = "manifest.pest"]
struct ManifestParser;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("syntax error:\n{0}")]
    Syntax(String),
    #[error("unknown type `{0}'")]
    UnknownType(String),
    #[error("unknown parameter block `{0}'")]
    UnknownParams(String),
    #[error("duplicated parameter block `{0}'")]
    DuplicatedParams(String),
    #[error("invalid arity `{0}'")]
    InvalidArity(String),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("failed to read `{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Parameter attributes shared by options and arguments.
#[derive(Default)]
struct Attributes {
    value_type: Option<ValueType>,
    arity: Option<usize>,
    required: bool,
    multi: bool,
    password: bool,
    raw: bool,
    description: String,
}

struct Loader<'r> {
    registry: &'r TypeRegistry,
    /// Parameter blocks declared so far. Their options and arguments are
    /// held by nameless commands.
    params: BTreeMap<String, CommandBuilder>,
}

impl<'r> Loader<'r> {
    // manifest = { SOI ~ (params | command)* ~ EOI }
    fn visit_manifest(&mut self, pair: Pair<Rule>) -> Result<CommandBuilder, ManifestError> {
        let mut root = CommandBuilder::root();
        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::params => self.visit_params(item)?,
                Rule::command => root = root.subordinate(self.visit_command(item)?),
                _ => {}
            }
        }

        Ok(root)
    }

    // params = { "params" ~ ident ~ "{" ~ (option | argument)* ~ "}" }
    fn visit_params(&mut self, pair: Pair<Rule>) -> Result<(), ManifestError> {
        let mut name = String::new();
        let mut block = CommandBuilder::root();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::ident => name = inner.as_str().to_owned(),
                Rule::option => block = block.option(self.visit_option(inner)?),
                Rule::argument => block = block.argument(self.visit_argument(inner)?),
                _ => {}
            }
        }

        if self.params.contains_key(&name) {
            return Err(ManifestError::DuplicatedParams(name));
        }

        trace!("manifest: params `{}'", name);
        self.params.insert(name, block);
        Ok(())
    }

    // command = { "command" ~ ident ~ description? ~ "{" ~ (option | argument | use_params | command)* ~ "}" }
    fn visit_command(&mut self, pair: Pair<Rule>) -> Result<CommandBuilder, ManifestError> {
        let mut name = String::new();
        let mut description = String::new();
        let mut options = Vec::new();
        let mut arguments = Vec::new();
        let mut subordinates = Vec::new();
        let mut uses = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::ident => name = inner.as_str().to_owned(),
                Rule::description => description = visit_description(inner),
                Rule::option => options.push(self.visit_option(inner)?),
                Rule::argument => arguments.push(self.visit_argument(inner)?),
                Rule::command => subordinates.push(self.visit_command(inner)?),
                // use_params = { "use" ~ ident ~ ";" }
                Rule::use_params => {
                    let used = inner
                        .into_inner()
                        .next()
                        .map(|ident| ident.as_str().to_owned())
                        .unwrap_or_default();
                    if !self.params.contains_key(&used) {
                        return Err(ManifestError::UnknownParams(used));
                    }
                    uses.push(used);
                }
                _ => {}
            }
        }

        let mut command = CommandBuilder::new(&name).description(&description);
        for option in options {
            command = command.option(option);
        }
        for argument in arguments {
            command = command.argument(argument);
        }
        for sub in subordinates {
            command = command.subordinate(sub);
        }

        // Each block is put in front of the previous ones: go backwards to
        // keep the declaration order.
        for used in uses.iter().rev() {
            if let Some(block) = self.params.get(used) {
                command = command.inherit(block);
            }
        }

        Ok(command)
    }

    // option = { "option" ~ aliases ~ (":" ~ value_type)? ~ attribute* ~ description? ~ ";" }
    fn visit_option(&self, pair: Pair<Rule>) -> Result<OptionBuilder, ManifestError> {
        let mut names = Vec::new();
        let mut attributes = Attributes::default();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                // aliases = { alias ~ ("," ~ alias)* }
                Rule::aliases => {
                    names.extend(inner.into_inner().map(|alias| alias.as_str().to_owned()))
                }
                _ => self.visit_attribute(inner, &mut attributes)?,
            }
        }

        // An option without a type is a flag.
        let mut option = OptionBuilder::new(names)
            .value_type(attributes.value_type.unwrap_or(ValueType::Boolean))
            .description(&attributes.description)
            .required(attributes.required)
            .unquote(!attributes.raw);
        if let Some(arity) = attributes.arity {
            option = option.arity(arity);
        }
        if attributes.multi {
            option = option.multi();
        }
        if attributes.password {
            option = option.password(true);
        }

        Ok(option)
    }

    // argument = { "argument" ~ ident ~ (":" ~ value_type)? ~ attribute* ~ description? ~ ";" }
    fn visit_argument(&self, pair: Pair<Rule>) -> Result<ArgumentBuilder, ManifestError> {
        let mut name = String::new();
        let mut attributes = Attributes::default();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::ident => name = inner.as_str().to_owned(),
                _ => self.visit_attribute(inner, &mut attributes)?,
            }
        }

        if attributes.arity.is_some() {
            return Err(ManifestError::InvalidArity(name));
        }

        let mut argument = ArgumentBuilder::new(&name)
            .value_type(attributes.value_type.unwrap_or(ValueType::String))
            .description(&attributes.description)
            .required(attributes.required)
            .unquote(!attributes.raw);
        if attributes.multi {
            argument = argument.multi();
        }
        if attributes.password {
            argument = argument.password(true);
        }

        Ok(argument)
    }

    // value_type = { enum_type | type_name }
    // arity = { "arity" ~ "=" ~ number }
    // flag = @{ ("required" | "multi" | "password" | "raw") ~ !ident_char }
    fn visit_attribute(
        &self,
        pair: Pair<Rule>,
        attributes: &mut Attributes,
    ) -> Result<(), ManifestError> {
        match pair.as_rule() {
            Rule::value_type => {
                for inner in pair.into_inner() {
                    attributes.value_type = Some(match inner.as_rule() {
                        // enum_type = { "enum" ~ "(" ~ variant ~ ("|" ~ variant)* ~ ")" }
                        Rule::enum_type => ValueType::enumeration(
                            inner.into_inner().map(|variant| variant.as_str().to_owned()),
                        ),
                        _ => {
                            let name = inner.as_str();
                            self.registry
                                .resolve(name)
                                .ok_or_else(|| ManifestError::UnknownType(name.to_owned()))?
                        }
                    });
                }
            }
            Rule::arity => {
                let number = pair.as_str().trim_start_matches(|c: char| !c.is_ascii_digit());
                let arity = number
                    .parse()
                    .map_err(|_| ManifestError::InvalidArity(number.to_owned()))?;
                attributes.arity = Some(arity);
            }
            Rule::flag => match pair.as_str() {
                "required" => attributes.required = true,
                "multi" => attributes.multi = true,
                "password" => attributes.password = true,
                _ => attributes.raw = true,
            },
            Rule::description => attributes.description = visit_description(pair),
            _ => {}
        }

        Ok(())
    }
}

// description = { string }
// string = ${ "\"" ~ string_inner ~ "\"" }
fn visit_description(pair: Pair<Rule>) -> String {
    let text: String = pair
        .into_inner()
        .flat_map(|string| string.into_inner())
        .map(|inner| inner.as_str())
        .collect();

    let mut s = String::new();
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            escaped = false;
            s.push(ch);
        } else if ch == '\\' {
            escaped = true;
        } else {
            s.push(ch);
        }
    }

    s
}

/// Loads a command tree: the top-level commands become the sub-commands of a
/// nameless root. A parameter block must be declared before it is used.
pub fn load(source: &str, registry: &TypeRegistry) -> Result<CommandDescriptor, ManifestError> {
    let mut pairs = ManifestParser::parse(Rule::manifest, source)
        .map_err(|err| ManifestError::Syntax(err.to_string()))?;

    let mut loader = Loader {
        registry,
        params: BTreeMap::new(),
    };

    let root = match pairs.next() {
        Some(pair) => loader.visit_manifest(pair)?,
        None => CommandBuilder::root(),
    };

    Ok(root.build()?)
}

pub fn load_file<P: AsRef<Path>>(
    path: P,
    registry: &TypeRegistry,
) -> Result<CommandDescriptor, ManifestError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;

    debug!("manifest: loading {}", path.display());
    load(&source, registry)
}
