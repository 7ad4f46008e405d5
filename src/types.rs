//! Typed values and the conversions between literal text and them.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("`{0}' is not a boolean")]
    NotABoolean(String),
    #[error("`{0}' is not an integer")]
    NotAnInteger(String),
    #[error("`{0}' is not a number")]
    NotAFloat(String),
    #[error("`{literal}' is not one of {}", expected.join(", "))]
    NotAVariant {
        literal: String,
        expected: Vec<String>,
    },
    #[error("{0}")]
    Custom(String),
}

/// A converted parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Enum(String),
    /// A string which must not be echoed back.
    Password(String),
    /// Values of a multi-valued option or argument.
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) | Value::Password(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the literal text which converts back into this value. Unlike
    /// `Display`, passwords are not masked.
    pub fn to_literal(&self) -> String {
        match self {
            Value::String(s) | Value::Enum(s) | Value::Password(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::List(values) => values
                .iter()
                .map(Value::to_literal)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Password(_) => write!(f, "********"),
            Value::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
            _ => write!(f, "{}", self.to_literal()),
        }
    }
}

/// A user-defined value type.
pub trait ValueConverter: Send + Sync + fmt::Debug {
    /// The name used to refer to the type in manifests.
    fn name(&self) -> &str;

    fn parse(&self, literal: &str) -> Result<Value, ConversionError>;

    /// Known values starting with `prefix`, used by completion.
    fn candidates(&self, _prefix: &str) -> Vec<String> {
        Vec::new()
    }
}

/// The declared type of an option or an argument.
#[derive(Clone, Debug)]
pub enum ValueType {
    String,
    Boolean,
    Integer,
    Float,
    Password,
    Enum(Arc<[String]>),
    Custom(Arc<dyn ValueConverter>),
}

impl ValueType {
    pub fn enumeration<I, S>(variants: I) -> ValueType
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variants: Vec<String> = variants.into_iter().map(Into::into).collect();
        ValueType::Enum(variants.into())
    }

    pub fn custom<C: ValueConverter + 'static>(converter: C) -> ValueType {
        ValueType::Custom(Arc::new(converter))
    }

    pub fn name(&self) -> &str {
        match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Password => "password",
            ValueType::Enum(_) => "enum",
            ValueType::Custom(converter) => converter.name(),
        }
    }

    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self, ValueType::Boolean)
    }

    pub fn parse(&self, literal: &str) -> Result<Value, ConversionError> {
        match self {
            ValueType::String => Ok(Value::String(literal.to_owned())),
            ValueType::Password => Ok(Value::Password(literal.to_owned())),
            ValueType::Boolean => match literal {
                "true" | "yes" | "on" => Ok(Value::Boolean(true)),
                "false" | "no" | "off" => Ok(Value::Boolean(false)),
                _ => Err(ConversionError::NotABoolean(literal.to_owned())),
            },
            ValueType::Integer => literal
                .parse()
                .map(Value::Integer)
                .map_err(|_| ConversionError::NotAnInteger(literal.to_owned())),
            ValueType::Float => literal
                .parse()
                .map(Value::Float)
                .map_err(|_| ConversionError::NotAFloat(literal.to_owned())),
            ValueType::Enum(variants) => {
                if variants.iter().any(|v| v == literal) {
                    Ok(Value::Enum(literal.to_owned()))
                } else {
                    Err(ConversionError::NotAVariant {
                        literal: literal.to_owned(),
                        expected: variants.to_vec(),
                    })
                }
            }
            ValueType::Custom(converter) => converter.parse(literal),
        }
    }

    /// Values of this type which start with `prefix`.
    pub fn candidates(&self, prefix: &str) -> Vec<String> {
        match self {
            ValueType::Boolean => starting_with(&["true", "false"], prefix),
            ValueType::Enum(variants) => {
                let variants: Vec<&str> = variants.iter().map(String::as_str).collect();
                starting_with(&variants, prefix)
            }
            ValueType::Custom(converter) => converter.candidates(prefix),
            _ => Vec::new(),
        }
    }
}

fn starting_with(values: &[&str], prefix: &str) -> Vec<String> {
    values
        .iter()
        .filter(|v| v.starts_with(prefix))
        .map(|v| (*v).to_owned())
        .collect()
}

impl PartialEq for ValueType {
    fn eq(&self, other: &ValueType) -> bool {
        match (self, other) {
            (ValueType::Enum(a), ValueType::Enum(b)) => a == b,
            (ValueType::Custom(a), ValueType::Custom(b)) => a.name() == b.name(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

static BUILTIN_TYPES: phf::Map<&'static str, ValueType> = phf::phf_map! {
    "string" => ValueType::String,
    "boolean" => ValueType::Boolean,
    "bool" => ValueType::Boolean,
    "integer" => ValueType::Integer,
    "int" => ValueType::Integer,
    "float" => ValueType::Float,
    "password" => ValueType::Password,
};

/// Resolves type names into `ValueType`s: the built-in ones plus the custom
/// converters registered.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    custom: BTreeMap<String, ValueType>,
}

impl TypeRegistry {
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    /// Registers a custom type. A custom type shadows the built-in type with
    /// the same name.
    pub fn register<C: ValueConverter + 'static>(&mut self, converter: C) {
        let name = converter.name().to_owned();
        self.custom.insert(name, ValueType::custom(converter));
    }

    pub fn resolve(&self, name: &str) -> Option<ValueType> {
        self.custom
            .get(name)
            .cloned()
            .or_else(|| BUILTIN_TYPES.get(name).cloned())
    }
}
