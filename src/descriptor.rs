//! Function descriptors
//!
//! Value types passed from the extractor to the generator.

use crate::catalogue::{BindingKey, CreateKey};
use std::fmt;

/// Prefix that marks a parameter as the element count of an array parameter.
pub const SIZE_PREFIX: &str = "N_";

/// Return types supported for wrapped functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnType {
    /// `void`
    Void,
    /// `int` (alias of `int32_t`)
    Int,
    /// `int32_t`
    Int32,
    /// `double`
    Double,
    /// `float`
    Float,
}

impl ReturnType {
    /// Parse from a C spelling
    pub fn from_spelling(s: &str) -> Option<Self> {
        match s {
            "void" => Some(ReturnType::Void),
            "int" => Some(ReturnType::Int),
            "int32_t" => Some(ReturnType::Int32),
            "double" => Some(ReturnType::Double),
            "float" => Some(ReturnType::Float),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnType::Void => "void",
            ReturnType::Int => "int",
            ReturnType::Int32 => "int32_t",
            ReturnType::Double => "double",
            ReturnType::Float => "float",
        }
    }

    /// Creation capability that converts the native result into a JS value.
    /// `None` for `void`.
    pub fn creator(&self) -> Option<CreateKey> {
        match self {
            ReturnType::Void => None,
            ReturnType::Double | ReturnType::Float => Some(CreateKey::CreateDouble),
            ReturnType::Int | ReturnType::Int32 => Some(CreateKey::CreateInt32),
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Normalized declared type, e.g. `double*`
    pub declared_type: String,
    /// Base type without qualifiers or stars, e.g. `double`
    pub base_type: String,
    pub pointer_depth: usize,
    pub name: String,
    /// Position among all parsed parameters
    pub ordinal: usize,
    pub binding_key: BindingKey,
}

impl Parameter {
    pub fn is_array(&self) -> bool {
        self.binding_key.is_array()
    }

    /// Name of the size parameter this array expects (`N_<name>`)
    pub fn size_name(&self) -> String {
        format!("{}{}", SIZE_PREFIX, self.name)
    }
}

/// Structured result of parsing one function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub return_type: ReturnType,
    pub name: String,
    pub parameters: Vec<Parameter>,
}

impl FunctionDescriptor {
    pub fn new(
        return_type: ReturnType,
        name: impl Into<String>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            return_type,
            name: name.into(),
            parameters,
        }
    }

    /// Find a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The `N_<name>` companion of an array parameter, if present.
    pub fn size_parameter_for(&self, array: &Parameter) -> Option<&Parameter> {
        self.parameter(&array.size_name())
    }

    /// True iff `param` is named `N_<x>` and `x` is another parameter.
    pub fn is_size_parameter(&self, param: &Parameter) -> bool {
        param
            .name
            .strip_prefix(SIZE_PREFIX)
            .is_some_and(|target| self.parameter(target).is_some())
    }

    /// Parameters that receive their own argument binding, in declaration order.
    pub fn bound_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| !self.is_size_parameter(p))
    }

    /// Argument list for the wrapped native call: every parameter, in
    /// declaration order.
    pub fn call_arguments(&self) -> String {
        self.parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", param.declared_type, param.name)?;
        }
        write!(f, ")")
    }
}

/// A bound parameter: its key and, for arrays, the size variable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentBinding {
    pub name: String,
    pub key: BindingKey,
    pub size_parameter: Option<String>,
    /// Index into the JS `argv` array (position in the full parameter list)
    pub ordinal: usize,
}

impl ArgumentBinding {
    pub fn is_array(&self) -> bool {
        self.key.is_array()
    }
}
