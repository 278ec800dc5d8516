//! Signature Extractor
//!
//! Turns C source text into [`FunctionDescriptor`]s.
//!
//! # Pipeline
//!
//! ```text
//! source text ──lexer──▶ tokens ──parser──▶ raw definitions
//!             ──resolve (TypeCatalogue)──▶ FunctionDescriptor
//! ```
//!
//! Every definition found at the top level is resolved and validated in
//! source order. When several definitions are present, [`Extractor::extract`]
//! applies the configured [`RedefinitionPolicy`] to pick the target.
//!
//! # Example
//!
//! ```
//! use napigen::catalogue::TypeCatalogue;
//! use napigen::extract::{ExtractOptions, Extractor};
//!
//! let catalogue = TypeCatalogue::builtin();
//! let extractor = Extractor::new(&catalogue, ExtractOptions::default());
//! let desc = extractor
//!     .extract("double sum(double* arr, int32_t N_arr) { return 0.0; }")
//!     .unwrap();
//! assert_eq!(desc.name, "sum");
//! assert_eq!(desc.parameters.len(), 2);
//! ```

pub mod lexer;
pub mod parser;

use crate::catalogue::TypeCatalogue;
use crate::descriptor::{FunctionDescriptor, Parameter, ReturnType};
use lexer::Lexer;
use log::{debug, warn};
use parser::{RawDefinition, RawFragment, SignatureParser};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while extracting a function descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Unsupported return type: {0}")]
    UnsupportedReturnType(String),

    #[error("Unsupported argument type: {base}{}", stars(.pointer_depth))]
    UnsupportedArgumentType { base: String, pointer_depth: usize },

    #[error("Missing size argument for array: {0}. Expected a variable named 'N_{0}'.")]
    MissingSizeArgument(String),

    #[error("Malformed parameter declaration: '{0}'")]
    MalformedParameterDeclaration(String),

    #[error("Duplicate parameter name: {0}")]
    DuplicateParameter(String),

    #[error("No function definition found")]
    NoFunctionFound,

    #[error("Ambiguous input: {} function definitions found ({})", .0.len(), .0.join(", "))]
    AmbiguousDefinition(Vec<String>),
}

fn stars(depth: &usize) -> String {
    "*".repeat(*depth)
}

/// What to do with a parameter fragment that does not match the grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail with [`ExtractError::MalformedParameterDeclaration`]
    #[default]
    Reject,
    /// Log a warning and drop the fragment; it takes no ordinal slot
    Skip,
}

/// What to do when the source defines more than one function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedefinitionPolicy {
    /// Target the last definition in source order
    #[default]
    Last,
    /// Fail with [`ExtractError::AmbiguousDefinition`]
    Reject,
}

/// Extractor options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
    #[serde(default)]
    pub on_redefinition: RedefinitionPolicy,
}

/// Result type for extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Parses C source into function descriptors using an injected catalogue.
pub struct Extractor<'c> {
    catalogue: &'c TypeCatalogue,
    options: ExtractOptions,
}

impl<'c> Extractor<'c> {
    pub fn new(catalogue: &'c TypeCatalogue, options: ExtractOptions) -> Self {
        Self { catalogue, options }
    }

    /// Extract every top-level definition, in source order.
    pub fn extract_all(&self, source: &str) -> ExtractResult<Vec<FunctionDescriptor>> {
        let tokens = Lexer::tokenize(source);
        let definitions = SignatureParser::new(source, &tokens).definitions();
        debug!(
            "scanned {} tokens, found {} definition(s)",
            tokens.len(),
            definitions.len()
        );

        definitions
            .into_iter()
            .map(|def| self.resolve(def))
            .collect()
    }

    /// Extract the target definition.
    pub fn extract(&self, source: &str) -> ExtractResult<FunctionDescriptor> {
        let mut all = self.extract_all(source)?;

        if all.len() > 1 {
            let names: Vec<String> = all.iter().map(|d| d.name.clone()).collect();
            match self.options.on_redefinition {
                RedefinitionPolicy::Reject => return Err(ExtractError::AmbiguousDefinition(names)),
                RedefinitionPolicy::Last => {
                    warn!(
                        "{} function definitions found ({}); using the last one",
                        names.len(),
                        names.join(", ")
                    );
                }
            }
        }

        all.pop().ok_or(ExtractError::NoFunctionFound)
    }

    fn resolve(&self, def: RawDefinition) -> ExtractResult<FunctionDescriptor> {
        let return_type = ReturnType::from_spelling(&def.return_type)
            .ok_or_else(|| ExtractError::UnsupportedReturnType(def.return_type.clone()))?;

        let mut parameters: Vec<Parameter> = Vec::with_capacity(def.params.len());
        for fragment in def.params {
            let raw = match fragment {
                RawFragment::Parameter(raw) => raw,
                RawFragment::Malformed(text) => match self.options.on_malformed {
                    MalformedPolicy::Reject => {
                        return Err(ExtractError::MalformedParameterDeclaration(text));
                    }
                    MalformedPolicy::Skip => {
                        warn!("Failed to parse argument declaration in {}: '{}'", def.name, text);
                        continue;
                    }
                },
            };

            let binding_key = self
                .catalogue
                .lookup(&raw.base_type, raw.pointer_depth)
                .ok_or_else(|| ExtractError::UnsupportedArgumentType {
                    base: raw.base_type.clone(),
                    pointer_depth: raw.pointer_depth,
                })?;

            if parameters.iter().any(|p| p.name == raw.name) {
                return Err(ExtractError::DuplicateParameter(raw.name));
            }

            parameters.push(Parameter {
                declared_type: format!("{}{}", raw.base_type, "*".repeat(raw.pointer_depth)),
                base_type: raw.base_type,
                pointer_depth: raw.pointer_depth,
                name: raw.name,
                ordinal: parameters.len(),
                binding_key,
            });
        }

        let desc = FunctionDescriptor::new(return_type, def.name, parameters);
        validate_size_parameters(&desc)?;
        debug!("extracted {}", desc);
        Ok(desc)
    }
}

/// Every array parameter needs an `N_<name>` sibling.
fn validate_size_parameters(desc: &FunctionDescriptor) -> ExtractResult<()> {
    for param in desc.parameters.iter().filter(|p| p.is_array()) {
        if desc.size_parameter_for(param).is_none() {
            return Err(ExtractError::MissingSizeArgument(param.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::BindingKey;

    fn extract(src: &str) -> ExtractResult<FunctionDescriptor> {
        let catalogue = TypeCatalogue::builtin();
        Extractor::new(&catalogue, ExtractOptions::default()).extract(src)
    }

    fn extract_with(src: &str, options: ExtractOptions) -> ExtractResult<FunctionDescriptor> {
        let catalogue = TypeCatalogue::builtin();
        Extractor::new(&catalogue, options).extract(src)
    }

    #[test]
    fn test_extract_sum() {
        let desc = extract("double sum(double* arr, int32_t N_arr) { return 0.0; }").unwrap();
        assert_eq!(desc.return_type, ReturnType::Double);
        assert_eq!(desc.name, "sum");
        assert_eq!(desc.parameters[0].name, "arr");
        assert_eq!(desc.parameters[0].declared_type, "double*");
        assert_eq!(desc.parameters[0].binding_key, BindingKey::Float64Array);
        assert_eq!(desc.parameters[0].ordinal, 0);
        assert_eq!(desc.parameters[1].name, "N_arr");
        assert_eq!(desc.parameters[1].binding_key, BindingKey::Int32);
        assert_eq!(desc.parameters[1].ordinal, 1);
    }

    #[test]
    fn test_const_is_discarded() {
        let desc = extract("void f(const double *x, const int N_x) {}").unwrap();
        assert_eq!(desc.parameters[0].binding_key, BindingKey::Float64Array);
        assert_eq!(desc.parameters[1].binding_key, BindingKey::Int32);
    }

    #[test]
    fn test_unsupported_return_type() {
        assert_eq!(
            extract("char f(int x) { return 'a'; }"),
            Err(ExtractError::UnsupportedReturnType("char".to_string()))
        );
    }

    #[test]
    fn test_unsupported_argument_types() {
        assert_eq!(
            extract("void f(char c) {}"),
            Err(ExtractError::UnsupportedArgumentType {
                base: "char".to_string(),
                pointer_depth: 0
            })
        );

        let err = extract("void f(double **m, int N_m) {}").unwrap_err();
        assert_eq!(
            err,
            ExtractError::UnsupportedArgumentType {
                base: "double".to_string(),
                pointer_depth: 2
            }
        );
        assert_eq!(err.to_string(), "Unsupported argument type: double**");
    }

    #[test]
    fn test_missing_size_argument() {
        assert_eq!(
            extract("double f(double* arr) { return arr[0]; }"),
            Err(ExtractError::MissingSizeArgument("arr".to_string()))
        );
        // size parameter for a different array does not count
        assert_eq!(
            extract("double f(double* a, int N_b) { return 0; }"),
            Err(ExtractError::MissingSizeArgument("a".to_string()))
        );
    }

    #[test]
    fn test_malformed_rejected_by_default() {
        assert_eq!(
            extract("void f(double x[], int N_x) {}"),
            Err(ExtractError::MalformedParameterDeclaration("double x[]".to_string()))
        );
    }

    #[test]
    fn test_malformed_skipped_when_lenient() {
        let options = ExtractOptions {
            on_malformed: MalformedPolicy::Skip,
            ..Default::default()
        };
        let desc = extract_with("int f(double x[], int y) { return y; }", options).unwrap();
        assert_eq!(desc.parameters.len(), 1);
        assert_eq!(desc.parameters[0].name, "y");
        assert_eq!(desc.parameters[0].ordinal, 0);
    }

    #[test]
    fn test_last_definition_wins() {
        let src = "int a(int x) { return x; }\nvoid b(double y) {}";
        let desc = extract(src).unwrap();
        assert_eq!(desc.name, "b");
        assert_eq!(desc.parameters.len(), 1);
    }

    #[test]
    fn test_redefinition_rejected_when_configured() {
        let options = ExtractOptions {
            on_redefinition: RedefinitionPolicy::Reject,
            ..Default::default()
        };
        let src = "int a(int x) { return x; }\nvoid b(double y) {}";
        assert_eq!(
            extract_with(src, options),
            Err(ExtractError::AmbiguousDefinition(vec![
                "a".to_string(),
                "b".to_string()
            ]))
        );
    }

    #[test]
    fn test_every_definition_is_validated() {
        // an unsupported helper fails extraction even though it is not the target
        let src = "char helper(int x) { return 'x'; }\nint add(int x, int y) { return x + y; }";
        assert_eq!(
            extract(src),
            Err(ExtractError::UnsupportedReturnType("char".to_string()))
        );
    }

    #[test]
    fn test_no_function() {
        assert_eq!(extract("int x = 3;"), Err(ExtractError::NoFunctionFound));
        assert_eq!(extract("double mean(int N_x, double *x);"), Err(ExtractError::NoFunctionFound));
    }

    #[test]
    fn test_duplicate_parameter() {
        assert_eq!(
            extract("int f(int x, int x) { return x; }"),
            Err(ExtractError::DuplicateParameter("x".to_string()))
        );
    }

    #[test]
    fn test_synthetic_catalogue() {
        let catalogue = TypeCatalogue::empty().with_type("real", BindingKey::Double);
        let extractor = Extractor::new(&catalogue, ExtractOptions::default());
        let desc = extractor.extract("double f(real r) { return r; }").unwrap();
        assert_eq!(desc.parameters[0].binding_key, BindingKey::Double);

        assert!(extractor.extract("double f(double r) { return r; }").is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ExtractError::MissingSizeArgument("x".to_string()).to_string(),
            "Missing size argument for array: x. Expected a variable named 'N_x'."
        );
        assert_eq!(
            ExtractError::AmbiguousDefinition(vec!["a".to_string(), "b".to_string()]).to_string(),
            "Ambiguous input: 2 function definitions found (a, b)"
        );
    }
}
