//! Binding Generator
//!
//! Maps a [`FunctionDescriptor`] onto the catalogue's binding macros and
//! emits the addon source plus its manifest.
//!
//! Argument bindings are emitted in two passes: every scalar parameter first,
//! then every array parameter, each pass in declaration order. The `argv`
//! index of a binding is the parameter's position in the full parameter list
//! (size parameters included). The native call itself always receives every
//! parameter in declaration order.

pub mod glue;
pub mod manifest;

use crate::catalogue::{BindingKey, BindingSpec, CreateKey, TypeCatalogue};
use crate::descriptor::{ArgumentBinding, FunctionDescriptor};
use glue::{BindingLine, GlueSource, ReturnBlock};
use log::debug;
use manifest::{ManifestError, ManifestFragment};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while generating an addon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("No header/macro registered for binding key {0}")]
    MissingBinding(BindingKey),

    #[error("No header/macro registered for {0}")]
    MissingCreator(CreateKey),

    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),
}

/// Result type for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Names the generated files refer to.
#[derive(Debug, Clone, Copy)]
pub struct GlueTarget<'a> {
    /// Header included first in the glue source, used verbatim
    pub header_file: &'a str,
    /// Native source file referenced by the manifest
    pub source_file: &'a str,
    /// Directory holding the header, referenced by the manifest
    pub include_dir: &'a str,
}

/// Generated addon source and manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSet {
    pub glue_source: String,
    pub manifest: ManifestFragment,
}

impl ArtifactSet {
    /// manifest.json contents
    pub fn manifest_json(&self) -> Result<String, ManifestError> {
        self.manifest.to_json()
    }
}

/// Additional includes and manifest dependencies, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    pub includes: Vec<String>,
    pub dependencies: Vec<String>,
    seen: HashSet<String>,
}

impl DependencySet {
    fn with_export(dependency: String) -> Self {
        Self {
            includes: Vec::new(),
            dependencies: vec![dependency],
            seen: HashSet::new(),
        }
    }

    /// Record a header and its dependency. The first occurrence of a header
    /// wins; later duplicates add neither an include nor a dependency.
    fn add(&mut self, header: &str, dependency: String) -> bool {
        if !self.seen.insert(header.to_string()) {
            return false;
        }
        self.includes.push(header.to_string());
        self.dependencies.push(dependency);
        true
    }
}

/// Generates addon artifacts from descriptors using an injected catalogue.
pub struct Generator<'c> {
    catalogue: &'c TypeCatalogue,
}

impl<'c> Generator<'c> {
    pub fn new(catalogue: &'c TypeCatalogue) -> Self {
        Self { catalogue }
    }

    fn spec(&self, key: BindingKey) -> GenerateResult<&'c BindingSpec> {
        self.catalogue
            .binding(key)
            .ok_or(GenerateError::MissingBinding(key))
    }

    /// Argument bindings in emission order: scalars, then arrays.
    pub fn bind(&self, desc: &FunctionDescriptor) -> GenerateResult<Vec<ArgumentBinding>> {
        let mut scalars = Vec::new();
        let mut arrays = Vec::new();

        for param in desc.bound_parameters() {
            if param.is_array() {
                let size = desc.size_parameter_for(param).ok_or_else(|| {
                    GenerateError::InternalConsistency(format!(
                        "array parameter {} reached generation without {}",
                        param.name,
                        param.size_name()
                    ))
                })?;
                arrays.push(ArgumentBinding {
                    name: param.name.clone(),
                    key: param.binding_key,
                    size_parameter: Some(size.name.clone()),
                    ordinal: param.ordinal,
                });
            } else {
                scalars.push(ArgumentBinding {
                    name: param.name.clone(),
                    key: param.binding_key,
                    size_parameter: None,
                    ordinal: param.ordinal,
                });
            }
        }

        scalars.extend(arrays);
        Ok(scalars)
    }

    /// Includes and manifest dependencies required by `desc`.
    pub fn dependencies(&self, desc: &FunctionDescriptor) -> GenerateResult<DependencySet> {
        let mut deps = DependencySet::with_export(self.catalogue.export_dependency());

        for param in desc.bound_parameters() {
            let spec = self.spec(param.binding_key)?;
            let dependency = self.catalogue.dependency_for(param.binding_key.as_str());
            deps.add(&spec.header, dependency);
        }

        if let Some(creator) = desc.return_type.creator() {
            let spec = self
                .catalogue
                .creator(creator)
                .ok_or(GenerateError::MissingCreator(creator))?;
            deps.add(&spec.header, self.catalogue.dependency_for(creator.as_str()));
        }

        Ok(deps)
    }

    fn return_block(&self, desc: &FunctionDescriptor) -> GenerateResult<ReturnBlock> {
        match desc.return_type.creator() {
            None => Ok(ReturnBlock::Void),
            Some(creator) => {
                let spec = self
                    .catalogue
                    .creator(creator)
                    .ok_or(GenerateError::MissingCreator(creator))?;
                Ok(ReturnBlock::Create {
                    macro_name: spec.macro_name.clone(),
                })
            }
        }
    }

    fn binding_line(&self, binding: &ArgumentBinding) -> GenerateResult<BindingLine> {
        let macro_name = self.spec(binding.key)?.macro_name.clone();
        let line = match (&binding.size_parameter, binding.is_array()) {
            (Some(size), true) => BindingLine::Array {
                macro_name,
                name: binding.name.clone(),
                size: size.clone(),
                index: binding.ordinal,
            },
            (None, false) => BindingLine::Scalar {
                macro_name,
                name: binding.name.clone(),
                index: binding.ordinal,
            },
            _ => {
                return Err(GenerateError::InternalConsistency(format!(
                    "binding for {} does not match its key {}",
                    binding.name, binding.key
                )));
            }
        };
        Ok(line)
    }

    /// Build the glue source sections for `desc`.
    pub fn glue(
        &self,
        desc: &FunctionDescriptor,
        target: &GlueTarget<'_>,
    ) -> GenerateResult<GlueSource> {
        self.assemble(desc, target).map(|(glue, _)| glue)
    }

    fn assemble(
        &self,
        desc: &FunctionDescriptor,
        target: &GlueTarget<'_>,
    ) -> GenerateResult<(GlueSource, Vec<String>)> {
        check_ordinals(desc)?;

        let bindings = self.bind(desc)?;
        let deps = self.dependencies(desc)?;
        let runtime = self.catalogue.runtime();

        let mut scalar_bindings = Vec::new();
        let mut array_bindings = Vec::new();
        for binding in &bindings {
            let line = self.binding_line(binding)?;
            if binding.is_array() {
                array_bindings.push(line);
            } else {
                scalar_bindings.push(line);
            }
        }

        let glue = GlueSource {
            target_header: target.header_file.to_string(),
            export_header: runtime.export_header.clone(),
            argv_header: runtime.argv_header.clone(),
            additional_includes: deps.includes,
            node_api_header: runtime.node_api_header.clone(),
            argv_macro: runtime.argv_macro.clone(),
            argc: desc.parameters.len(),
            scalar_bindings,
            array_bindings,
            function_name: desc.name.clone(),
            call_arguments: desc.call_arguments(),
            return_block: self.return_block(desc)?,
            export_macro: runtime.export_macro.clone(),
        };
        Ok((glue, deps.dependencies))
    }

    /// Generate the addon source and manifest. Nothing is produced unless
    /// every step succeeds.
    pub fn generate(
        &self,
        desc: &FunctionDescriptor,
        target: &GlueTarget<'_>,
    ) -> GenerateResult<ArtifactSet> {
        let (glue, dependencies) = self.assemble(desc, target)?;
        debug!(
            "generated {} binding line(s) and {} dependency(ies) for {}",
            glue.scalar_bindings.len() + glue.array_bindings.len(),
            dependencies.len(),
            desc.name
        );

        Ok(ArtifactSet {
            glue_source: glue.render(),
            manifest: ManifestFragment::new(target.source_file, target.include_dir, dependencies),
        })
    }
}

/// Ordinals must be the positions in the parameter list.
fn check_ordinals(desc: &FunctionDescriptor) -> GenerateResult<()> {
    for (position, param) in desc.parameters.iter().enumerate() {
        if param.ordinal != position {
            return Err(GenerateError::InternalConsistency(format!(
                "parameter {} has ordinal {} at position {}",
                param.name, param.ordinal, position
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Parameter, ReturnType};
    use crate::extract::{ExtractOptions, Extractor};

    const TARGET: GlueTarget<'static> = GlueTarget {
        header_file: "sum.h",
        source_file: "sum.c",
        include_dir: ".",
    };

    fn descriptor(src: &str) -> FunctionDescriptor {
        let catalogue = TypeCatalogue::builtin();
        Extractor::new(&catalogue, ExtractOptions::default())
            .extract(src)
            .unwrap()
    }

    #[test]
    fn test_bind_sum() {
        let catalogue = TypeCatalogue::builtin();
        let desc = descriptor("double sum(double* arr, int32_t N_arr) { return 0; }");
        let bindings = Generator::new(&catalogue).bind(&desc).unwrap();

        assert_eq!(
            bindings,
            vec![ArgumentBinding {
                name: "arr".to_string(),
                key: BindingKey::Float64Array,
                size_parameter: Some("N_arr".to_string()),
                ordinal: 0,
            }]
        );
    }

    #[test]
    fn test_bind_two_pass_order() {
        let catalogue = TypeCatalogue::builtin();
        let desc = descriptor(
            "void f(float* a, int N_a, double s, uint8_t* b, int N_b, uint32_t t) {}",
        );
        let bindings = Generator::new(&catalogue).bind(&desc).unwrap();
        let order: Vec<(&str, usize)> = bindings
            .iter()
            .map(|b| (b.name.as_str(), b.ordinal))
            .collect();
        assert_eq!(order, vec![("s", 2), ("t", 5), ("a", 0), ("b", 3)]);
        assert_eq!(desc.call_arguments(), "a, N_a, s, b, N_b, t");
    }

    #[test]
    fn test_dependencies_sum() {
        let catalogue = TypeCatalogue::builtin();
        let desc = descriptor("double sum(double* arr, int32_t N_arr) { return 0; }");
        let deps = Generator::new(&catalogue).dependencies(&desc).unwrap();

        assert_eq!(
            deps.dependencies,
            vec![
                "@stdlib/napi/export",
                "@stdlib/napi/argv-float64array",
                "@stdlib/napi/create-double",
            ]
        );
        assert_eq!(
            deps.includes,
            vec![
                "#include \"stdlib/napi/argv_float64array.h\"",
                "#include \"stdlib/napi/create_double.h\"",
            ]
        );
    }

    #[test]
    fn test_dependencies_deduplicated() {
        let catalogue = TypeCatalogue::builtin();
        // int and int32_t share a key
        let desc = descriptor("int add(int x, int32_t y, int z) { return x; }");
        let deps = Generator::new(&catalogue).dependencies(&desc).unwrap();
        assert_eq!(
            deps.dependencies,
            vec![
                "@stdlib/napi/export",
                "@stdlib/napi/argv-int32",
                "@stdlib/napi/create-int32",
            ]
        );
        assert_eq!(deps.includes.len(), 2);
    }

    #[test]
    fn test_size_parameters_add_no_dependency() {
        let catalogue = TypeCatalogue::builtin();
        let desc = descriptor("void scale(int N_x, double* x) {}");
        let deps = Generator::new(&catalogue).dependencies(&desc).unwrap();
        assert_eq!(
            deps.dependencies,
            vec!["@stdlib/napi/export", "@stdlib/napi/argv-float64array"]
        );
    }

    #[test]
    fn test_size_parameter_of_scalar_is_not_bound() {
        let catalogue = TypeCatalogue::builtin();
        let artifacts = Generator::new(&catalogue)
            .generate(&descriptor("int f(int x, int N_x) { return x; }"), &TARGET)
            .unwrap();

        assert!(artifacts
            .glue_source
            .contains("\tSTDLIB_NAPI_ARGV( env, info, argv, argc, 2 );\n"));
        assert!(artifacts
            .glue_source
            .contains("\tSTDLIB_NAPI_ARGV_INT32( env, x, argv, 0 );\n"));
        assert!(!artifacts.glue_source.contains("( env, N_x, argv"));
        assert!(artifacts.glue_source.contains("f(x, N_x)"));
        assert_eq!(
            artifacts.manifest.dependencies(),
            &[
                "@stdlib/napi/export".to_string(),
                "@stdlib/napi/argv-int32".to_string(),
                "@stdlib/napi/create-int32".to_string(),
            ]
        );
    }

    #[test]
    fn test_return_dispatch() {
        let catalogue = TypeCatalogue::builtin();
        let generator = Generator::new(&catalogue);

        let void = generator
            .generate(&descriptor("void f(double x) {}"), &TARGET)
            .unwrap();
        assert!(!void.glue_source.contains("STDLIB_NAPI_CREATE"));
        assert!(void.glue_source.contains("\n\tf(x);\n\treturn NULL;\n"));
        assert_eq!(void.manifest.dependencies().len(), 2);

        for src in ["float f(double x) { return x; }", "double f(double x) { return x; }"] {
            let out = generator.generate(&descriptor(src), &TARGET).unwrap();
            assert!(out
                .glue_source
                .contains("STDLIB_NAPI_CREATE_DOUBLE( env, f(x), FINALRETURNVALUEADDON );"));
            assert!(out
                .manifest
                .dependencies()
                .contains(&"@stdlib/napi/create-double".to_string()));
        }

        for src in ["int f(double x) { return 1; }", "int32_t f(double x) { return 1; }"] {
            let out = generator.generate(&descriptor(src), &TARGET).unwrap();
            assert!(out.glue_source.contains("#include \"stdlib/napi/create_int32.h\""));
            assert!(out.glue_source.contains("STDLIB_NAPI_CREATE_INT32( env, f(x),"));
        }
    }

    #[test]
    fn test_generate_mean() {
        let catalogue = TypeCatalogue::builtin();
        let desc = descriptor("double mean(int N_x, double *x) { return 0; }");
        let target = GlueTarget {
            header_file: "mean.h",
            source_file: "mean.c",
            include_dir: "/src/mean",
        };
        let out = Generator::new(&catalogue).generate(&desc, &target).unwrap();

        let expected = "#include \"mean.h\"
#include \"stdlib/napi/export.h\"
#include \"stdlib/napi/argv.h\"
#include \"stdlib/napi/argv_float64array.h\"
#include \"stdlib/napi/create_double.h\"

#include <node_api.h>

static napi_value addon( napi_env env, napi_callback_info info ) {
\tSTDLIB_NAPI_ARGV( env, info, argv, argc, 2 );
\tSTDLIB_NAPI_ARGV_FLOAT64ARRAY( env, x, N_x, argv, 1 );

\tSTDLIB_NAPI_CREATE_DOUBLE( env, mean(N_x, x), FINALRETURNVALUEADDON );
\treturn FINALRETURNVALUEADDON;
}

STDLIB_NAPI_MODULE_EXPORT_FCN( addon )";
        assert_eq!(out.glue_source, expected);
        assert_eq!(out.manifest.confs[0].src, vec!["./mean.c".to_string()]);
        assert_eq!(out.manifest.confs[0].include, vec!["/src/mean/".to_string()]);
    }

    #[test]
    fn test_missing_binding_in_catalogue() {
        // extraction catalogue knows `double`, generation catalogue has no header or macro for it
        let desc = descriptor("void f(double x) {}");
        let mut doc = TypeCatalogue::builtin().to_document();
        doc.types.remove("double");
        doc.bindings.remove("argv_double");
        let sparse = TypeCatalogue::from_document(doc).unwrap();

        assert_eq!(
            Generator::new(&sparse).generate(&desc, &TARGET),
            Err(GenerateError::MissingBinding(BindingKey::Double))
        );
    }

    #[test]
    fn test_missing_creator_in_catalogue() {
        let catalogue = TypeCatalogue::empty().with_type("double", BindingKey::Double);
        let desc = descriptor("double f(double x) { return x; }");
        assert_eq!(
            Generator::new(&catalogue).generate(&desc, &TARGET),
            Err(GenerateError::MissingCreator(CreateKey::CreateDouble))
        );
    }

    #[test]
    fn test_hand_built_descriptor_without_size_is_internal_error() {
        let catalogue = TypeCatalogue::builtin();
        let desc = FunctionDescriptor::new(
            ReturnType::Void,
            "f",
            vec![Parameter {
                declared_type: "double*".to_string(),
                base_type: "double".to_string(),
                pointer_depth: 1,
                name: "x".to_string(),
                ordinal: 0,
                binding_key: BindingKey::Float64Array,
            }],
        );
        assert!(matches!(
            Generator::new(&catalogue).generate(&desc, &TARGET),
            Err(GenerateError::InternalConsistency(_))
        ));
    }
}
