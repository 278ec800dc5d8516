//! Glue source (addon.c) assembly
//!
//! The file is built from fixed, ordered sections:
//!
//! ```text
//! #include "<target header>"
//! <export header>
//! <argv header>
//! <additional includes...>
//!
//! <node_api header>
//!
//! static napi_value addon( napi_env env, napi_callback_info info ) {
//!     <argc declaration>
//!     <scalar bindings...>
//!     <array bindings...>
//!     <call / return block>
//! }
//!
//! <module export>
//! ```
//!
//! Callers fill the sections; [`GlueSource::render`] owns the order.

/// Result variable used by the creation macros.
pub const RESULT_VAR: &str = "FINALRETURNVALUEADDON";

/// Name of the generated N-API callback.
pub const ADDON_FN: &str = "addon";

/// How the wrapped function's result is handed back to JavaScript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnBlock {
    /// Call for effect and return `NULL`
    Void,
    /// Wrap the call through a creation macro
    Create { macro_name: String },
}

/// A single `STDLIB_NAPI_ARGV_*` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingLine {
    Scalar {
        macro_name: String,
        name: String,
        index: usize,
    },
    Array {
        macro_name: String,
        name: String,
        size: String,
        index: usize,
    },
}

impl BindingLine {
    fn render(&self) -> String {
        match self {
            BindingLine::Scalar {
                macro_name,
                name,
                index,
            } => format!("\t{}( env, {}, argv, {} );\n", macro_name, name, index),
            BindingLine::Array {
                macro_name,
                name,
                size,
                index,
            } => format!(
                "\t{}( env, {}, {}, argv, {} );\n",
                macro_name, name, size, index
            ),
        }
    }
}

/// Sections of a generated addon source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlueSource {
    pub target_header: String,
    pub export_header: String,
    pub argv_header: String,
    pub additional_includes: Vec<String>,
    pub node_api_header: String,
    pub argv_macro: String,
    pub argc: usize,
    pub scalar_bindings: Vec<BindingLine>,
    pub array_bindings: Vec<BindingLine>,
    pub function_name: String,
    pub call_arguments: String,
    pub return_block: ReturnBlock,
    pub export_macro: String,
}

impl GlueSource {
    /// Render the addon source.
    pub fn render(&self) -> String {
        let mut output = String::new();

        // Includes
        output.push_str(&format!("#include \"{}\"\n", self.target_header));
        output.push_str(&format!("{}\n", self.export_header));
        output.push_str(&format!("{}\n", self.argv_header));
        for include in &self.additional_includes {
            output.push_str(&format!("{}\n", include));
        }
        output.push('\n');
        output.push_str(&format!("{}\n\n", self.node_api_header));

        // Wrapper body
        output.push_str(&format!(
            "static napi_value {}( napi_env env, napi_callback_info info ) {{",
            ADDON_FN
        ));
        output.push_str(&format!(
            "\n\t{}( env, info, argv, argc, {} );\n",
            self.argv_macro, self.argc
        ));
        for line in self.scalar_bindings.iter().chain(&self.array_bindings) {
            output.push_str(&line.render());
        }
        output.push_str(&self.render_return());
        output.push_str("}\n\n");

        output.push_str(&format!("{}( {} )", self.export_macro, ADDON_FN));
        output
    }

    fn render_return(&self) -> String {
        let call = format!("{}({})", self.function_name, self.call_arguments);
        match &self.return_block {
            ReturnBlock::Void => format!("\n\t{};\n\treturn NULL;\n", call),
            ReturnBlock::Create { macro_name } => format!(
                "\n\t{}( env, {}, {} );\n\treturn {};\n",
                macro_name, call, RESULT_VAR, RESULT_VAR
            ),
        }
    }
}
