//! Stock `@stdlib/napi` type table.

use super::types::BindingKey;

/// Native spellings understood out of the box.
pub const BUILTIN_TYPES: &[(&str, BindingKey)] = &[
    ("double", BindingKey::Double),
    ("double*", BindingKey::Float64Array),
    ("float", BindingKey::Float),
    ("float*", BindingKey::Float32Array),
    ("int32_t", BindingKey::Int32),
    ("int32_t*", BindingKey::Int32Array),
    ("int", BindingKey::Int32),
    ("int*", BindingKey::Int32Array),
    ("int64_t", BindingKey::Int64),
    ("int8_t*", BindingKey::Int8Array),
    ("int16_t*", BindingKey::Int16Array),
    ("uint8_t*", BindingKey::Uint8Array),
    ("uint16_t*", BindingKey::Uint16Array),
    ("uint32_t", BindingKey::Uint32),
    ("uint32_t*", BindingKey::Uint32Array),
];

pub const DEPENDENCY_PREFIX: &str = "@stdlib/napi/";
pub const EXPORT_HEADER: &str = "#include \"stdlib/napi/export.h\"";
pub const ARGV_HEADER: &str = "#include \"stdlib/napi/argv.h\"";
pub const NODE_API_HEADER: &str = "#include <node_api.h>";
pub const ARGV_MACRO: &str = "STDLIB_NAPI_ARGV";
pub const EXPORT_MACRO: &str = "STDLIB_NAPI_MODULE_EXPORT_FCN";
pub const EXPORT_DEPENDENCY: &str = "export";
