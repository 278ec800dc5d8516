//! Binding keys
//!
//! Identifiers for how a value crosses the N-API boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binding keys supported for function parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BindingKey {
    /// 64-bit float scalar (`double`)
    #[serde(rename = "argv_double")]
    Double,
    /// 32-bit float scalar (`float`)
    #[serde(rename = "argv_float")]
    Float,
    /// 32-bit signed integer scalar (`int32_t`, `int`)
    #[serde(rename = "argv_int32")]
    Int32,
    /// 64-bit signed integer scalar (`int64_t`)
    #[serde(rename = "argv_int64")]
    Int64,
    /// 32-bit unsigned integer scalar (`uint32_t`)
    #[serde(rename = "argv_uint32")]
    Uint32,
    /// `Float64Array` buffer (`double*`)
    #[serde(rename = "argv_float64array")]
    Float64Array,
    /// `Float32Array` buffer (`float*`)
    #[serde(rename = "argv_float32array")]
    Float32Array,
    /// `Int32Array` buffer (`int32_t*`, `int*`)
    #[serde(rename = "argv_int32array")]
    Int32Array,
    /// `Int8Array` buffer (`int8_t*`)
    #[serde(rename = "argv_int8array")]
    Int8Array,
    /// `Int16Array` buffer (`int16_t*`)
    #[serde(rename = "argv_int16array")]
    Int16Array,
    /// `Uint8Array` buffer (`uint8_t*`)
    #[serde(rename = "argv_uint8array")]
    Uint8Array,
    /// `Uint16Array` buffer (`uint16_t*`)
    #[serde(rename = "argv_uint16array")]
    Uint16Array,
    /// `Uint32Array` buffer (`uint32_t*`)
    #[serde(rename = "argv_uint32array")]
    Uint32Array,
}

impl BindingKey {
    /// Every binding key, scalars first.
    pub const ALL: [BindingKey; 13] = [
        BindingKey::Double,
        BindingKey::Float,
        BindingKey::Int32,
        BindingKey::Int64,
        BindingKey::Uint32,
        BindingKey::Float64Array,
        BindingKey::Float32Array,
        BindingKey::Int32Array,
        BindingKey::Int8Array,
        BindingKey::Int16Array,
        BindingKey::Uint8Array,
        BindingKey::Uint16Array,
        BindingKey::Uint32Array,
    ];

    /// Check if this key binds a typed array (and so needs a size argument)
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            BindingKey::Float64Array
                | BindingKey::Float32Array
                | BindingKey::Int32Array
                | BindingKey::Int8Array
                | BindingKey::Int16Array
                | BindingKey::Uint8Array
                | BindingKey::Uint16Array
                | BindingKey::Uint32Array
        )
    }

    /// Catalogue spelling of the key, e.g. `argv_float64array`
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKey::Double => "argv_double",
            BindingKey::Float => "argv_float",
            BindingKey::Int32 => "argv_int32",
            BindingKey::Int64 => "argv_int64",
            BindingKey::Uint32 => "argv_uint32",
            BindingKey::Float64Array => "argv_float64array",
            BindingKey::Float32Array => "argv_float32array",
            BindingKey::Int32Array => "argv_int32array",
            BindingKey::Int8Array => "argv_int8array",
            BindingKey::Int16Array => "argv_int16array",
            BindingKey::Uint8Array => "argv_uint8array",
            BindingKey::Uint16Array => "argv_uint16array",
            BindingKey::Uint32Array => "argv_uint32array",
        }
    }

    /// Parse from the catalogue spelling
    pub fn from_key(s: &str) -> Option<Self> {
        BindingKey::ALL.into_iter().find(|key| key.as_str() == s)
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result-creation capabilities used to hand a native return value back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateKey {
    /// `STDLIB_NAPI_CREATE_DOUBLE`
    CreateDouble,
    /// `STDLIB_NAPI_CREATE_INT32`
    CreateInt32,
}

impl CreateKey {
    pub const ALL: [CreateKey; 2] = [CreateKey::CreateDouble, CreateKey::CreateInt32];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreateKey::CreateDouble => "create_double",
            CreateKey::CreateInt32 => "create_int32",
        }
    }
}

impl fmt::Display for CreateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header and macro used for one binding or creation key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSpec {
    /// Full include line, e.g. `#include "stdlib/napi/argv_double.h"`
    pub header: String,
    /// Macro invoked in the glue source, e.g. `STDLIB_NAPI_ARGV_DOUBLE`
    #[serde(rename = "macro")]
    pub macro_name: String,
}

impl BindingSpec {
    pub fn new(header: impl Into<String>, macro_name: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            macro_name: macro_name.into(),
        }
    }

    /// Conventional `stdlib/napi` header and macro for a key spelling
    pub fn stdlib(key: &str) -> Self {
        Self {
            header: format!("#include \"stdlib/napi/{}.h\"", key),
            macro_name: format!("STDLIB_NAPI_{}", key.to_uppercase()),
        }
    }
}
