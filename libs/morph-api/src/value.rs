use std::any::Any;
use std::fmt;

use crate::convertible::{Convertible, TypeDescribed, TypeInfo, TypeKey, NEUTRAL_TRAITS};

/// Owned neutral value representation.
///
/// This is the concrete shape canonical converters usually produce: scalars,
/// text, byte sequences, and ordered/keyed containers of the same. It is
/// itself neutral, so `Canonical`-keyed converters apply to it directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    Bool(bool),

    String(String),
    /// Opaque binary data (UUID, IP, packed structs, etc.).
    Bytes(Vec<u8>),

    /// Recursive — elements are themselves neutral.
    Array(Vec<Value>),
    /// Keyed container; insertion order preserved.
    Map(Vec<(Value, Value)>),

    Null,
}

impl Value {
    /// Human-readable name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int64(_) => "int64",
            Value::UInt64(_) => "uint64",
            Value::Float64(_) => "float64",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Null => "null",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Bytes(v) => {
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Null => f.write_str("null"),
        }
    }
}

impl TypeDescribed for Value {
    fn type_info() -> TypeInfo {
        TypeInfo {
            key: TypeKey::of::<Value>(),
            traits: NEUTRAL_TRAITS,
            parent: None,
        }
    }
}

impl Convertible for Value {
    fn type_info(&self) -> TypeInfo {
        <Self as TypeDescribed>::type_info()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// serde_json's tree is neutral too — JSON codecs hand it to the engine as-is.
impl TypeDescribed for serde_json::Value {
    fn type_info() -> TypeInfo {
        TypeInfo {
            key: TypeKey::of::<serde_json::Value>(),
            traits: NEUTRAL_TRAITS,
            parent: None,
        }
    }
}

impl Convertible for serde_json::Value {
    fn type_info(&self) -> TypeInfo {
        <Self as TypeDescribed>::type_info()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// JSON interop
// ---------------------------------------------------------------------------

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int64(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt64(u)
                } else {
                    Value::Float64(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Int64(i) => serde_json::Value::from(i),
            Value::UInt64(u) => serde_json::Value::from(u),
            // Non-finite floats have no JSON representation.
            Value::Float64(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::String(s) => serde_json::Value::String(s),
            Value::Bytes(bytes) => {
                serde_json::Value::Array(bytes.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Map(entries) => {
                let mut obj = serde_json::Map::new();
                for (k, v) in entries {
                    let key = match k {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    obj.insert(key, serde_json::Value::from(v));
                }
                serde_json::Value::Object(obj)
            }
            Value::Null => serde_json::Value::Null,
        }
    }
}
