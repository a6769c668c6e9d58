use std::sync::Arc;

use morph_api::converter::{Converter, FnConverter, IdentityConverter};
use morph_api::convertible::{Convertible, DynValue, TypeKey};
use morph_api::error::ConversionError;
use morph_api::value::Value;

use crate::registry::ConverterRegistry;

/// Render any neutral value as text.
///
/// Registered under the `Canonical` source key, so the hierarchy walk applies
/// it to every type that declares itself neutral.
pub struct CanonicalText;

impl Converter for CanonicalText {
    fn source_type(&self) -> TypeKey {
        TypeKey::canonical()
    }

    fn target_type(&self) -> TypeKey {
        TypeKey::of::<String>()
    }

    fn convert(&self, value: DynValue) -> Result<DynValue, ConversionError> {
        let text = lift(&value)?.to_string();
        Ok(Arc::new(text))
    }
}

/// Lift any neutral value into the `Value` tree.
pub struct CanonicalValue;

impl Converter for CanonicalValue {
    fn source_type(&self) -> TypeKey {
        TypeKey::canonical()
    }

    fn target_type(&self) -> TypeKey {
        TypeKey::of::<Value>()
    }

    fn convert(&self, value: DynValue) -> Result<DynValue, ConversionError> {
        Ok(Arc::new(lift(&value)?))
    }
}

/// Map a neutral runtime value onto the `Value` enum.
fn lift(value: &DynValue) -> Result<Value, ConversionError> {
    let any = value.as_any();
    if let Some(v) = any.downcast_ref::<Value>() {
        return Ok(v.clone());
    }
    if let Some(v) = any.downcast_ref::<String>() {
        return Ok(Value::String(v.clone()));
    }
    if let Some(v) = any.downcast_ref::<i64>() {
        return Ok(Value::Int64(*v));
    }
    if let Some(v) = any.downcast_ref::<i32>() {
        return Ok(Value::Int64(i64::from(*v)));
    }
    if let Some(v) = any.downcast_ref::<u64>() {
        return Ok(Value::UInt64(*v));
    }
    if let Some(v) = any.downcast_ref::<u32>() {
        return Ok(Value::UInt64(u64::from(*v)));
    }
    if let Some(v) = any.downcast_ref::<f64>() {
        return Ok(Value::Float64(*v));
    }
    if let Some(v) = any.downcast_ref::<f32>() {
        return Ok(Value::Float64(f64::from(*v)));
    }
    if let Some(v) = any.downcast_ref::<bool>() {
        return Ok(Value::Bool(*v));
    }
    if let Some(v) = any.downcast_ref::<Vec<u8>>() {
        return Ok(Value::Bytes(v.clone()));
    }
    if let Some(v) = any.downcast_ref::<serde_json::Value>() {
        return Ok(Value::from(v.clone()));
    }
    Err(ConversionError::new(format!(
        "{} declares the canonical marker but is not a known neutral shape",
        value.type_info().key
    )))
}

/// The stock converter set.
///
/// Identity `Canonical` converters for the neutral types are listed
/// explicitly even though the identity fast path usually answers for them —
/// they keep the "already neutral types supply an identity converter"
/// contract visible.
pub fn converters() -> Vec<Arc<dyn Converter>> {
    vec![
        Arc::new(IdentityConverter::canonical::<i64>()),
        Arc::new(IdentityConverter::canonical::<u64>()),
        Arc::new(IdentityConverter::canonical::<f64>()),
        Arc::new(IdentityConverter::canonical::<bool>()),
        Arc::new(IdentityConverter::canonical::<String>()),
        Arc::new(IdentityConverter::canonical::<Vec<u8>>()),
        Arc::new(IdentityConverter::canonical::<Value>()),
        Arc::new(CanonicalText),
        Arc::new(CanonicalValue),
        Arc::new(FnConverter::new(|v: &Value| {
            Ok(serde_json::Value::from(v.clone()))
        })),
        Arc::new(FnConverter::new(|v: &serde_json::Value| {
            Ok(Value::from(v.clone()))
        })),
        // Decimal text parse.
        Arc::new(FnConverter::new(|s: &String| {
            s.trim().parse::<i64>().map_err(ConversionError::from)
        })),
    ]
}

/// Register the stock converter set on a registry.
pub fn register_builtins(registry: &ConverterRegistry) {
    for converter in converters() {
        registry.register_converter(converter);
    }
}
