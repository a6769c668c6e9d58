use std::marker::PhantomData;
use std::sync::Arc;

use crate::convertible::{Convertible, DynValue, TypeDescribed, TypeKey};
use crate::error::ConversionError;

/// A single conversion unit bound to one declared source type and one
/// declared target type.
///
/// Stateless beyond the declared pair; `convert` is a pure function of its
/// input and fails identically on retry. The registry stores a converter
/// under its *exact* source key — all supertype matching happens at lookup
/// time, never at registration time.
pub trait Converter: Send + Sync {
    fn source_type(&self) -> TypeKey;
    fn target_type(&self) -> TypeKey;
    fn convert(&self, value: DynValue) -> Result<DynValue, ConversionError>;
}

/// Closure-backed converter between two concrete types.
///
/// Downcasts the incoming value to `S`, runs the closure, boxes the produced
/// `T`.
pub struct FnConverter<S, T, F> {
    target: TypeKey,
    f: F,
    _types: PhantomData<fn(&S) -> T>,
}

impl<S, T, F> FnConverter<S, T, F>
where
    S: Convertible + TypeDescribed,
    T: Convertible + TypeDescribed,
    F: Fn(&S) -> Result<T, ConversionError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            target: TypeKey::of::<T>(),
            f,
            _types: PhantomData,
        }
    }

    /// Register the produced value under the `Canonical` target key.
    ///
    /// The produced type must itself be neutral (its descriptor lists
    /// `Canonical`), otherwise the bridge's second hop cannot dispatch on it.
    pub fn to_canonical(f: F) -> Self {
        Self {
            target: TypeKey::canonical(),
            f,
            _types: PhantomData,
        }
    }
}

impl<S, T, F> Converter for FnConverter<S, T, F>
where
    S: Convertible + TypeDescribed,
    T: Convertible + TypeDescribed,
    F: Fn(&S) -> Result<T, ConversionError> + Send + Sync,
{
    fn source_type(&self) -> TypeKey {
        TypeKey::of::<S>()
    }

    fn target_type(&self) -> TypeKey {
        self.target
    }

    fn convert(&self, value: DynValue) -> Result<DynValue, ConversionError> {
        let source = value.as_any().downcast_ref::<S>().ok_or_else(|| {
            ConversionError::new(format!(
                "converter declared for {} received {}",
                TypeKey::of::<S>(),
                value.type_info().key
            ))
        })?;
        let produced = (self.f)(source)?;
        Ok(Arc::new(produced))
    }
}

/// Converter that returns its input unchanged.
///
/// The form already-neutral types use for their `Canonical` converter: the
/// identity result is exactly what the registry's cycle guard detects when a
/// bridge cannot make progress.
pub struct IdentityConverter {
    source: TypeKey,
    target: TypeKey,
}

impl IdentityConverter {
    pub fn new(source: TypeKey, target: TypeKey) -> Self {
        Self { source, target }
    }

    /// Identity converter from `S` to the canonical marker.
    pub fn canonical<S: TypeDescribed>() -> Self {
        Self::new(TypeKey::of::<S>(), TypeKey::canonical())
    }
}

impl Converter for IdentityConverter {
    fn source_type(&self) -> TypeKey {
        self.source
    }

    fn target_type(&self) -> TypeKey {
        self.target
    }

    fn convert(&self, value: DynValue) -> Result<DynValue, ConversionError> {
        Ok(value)
    }
}
