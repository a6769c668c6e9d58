use std::any::{Any, TypeId};
use std::sync::Arc;

/// Lookup key for a runtime type.
///
/// Equality and hashing use the `TypeId` only; the name rides along for
/// diagnostics (error messages, logs).
#[derive(Debug, Clone, Copy, Eq)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The universal "any value" target — conversion to it is always identity.
    pub fn any() -> Self {
        Self::of::<dyn Convertible>()
    }

    /// The neutral intermediate form used by the conversion bridge.
    pub fn canonical() -> Self {
        Self::of::<Canonical>()
    }

    /// The "no runtime type" sentinel representing an absent value.
    pub fn undefined() -> Self {
        Self::of::<Undefined>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::hash::Hash for TypeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Static type descriptor: the type's own key plus its supertype walk.
///
/// `traits` lists declared capability markers in declaration order; `parent`
/// is the base chain. Lookup walks `traits` first (recursing into each), then
/// `parent` — the first match wins, with no specificity ranking. Callers may
/// depend on that order, so it is a contract, not an implementation detail.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    pub key: TypeKey,
    pub traits: &'static [fn() -> TypeInfo],
    pub parent: Option<fn() -> TypeInfo>,
}

impl TypeInfo {
    /// Descriptor with no supertypes.
    pub fn leaf(key: TypeKey) -> Self {
        Self {
            key,
            traits: &[],
            parent: None,
        }
    }

    /// True if `target` appears anywhere in this type's walk (including the
    /// type itself). This is the engine's is-instance check.
    pub fn satisfies(&self, target: TypeKey) -> bool {
        if self.key == target {
            return true;
        }
        if self.traits.iter().any(|t| t().satisfies(target)) {
            return true;
        }
        match self.parent {
            Some(p) => p().satisfies(target),
            None => false,
        }
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("traits", &self.traits.len())
            .field("parent", &self.parent.is_some())
            .finish()
    }
}

/// Static descriptor access for a concrete type.
///
/// Usually produced by `#[derive(Convertible)]`; implemented by hand for the
/// stdlib neutral types below.
pub trait TypeDescribed: 'static {
    fn type_info() -> TypeInfo;
}

/// A runtime value the conversion engine can dispatch on.
///
/// Object-safe: gives the value's descriptor plus `Any` access for
/// downcasting inside converters.
pub trait Convertible: Any + Send + Sync {
    fn type_info(&self) -> TypeInfo;
    fn as_any(&self) -> &dyn Any;
}

impl std::fmt::Debug for dyn Convertible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Convertible({})", self.type_info().key.name())
    }
}

/// Shared handle to an arbitrary convertible value.
///
/// `Arc` so that identity conversions hand back the same allocation —
/// `Arc::ptr_eq` is the reference-identity test the bridge cycle guard uses.
pub type DynValue = Arc<dyn Convertible>;

// ---------------------------------------------------------------------------
// Reserved marker types
// ---------------------------------------------------------------------------

/// Marker target type: "neutral, universally convertible form".
///
/// Never instantiated as a value; only its `TypeKey` is used. Types that are
/// already neutral list it among their capability markers, which is how a
/// converter registered under the `Canonical` source key is reachable for
/// them through the ordinary hierarchy walk.
pub struct Canonical;

impl TypeDescribed for Canonical {
    fn type_info() -> TypeInfo {
        TypeInfo::leaf(TypeKey::of::<Canonical>())
    }
}

/// Sentinel value standing in for "no value" (null), so the type-keyed
/// lookup tables never need a null key. Converting it is always a no-op.
pub struct Undefined;

impl TypeDescribed for Undefined {
    fn type_info() -> TypeInfo {
        TypeInfo::leaf(TypeKey::of::<Undefined>())
    }
}

impl Convertible for Undefined {
    fn type_info(&self) -> TypeInfo {
        <Self as TypeDescribed>::type_info()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Neutral stdlib types: scalars, text, bytes
// ---------------------------------------------------------------------------

/// Shared walk for types that are already in neutral form.
pub(crate) static NEUTRAL_TRAITS: &[fn() -> TypeInfo] =
    &[<Canonical as TypeDescribed>::type_info];

macro_rules! neutral_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TypeDescribed for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo {
                        key: TypeKey::of::<$ty>(),
                        traits: NEUTRAL_TRAITS,
                        parent: None,
                    }
                }
            }

            impl Convertible for $ty {
                fn type_info(&self) -> TypeInfo {
                    <Self as TypeDescribed>::type_info()
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

neutral_type!(i32, i64, u32, u64, f32, f64, bool, String, Vec<u8>);
