pub mod converter;
pub mod convertible;
pub mod error;
pub mod ffi;
pub mod value;

pub use morph_api_derive::Convertible;

pub use converter::{Converter, FnConverter, IdentityConverter};
pub use convertible::{Canonical, Convertible, DynValue, TypeDescribed, TypeInfo, TypeKey, Undefined};
pub use error::ConversionError;
pub use value::Value;
