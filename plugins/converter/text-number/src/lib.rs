use std::sync::Arc;

use morph_api::converter::Converter;
use morph_api::convertible::{Convertible, DynValue, TypeKey};
use morph_api::error::ConversionError;

/// Text-to-number converter: parses decimal text into `i64`.
///
/// Accepts surrounding whitespace and `_` digit separators.
pub struct TextToNumber;

impl Converter for TextToNumber {
    fn source_type(&self) -> TypeKey {
        TypeKey::of::<String>()
    }

    fn target_type(&self) -> TypeKey {
        TypeKey::of::<i64>()
    }

    fn convert(&self, value: DynValue) -> Result<DynValue, ConversionError> {
        let text = value
            .as_any()
            .downcast_ref::<String>()
            .ok_or_else(|| ConversionError::new("expected text input"))?;

        let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
        let number = cleaned.parse::<i64>().map_err(ConversionError::from)?;
        Ok(Arc::new(number))
    }
}

// ---------------------------------------------------------------------------
// FFI exports for dynamic (.so) loading
// ---------------------------------------------------------------------------

morph_api::morph_abi_version_fn!();
morph_api::morph_create_converter_fn!(Box::new(TextToNumber));
morph_api::morph_destroy_converter_fn!();
