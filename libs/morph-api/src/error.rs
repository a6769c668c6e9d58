use std::fmt;

use crate::convertible::TypeKey;

/// The single error kind for every conversion failure: no direct or
/// bridgeable path, a bridge that made no progress, or a converter whose own
/// logic rejected the input.
///
/// Converter authors surface internal faults through this type (wrapping the
/// original cause) rather than letting unrelated errors escape.
#[derive(Debug)]
pub struct ConversionError {
    message: String,
    source_type: Option<&'static str>,
    target_type: Option<&'static str>,
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ConversionError {
    /// Converter-internal failure with a plain message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            source_type: None,
            target_type: None,
            cause: None,
        }
    }

    /// No direct or bridgeable converter from `source` to `target`.
    pub fn no_path(source: TypeKey, target: TypeKey) -> Self {
        Self {
            message: "no conversion path".into(),
            source_type: Some(source.name()),
            target_type: Some(target.name()),
            cause: None,
        }
    }

    /// The canonical bridge made no progress: the value was already treated
    /// as canonical with nothing more to contribute.
    pub fn no_progress(source: TypeKey, target: TypeKey) -> Self {
        Self {
            message: "canonical bridge made no progress".into(),
            source_type: Some(source.name()),
            target_type: Some(target.name()),
            cause: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Fill in source/target type names where they are not already set.
    ///
    /// The registry uses this to stamp a converter's own failure with the
    /// pair it was invoked for.
    pub fn with_types(mut self, source: TypeKey, target: TypeKey) -> Self {
        self.source_type.get_or_insert(source.name());
        self.target_type.get_or_insert(target.name());
        self
    }

    /// Wrap a failure from the second bridge hop so the error names the
    /// originally requested target and the original value's runtime type.
    pub fn bridged(source: TypeKey, target: TypeKey, inner: ConversionError) -> Self {
        Self {
            message: "canonical bridge failed".into(),
            source_type: Some(source.name()),
            target_type: Some(target.name()),
            cause: Some(Box::new(inner)),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.source_type, self.target_type) {
            (Some(s), Some(t)) => write!(f, "cannot convert {s} to {t}: {}", self.message)?,
            _ => f.write_str(&self.message)?,
        }
        if let Some(ref cause) = self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

impl From<std::num::ParseIntError> for ConversionError {
    fn from(e: std::num::ParseIntError) -> Self {
        ConversionError::new(e.to_string())
    }
}

impl From<std::num::ParseFloatError> for ConversionError {
    fn from(e: std::num::ParseFloatError) -> Self {
        ConversionError::new(e.to_string())
    }
}

impl From<std::str::Utf8Error> for ConversionError {
    fn from(e: std::str::Utf8Error) -> Self {
        ConversionError::new(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for ConversionError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        ConversionError::new(e.to_string())
    }
}
