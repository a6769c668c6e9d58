use std::path::PathBuf;
use std::sync::Arc;

use morph_api::converter::Converter;

use crate::error::EngineError;
use crate::plugin_host;

/// Source of converters contributed without compile-time linkage.
///
/// Queried lazily by the registry, at most once per registry instance. One
/// result per candidate: a candidate that fails to construct must not take
/// the rest of the batch down with it.
pub trait ConverterProvider: Send + Sync {
    fn converters(&self) -> Vec<Result<Arc<dyn Converter>, EngineError>>;
}

/// Provider over a fixed, in-process converter list.
pub struct StaticProvider {
    converters: Vec<Arc<dyn Converter>>,
}

impl StaticProvider {
    pub fn new(converters: Vec<Arc<dyn Converter>>) -> Self {
        Self { converters }
    }
}

impl ConverterProvider for StaticProvider {
    fn converters(&self) -> Vec<Result<Arc<dyn Converter>, EngineError>> {
        self.converters.iter().cloned().map(Ok).collect()
    }
}

/// Provider that constructs converters from `.so` plugins.
pub struct PluginProvider {
    paths: Vec<PathBuf>,
}

impl PluginProvider {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl ConverterProvider for PluginProvider {
    fn converters(&self) -> Vec<Result<Arc<dyn Converter>, EngineError>> {
        self.paths
            .iter()
            .map(|path| {
                plugin_host::load_converter(path)
                    .map(Arc::from)
                    .map_err(|e| e.with_context(format!("plugin '{}'", path.display())))
            })
            .collect()
    }
}
