use std::path::{Path, PathBuf};

use crate::builtin;
use crate::config::RegistryConfig;
use crate::error::EngineError;
use crate::provider::{ConverterProvider, PluginProvider, StaticProvider};
use crate::registry::ConverterRegistry;

/// Build a registry from a parsed configuration.
///
/// The builtin converter set (unless disabled) and the configured converter
/// plugins are both attached as providers, so everything registers lazily on
/// the registry's first use — builtins first, plugins after, meaning a
/// plugin can override a builtin pair (last-write-wins).
pub fn bootstrap(config: RegistryConfig) -> Result<ConverterRegistry, EngineError> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for conv_cfg in &config.converters {
        let conv_ctx = format!("converter '{}'", conv_cfg.name);

        let path = Path::new(&conv_cfg.plugin);
        if path.extension().is_none_or(|ext| ext != "so") {
            return Err(EngineError::Config(format!(
                "'{}': expected path to .so plugin",
                conv_cfg.plugin
            ))
            .with_context(&conv_ctx));
        }

        tracing::info!(converter = %conv_cfg.name, plugin = %conv_cfg.plugin, "configured converter plugin");
        paths.push(path.to_path_buf());
    }

    let mut providers: Vec<Box<dyn ConverterProvider>> = Vec::new();
    if config.builtins {
        providers.push(Box::new(StaticProvider::new(builtin::converters())));
    }
    if !paths.is_empty() {
        providers.push(Box::new(PluginProvider::new(paths)));
    }

    let registry = ConverterRegistry::with_providers(providers);

    tracing::info!(
        plugins = config.converters.len(),
        builtins = config.builtins,
        "converter registry ready"
    );
    Ok(registry)
}

/// Build a registry from a TOML config file path.
pub fn bootstrap_from_file(path: &str) -> Result<ConverterRegistry, EngineError> {
    let config = RegistryConfig::load(path)?;
    bootstrap(config)
}
