use serde::Deserialize;

use crate::error::EngineError;

/// Registry configuration — parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Whether to install the builtin converter set.
    #[serde(default = "default_builtins")]
    pub builtins: bool,

    /// Converter plugin definitions.
    #[serde(default)]
    pub converters: Vec<ConverterPluginConfig>,
}

fn default_builtins() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverterPluginConfig {
    pub name: String,
    /// Path to converter .so plugin.
    pub plugin: String,
}

impl RegistryConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }
}
