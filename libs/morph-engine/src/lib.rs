pub mod bootstrap;
pub mod builtin;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod plugin_host;
pub mod provider;
pub mod registry;

pub use config::RegistryConfig;
pub use dispatch::Dispatcher;
pub use error::EngineError;
pub use provider::{ConverterProvider, PluginProvider, StaticProvider};
pub use registry::ConverterRegistry;
