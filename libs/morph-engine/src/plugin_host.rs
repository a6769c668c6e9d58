use std::path::Path;

use libloading::{Library, Symbol};

use morph_api::converter::Converter;
use morph_api::ffi::{
    AbiVersionFn, ConverterCreateResult, CreateConverterFn, DestroyConverterFn, MORPH_ABI_VERSION,
};

use crate::error::EngineError;

/// A loaded .so converter plugin with ABI version already verified.
pub struct PluginLib {
    _lib: Library,
    create_fn: CreateConverterFn,
    destroy_fn: DestroyConverterFn,
}

impl PluginLib {
    /// Load a plugin .so from `path`, verify ABI version, resolve symbols.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let lib = unsafe { Library::new(path) }.map_err(|e| {
            EngineError::Config(format!("failed to load plugin '{}': {e}", path.display()))
        })?;

        // Check ABI version.
        let abi_fn: Symbol<AbiVersionFn> =
            unsafe { lib.get(b"morph_abi_version") }.map_err(|e| {
                EngineError::Config(format!(
                    "plugin '{}' missing morph_abi_version symbol: {e}",
                    path.display()
                ))
            })?;

        let plugin_abi = unsafe { abi_fn() };
        if plugin_abi != MORPH_ABI_VERSION {
            return Err(EngineError::Config(format!(
                "plugin '{}' ABI version mismatch: plugin={plugin_abi}, host={MORPH_ABI_VERSION}",
                path.display()
            )));
        }

        let create_fn: CreateConverterFn =
            *unsafe { lib.get::<CreateConverterFn>(b"morph_create_converter") }.map_err(|e| {
                EngineError::Config(format!(
                    "plugin '{}' missing morph_create_converter symbol: {e}",
                    path.display()
                ))
            })?;

        let destroy_fn: DestroyConverterFn =
            *unsafe { lib.get::<DestroyConverterFn>(b"morph_destroy_converter") }.map_err(|e| {
                EngineError::Config(format!(
                    "plugin '{}' missing morph_destroy_converter symbol: {e}",
                    path.display()
                ))
            })?;

        Ok(Self {
            _lib: lib,
            create_fn,
            destroy_fn,
        })
    }

    /// Call the plugin's create function.
    pub fn create(&self) -> Result<*mut (), EngineError> {
        let result: ConverterCreateResult = unsafe { (self.create_fn)() };

        if result.converter_ptr.is_null() {
            let msg = if !result.error_ptr.is_null() && result.error_len > 0 {
                let error_msg = unsafe {
                    String::from_utf8_lossy(std::slice::from_raw_parts(
                        result.error_ptr,
                        result.error_len,
                    ))
                    .into_owned()
                };
                // Free the error string allocated by the plugin.
                unsafe {
                    let _ = Box::from_raw(core::ptr::slice_from_raw_parts_mut(
                        result.error_ptr,
                        result.error_len,
                    ));
                };
                error_msg
            } else {
                "unknown error".to_string()
            };
            return Err(EngineError::Config(format!("plugin create failed: {msg}")));
        }

        Ok(result.converter_ptr)
    }

    /// Get the destroy function pointer (for cleanup on drop).
    pub fn destroy_fn(&self) -> DestroyConverterFn {
        self.destroy_fn
    }
}

/// Load a `Converter` plugin from a .so file.
///
/// 1. Load .so, verify ABI version.
/// 2. Call `morph_create_converter()`.
pub fn load_converter(path: &Path) -> Result<Box<dyn Converter>, EngineError> {
    let lib = PluginLib::load(path)?;
    let ptr = lib.create()?;
    // Safety: the plugin returned a Box<Box<dyn Converter>>, we reconstruct it.
    let converter = unsafe { *Box::from_raw(ptr as *mut Box<dyn Converter>) };
    // Leak the library to keep the .so loaded.
    std::mem::forget(lib);
    Ok(converter)
}
