/// Current ABI version. Host checks this against a plugin's
/// `morph_abi_version()`.
pub const MORPH_ABI_VERSION: u32 = 1;

/// FFI return struct from `morph_create_converter`.
#[repr(C)]
pub struct ConverterCreateResult {
    /// Pointer to the created converter (Box<Box<dyn Converter>>).
    /// Null if creation failed.
    pub converter_ptr: *mut (),
    /// Pointer to a heap-allocated error string.
    /// Null if creation succeeded.
    pub error_ptr: *mut u8,
    /// Length of the error string.
    pub error_len: usize,
}

/// Type signature for the `morph_abi_version` symbol.
pub type AbiVersionFn = unsafe extern "C" fn() -> u32;

/// Type signature for the `morph_create_converter` symbol.
pub type CreateConverterFn = unsafe extern "C" fn() -> ConverterCreateResult;

/// Type signature for the `morph_destroy_converter` symbol.
pub type DestroyConverterFn = unsafe extern "C" fn(*mut ());

/// Helper: create a successful `ConverterCreateResult` from a trait object.
pub fn converter_ok(converter: Box<Box<dyn crate::converter::Converter>>) -> ConverterCreateResult {
    ConverterCreateResult {
        converter_ptr: Box::into_raw(converter) as *mut (),
        error_ptr: std::ptr::null_mut(),
        error_len: 0,
    }
}

/// Helper: create a failed `ConverterCreateResult` from an error message.
pub fn converter_err(msg: &str) -> ConverterCreateResult {
    let bytes = msg.as_bytes().to_vec();
    let len = bytes.len();
    let ptr = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
    ConverterCreateResult {
        converter_ptr: std::ptr::null_mut(),
        error_ptr: ptr,
        error_len: len,
    }
}

/// Macro: export the `morph_abi_version` function.
#[macro_export]
macro_rules! morph_abi_version_fn {
    () => {
        #[unsafe(no_mangle)]
        pub extern "C" fn morph_abi_version() -> u32 {
            $crate::ffi::MORPH_ABI_VERSION
        }
    };
}

/// Macro: export the `morph_create_converter` function from a constructor
/// expression evaluating to `Box<dyn Converter>`.
#[macro_export]
macro_rules! morph_create_converter_fn {
    ($ctor:expr) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn morph_create_converter() -> $crate::ffi::ConverterCreateResult {
            let converter: Box<dyn $crate::converter::Converter> = $ctor;
            $crate::ffi::converter_ok(Box::new(converter))
        }
    };
}

/// Macro: export the `morph_destroy_converter` function.
#[macro_export]
macro_rules! morph_destroy_converter_fn {
    () => {
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn morph_destroy_converter(ptr: *mut ()) {
            if !ptr.is_null() {
                let _ = unsafe {
                    Box::from_raw(ptr as *mut Box<dyn $crate::converter::Converter>)
                };
            }
        }
    };
}
