// library.rs -- Dynamically loaded validator engine
//
// Opens the compiled engine artifact, resolves its entry point and allocator
// pair, and keeps the library mapped for as long as the function pointers are
// in use.

use std::cell::Cell;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};

use angle_validator_sys as sys;
use libloading::{Library, Symbol};

use crate::config::{EngineConfig, EngineSymbols};
use crate::engine::Engine;
use crate::error::LoadError;

// ============================================================
// NativeEngine
// ============================================================

/// The entry point and heap of a natively compiled engine.
///
/// `Send` but not `Sync`: the entry point is not reentrant, so sharing an
/// engine between threads goes through [`crate::Validator`].
pub struct NativeEngine {
    validate_fn: sys::ValidateShaderFn,
    malloc_fn: sys::MallocFn,
    free_fn: sys::FreeFn,
    path: Option<PathBuf>,
    /// Must outlive the function pointers above.
    _library: Option<Library>,
    _not_sync: PhantomData<Cell<()>>,
}

impl NativeEngine {
    /// Locate and open the artifact described by `config`.
    pub fn load(config: &EngineConfig) -> Result<Self, LoadError> {
        let path = config.locate()?;
        Self::open(&path, &config.symbols)
    }

    /// Open the artifact at `path` and resolve `symbols` from it.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The library cannot be loaded
    /// - Any of the three symbols is missing
    pub fn open(path: &Path, symbols: &EngineSymbols) -> Result<Self, LoadError> {
        // Loading runs the library's initializers; the artifact is trusted to
        // be a validator build.
        let library = unsafe { Library::new(path) }.map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let (validate_fn, malloc_fn, free_fn) = unsafe {
            (
                lookup::<sys::ValidateShaderFn>(&library, path, &symbols.validate)?,
                lookup::<sys::MallocFn>(&library, path, &symbols.allocate)?,
                lookup::<sys::FreeFn>(&library, path, &symbols.release)?,
            )
        };

        tracing::info!(
            path = %path.display(),
            entry = %symbols.validate,
            protocol = sys::PROTOCOL_VERSION,
            "loaded validator library"
        );

        Ok(Self {
            validate_fn,
            malloc_fn,
            free_fn,
            path: Some(path.to_path_buf()),
            _library: Some(library),
            _not_sync: PhantomData,
        })
    }

    /// Wrap functions that are already linked into the process.
    ///
    /// # Safety
    /// The three functions must follow the entry-point contract, and
    /// `free_fn` must release what `malloc_fn` and `validate_fn` allocate.
    pub unsafe fn from_raw_parts(
        validate_fn: sys::ValidateShaderFn,
        malloc_fn: sys::MallocFn,
        free_fn: sys::FreeFn,
    ) -> Self {
        Self {
            validate_fn,
            malloc_fn,
            free_fn,
            path: None,
            _library: None,
            _not_sync: PhantomData,
        }
    }

    /// Artifact the engine was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

unsafe fn lookup<T: Copy>(library: &Library, path: &Path, name: &str) -> Result<T, LoadError> {
    let symbol: Symbol<T> = library
        .get(name.as_bytes())
        .map_err(|source| LoadError::MissingSymbol {
            path: path.to_path_buf(),
            symbol: name.to_string(),
            source,
        })?;
    Ok(*symbol)
}

impl Engine for NativeEngine {
    fn allocate(&self, size: usize) -> *mut c_void {
        unsafe { (self.malloc_fn)(size) }
    }

    unsafe fn release(&self, ptr: *mut c_void) {
        if !ptr.is_null() {
            (self.free_fn)(ptr);
        }
    }

    unsafe fn validate(
        &self,
        source: *const c_char,
        shader_type: c_int,
        input: *const c_int,
        output: *const c_int,
        options: *const c_int,
        out_log: *mut *mut c_char,
    ) -> c_int {
        (self.validate_fn)(source, shader_type, input, output, options, out_log)
    }
}

impl Drop for NativeEngine {
    fn drop(&mut self) {
        if let Some(path) = &self.path {
            tracing::debug!(path = %path.display(), "unloading validator library");
        }
    }
}

// ============================================================
// Tests
// ============================================================
