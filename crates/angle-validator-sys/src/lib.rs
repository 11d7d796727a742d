//! Low-level ABI declarations for the ANGLE shader validator.
//!
//! The validator is a natively compiled artifact produced by a separate build
//! pipeline. It exports a single entry point, `ValidateShader`, plus the
//! allocator pair the caller uses to release what the entry point hands back.
//! This crate only declares the shapes of those symbols and the constants that
//! make up the wire contract. Loading and calling them lives in
//! `angle-validator`.

use std::ffi::c_void;
use std::os::raw::{c_char, c_int};

// ============================================================================
// Types
// ============================================================================

pub type GLenum = u32;

/// `ValidateShader(source, shader_type, input_spec, output_spec, compile_options, out_log)`
///
/// - `source` is a NUL-terminated string owned by the caller.
/// - `input_spec` points at [`INPUT_SPEC_LEN`] ints, `output_spec` at
///   [`OUTPUT_SPEC_LEN`] ints and `compile_options` at [`COMPILE_OPTIONS_LEN`] ints.
/// - `out_log` points at a caller-allocated slot. The engine stores the address
///   of a log string it allocated with its own allocator there. Ownership of
///   that string passes to the caller, who must release it with [`FreeFn`].
///
/// The return value is one of the `EFAIL_*` codes.
pub type ValidateShaderFn = unsafe extern "C" fn(
    source: *const c_char,
    shader_type: c_int,
    input_spec: *const c_int,
    output_spec: *const c_int,
    compile_options: *const c_int,
    out_log: *mut *mut c_char,
) -> c_int;

/// The engine heap allocator (`malloc`).
pub type MallocFn = unsafe extern "C" fn(size: usize) -> *mut c_void;

/// The engine heap release function (`free`).
pub type FreeFn = unsafe extern "C" fn(ptr: *mut c_void);

// ============================================================================
// Protocol
// ============================================================================

/// Version of the buffer layouts below. Bump on any reorder or resize.
pub const PROTOCOL_VERSION: u32 = 1;

pub const INPUT_SPEC_LEN: usize = 2;
pub const OUTPUT_SPEC_LEN: usize = 2;
pub const COMPILE_OPTIONS_LEN: usize = 13;

/// Boolean option fields come first in the options buffer, counts after.
pub const COMPILE_OPTIONS_FLAG_COUNT: usize = 11;

// Input spec tags (slot 0)
pub const SH_INPUT_GLES: c_int = 0;
pub const SH_INPUT_WEBGL: c_int = 1;

// Output spec tags (slot 0)
pub const SH_OUTPUT_GLES: c_int = 0;
pub const SH_OUTPUT_GLSL: c_int = 1;
pub const SH_OUTPUT_HLSL: c_int = 2;

// ============================================================================
// Shader types (from gl.h)
// ============================================================================

pub const GL_FRAGMENT_SHADER: GLenum = 0x8B30;
pub const GL_VERTEX_SHADER: GLenum = 0x8B31;
pub const GL_COMPUTE_SHADER: GLenum = 0x91B9;
pub const GL_GEOMETRY_SHADER_EXT: GLenum = 0x8DD9;

// ============================================================================
// Return codes
// ============================================================================

pub const ESUCCESS: c_int = 0;
pub const EFAIL_USAGE: c_int = 1;
pub const EFAIL_COMPILE: c_int = 2;
pub const EFAIL_COMPILER_CREATE: c_int = 3;

// ============================================================================
// Exported symbol names
// ============================================================================

pub const VALIDATE_SHADER_SYMBOL: &str = "ValidateShader";
pub const MALLOC_SYMBOL: &str = "malloc";
pub const FREE_SYMBOL: &str = "free";

/// Base name of the engine artifact; the platform prefix/suffix is added at load time.
pub const ENGINE_LIBRARY_NAME: &str = "angle_validator";
