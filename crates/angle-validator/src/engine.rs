// engine.rs -- The seam between the invoker and a validator engine
//
// An engine is the entry point plus the heap it allocates from. The invoker
// only talks to engines through this trait, so the dynamically loaded
// library and in-process test engines are interchangeable.

use std::ffi::c_void;
use std::os::raw::{c_char, c_int};

pub trait Engine {
    /// Allocate `size` bytes from the engine heap. Returns null on failure.
    fn allocate(&self, size: usize) -> *mut c_void;

    /// Return a block to the engine heap.
    ///
    /// # Safety
    /// `ptr` must be null or a block from this engine's heap that has not been
    /// released yet.
    unsafe fn release(&self, ptr: *mut c_void);

    /// Call the validator entry point.
    ///
    /// # Safety
    /// `source` must be NUL-terminated; `input`, `output` and `options` must
    /// point at buffers of the protocol lengths; `out_log` must point at a
    /// writable pointer-sized slot.
    unsafe fn validate(
        &self,
        source: *const c_char,
        shader_type: c_int,
        input: *const c_int,
        output: *const c_int,
        options: *const c_int,
        out_log: *mut *mut c_char,
    ) -> c_int;
}
