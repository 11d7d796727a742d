// foreign.rs -- Ownership guards for engine-heap memory
//
// Every block that crosses the boundary is held by exactly one guard and
// released exactly once, when the guard drops. That covers early returns and
// unwinding as well as the normal path.

use std::ffi::{c_void, CStr};
use std::mem;
use std::os::raw::c_char;
use std::ptr::{self, NonNull};

use crate::engine::Engine;
use crate::error::ResourceError;

/// Caller-allocated slot the engine writes its log address into.
pub struct ResultSlot<'e, E: Engine + ?Sized> {
    engine: &'e E,
    ptr: NonNull<*mut c_char>,
}

impl<'e, E: Engine + ?Sized> ResultSlot<'e, E> {
    pub const SIZE: usize = mem::size_of::<*mut c_char>();

    /// Allocate a slot on the engine heap, initialized to null.
    pub fn allocate(engine: &'e E) -> Result<Self, ResourceError> {
        let raw = engine.allocate(Self::SIZE) as *mut *mut c_char;
        let ptr = NonNull::new(raw).ok_or(ResourceError::AllocationFailed { size: Self::SIZE })?;
        // The engine heap makes no alignment promise to us.
        unsafe { ptr.as_ptr().write_unaligned(ptr::null_mut()) };
        tracing::trace!(slot = ?ptr, "allocated result slot");
        Ok(Self { engine, ptr })
    }

    /// Address to hand to the entry point.
    pub fn as_out_ptr(&mut self) -> *mut *mut c_char {
        self.ptr.as_ptr()
    }

    /// Take ownership of whatever string the engine stored, resetting the slot to null.
    ///
    /// # Safety
    /// A non-null value in the slot must be a NUL-terminated string allocated
    /// from this engine's heap and not owned by anything else.
    pub unsafe fn take(&mut self) -> Option<ForeignString<'e, E>> {
        let raw = self.ptr.as_ptr().read_unaligned();
        self.ptr.as_ptr().write_unaligned(ptr::null_mut());
        ForeignString::from_raw(self.engine, raw)
    }
}

impl<E: Engine + ?Sized> Drop for ResultSlot<'_, E> {
    fn drop(&mut self) {
        // A string nobody adopted (the entry point unwound, say) goes first.
        drop(unsafe { self.take() });
        tracing::trace!(slot = ?self.ptr, "releasing result slot");
        unsafe { self.engine.release(self.ptr.as_ptr() as *mut c_void) };
    }
}

/// A NUL-terminated string whose storage belongs to the engine heap.
///
/// Dropping it (directly or through [`ForeignString::into_string`]) is the only
/// way its storage is released.
pub struct ForeignString<'e, E: Engine + ?Sized> {
    engine: &'e E,
    ptr: NonNull<c_char>,
}

impl<'e, E: Engine + ?Sized> ForeignString<'e, E> {
    /// Adopt an engine-allocated string. Null yields `None`.
    ///
    /// # Safety
    /// `raw` must be null or a NUL-terminated string allocated from `engine`'s
    /// heap whose ownership is transferred to the returned value.
    pub unsafe fn from_raw(engine: &'e E, raw: *mut c_char) -> Option<Self> {
        NonNull::new(raw).map(|ptr| Self { engine, ptr })
    }

    pub fn as_c_str(&self) -> &CStr {
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
    }

    /// Copy into a host string (invalid UTF-8 replaced) and release the original.
    pub fn into_string(self) -> String {
        self.as_c_str().to_string_lossy().into_owned()
    }
}

impl<E: Engine + ?Sized> Drop for ForeignString<'_, E> {
    fn drop(&mut self) {
        tracing::trace!(string = ?self.ptr, "releasing engine string");
        unsafe { self.engine.release(self.ptr.as_ptr() as *mut c_void) };
    }
}
