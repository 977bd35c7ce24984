//! Helpers for raw pointers and handles crossing the C boundary.

use std::panic::{self, AssertUnwindSafe};

use framebridge_core::MarshalingError;
use jni::sys::jlong;
use tracing::error;

use crate::registration::Registration;

/// Run `f`, returning `fallback` if it panics.
///
/// Used by the registration natives, which run on Java threads.
pub fn catch_panic<T, F: FnOnce() -> T>(fallback: T, f: F) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error!("Panic in native call");
            fallback
        }
    }
}

/// # Safety
///
/// The caller must ensure that data is valid for `size` bytes for 'a.
pub unsafe fn parse_slice<'a>(data: *const u8, size: usize) -> Result<&'a [u8], MarshalingError> {
    if data.is_null() {
        if size == 0 {
            return Ok(&[]);
        }

        return Err(MarshalingError::InvalidPointer);
    }

    let data = unsafe { std::slice::from_raw_parts(data, size) };
    Ok(data)
}

pub fn into_handle(registration: Registration) -> jlong {
    Box::into_raw(Box::new(registration)) as jlong
}

/// # Safety
///
/// `handle` must be zero or a value returned by [`into_handle`] that has not
/// been released yet.
pub unsafe fn registration<'a>(handle: jlong) -> Option<&'a Registration> {
    unsafe { (handle as *const Registration).as_ref() }
}

/// # Safety
///
/// `handle` must be zero or a value returned by [`into_handle`], and no
/// other thread may still be using it.
pub unsafe fn release_handle(handle: jlong) {
    if handle != 0 {
        unsafe {
            drop(Box::from_raw(handle as *mut Registration));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slice() {
        let data = [1u8, 2, 3];
        let parsed = unsafe { parse_slice(data.as_ptr(), data.len()) }.unwrap();
        assert_eq!(parsed, &[1, 2, 3]);
    }

    #[test]
    fn test_parse_slice_null() {
        let empty = unsafe { parse_slice(std::ptr::null(), 0) }.unwrap();
        assert!(empty.is_empty());

        let err = unsafe { parse_slice(std::ptr::null(), 16) }.unwrap_err();
        assert_eq!(err, MarshalingError::InvalidPointer);
    }

    #[test]
    fn test_null_handle() {
        assert!(unsafe { registration(0) }.is_none());
        unsafe { release_handle(0) };
    }

    #[test]
    fn test_catch_panic() {
        assert_eq!(catch_panic(-1, || 7), 7);
        assert_eq!(catch_panic(-1, || -> i32 { panic!("boom") }), -1);
    }
}
