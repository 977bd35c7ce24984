//! Decoder-facing entry points that can be exercised without a JVM.

use framebridge_android::{framebridge_forward_audio, framebridge_forward_video};

/// Test: an unregistered (zero) handle is a silent no-op
#[test]
fn zero_handle_is_noop() {
    let data = [0u8; 6];
    unsafe {
        framebridge_forward_video(0, data.as_ptr(), data.len(), 12.34, 0, 2, 2);
        framebridge_forward_audio(0, data.as_ptr(), data.len(), 5.0);
    }
}

/// Test: null data with a zero handle does not dereference anything
#[test]
fn zero_handle_with_null_data() {
    unsafe {
        framebridge_forward_video(0, std::ptr::null(), 1024, 0.0, 0, 16, 16);
        framebridge_forward_audio(0, std::ptr::null(), 1024, 0.0);
    }
}
