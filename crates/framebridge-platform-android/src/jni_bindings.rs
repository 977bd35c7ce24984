//! JNI and C entry points
//!
//! Java registers a receiver through `io.framebridge.FrameBridge` and hands
//! the returned handle to the decoder, which then calls
//! [`framebridge_forward_video`] and [`framebridge_forward_audio`] once per
//! ready frame. Those two never fail and never throw.

use framebridge_core::{AudioFrame, BridgeConfig, FrameKind, FramePayload, VideoFrame};
use jni::objects::{JClass, JObject, JString};
use jni::sys::{jboolean, jdouble, jint, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;

use crate::error::AndroidError;
use crate::ffi;
use crate::logging;
use crate::registration::Registration;

/// Install the native log subscriber
/// Returns true if this call installed it
#[no_mangle]
pub extern "system" fn Java_io_framebridge_FrameBridge_nativeInitLogging(
    mut env: JNIEnv,
    _class: JClass,
    filter: JString,
) -> jboolean {
    ffi::catch_panic(JNI_FALSE, move || {
        let result = || -> Result<bool, AndroidError> {
            let filter: String = if filter.is_null() {
                String::new()
            } else {
                env.get_string(&filter)?.into()
            };
            logging::init(&filter).map_err(|e| AndroidError::InvalidParameter(e.to_string()))
        }();

        match result {
            Ok(true) => JNI_TRUE,
            Ok(false) => JNI_FALSE,
            Err(e) => {
                let _ = env.throw_new("java/lang/IllegalArgumentException", e.to_string());
                JNI_FALSE
            }
        }
    })
}

/// Register a frame receiver
/// Returns a handle for the decoder entry points, or 0 on failure
#[no_mangle]
pub extern "system" fn Java_io_framebridge_FrameBridge_nativeRegister(
    mut env: JNIEnv,
    _class: JClass,
    receiver: JObject,
    config_json: JString,
) -> jlong {
    ffi::catch_panic(0, move || {
        let result = || -> Result<jlong, AndroidError> {
            let config = if config_json.is_null() {
                BridgeConfig::default()
            } else {
                let config_str: String = env.get_string(&config_json)?.into();
                BridgeConfig::from_json(&config_str)?
            };

            let registration = Registration::new(&mut env, &receiver, config)?;
            Ok(ffi::into_handle(registration))
        }();

        match result {
            Ok(handle) => handle,
            Err(e) => {
                let _ = env.throw_new("java/lang/RuntimeException", e.to_string());
                0
            }
        }
    })
}

/// Release a registration
/// The decoder must have stopped using the handle
#[no_mangle]
pub extern "system" fn Java_io_framebridge_FrameBridge_nativeUnregister(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    ffi::catch_panic((), move || unsafe { ffi::release_handle(handle) })
}

/// Delivery counters as JSON
/// Returns null for an unknown handle
#[no_mangle]
pub extern "system" fn Java_io_framebridge_FrameBridge_nativeStats(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    ffi::catch_panic(std::ptr::null_mut(), move || {
        let Some(registration) = (unsafe { ffi::registration(handle) }) else {
            return std::ptr::null_mut();
        };

        let result = || -> Result<jstring, AndroidError> {
            let json = serde_json::to_string(&registration.stats())
                .map_err(|e| AndroidError::InvalidParameter(e.to_string()))?;
            Ok(env.new_string(json)?.into_raw())
        }();

        match result {
            Ok(stats) => stats,
            Err(e) => {
                let _ = env.throw_new("java/lang/RuntimeException", e.to_string());
                std::ptr::null_mut()
            }
        }
    })
}

/// Forward one decoded video frame.
///
/// A zero handle is a no-op. Never fails and never leaves a Java exception
/// pending.
///
/// # Safety
/// - `handle` must be zero or a live handle from `nativeRegister`.
/// - `data` must be null or valid for `len` bytes for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn framebridge_forward_video(
    handle: jlong,
    data: *const u8,
    len: usize,
    pts: jdouble,
    format: jint,
    width: jint,
    height: jint,
) {
    let Some(registration) = (unsafe { ffi::registration(handle) }) else {
        return;
    };

    registration.forward_with(FrameKind::Video, || {
        let data = unsafe { ffi::parse_slice(data, len) }?;
        Ok(FramePayload::Video(VideoFrame::new(data, pts, format, width, height)))
    });
}

/// Forward one decoded audio frame.
///
/// # Safety
/// - `handle` must be zero or a live handle from `nativeRegister`.
/// - `data` must be null or valid for `len` bytes for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn framebridge_forward_audio(
    handle: jlong,
    data: *const u8,
    len: usize,
    pts: jdouble,
) {
    let Some(registration) = (unsafe { ffi::registration(handle) }) else {
        return;
    };

    registration.forward_with(FrameKind::Audio, || {
        let data = unsafe { ffi::parse_slice(data, len) }?;
        Ok(FramePayload::Audio(AudioFrame::new(data, pts)))
    });
}
