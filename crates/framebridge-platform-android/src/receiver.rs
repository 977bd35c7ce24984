//! Java-side callback targets.
//!
//! A [`JavaTarget`] wraps a JNI weak global reference to the Java receiver.
//! Resolving it creates a local reference, which is released again when the
//! [`JavaReceiver`] is dropped. Each delivery runs in its own JNI local
//! frame so nothing accumulates on long-lived decoder threads.
//!
//! The Java receiver implements:
//!
//! ```java
//! void onVideoFrame(java.nio.ByteBuffer buffer, double pts, int format, int width, int height);
//! void onAudioFrame(java.nio.ByteBuffer buffer, double pts);
//! ```
//!
//! The buffer is only valid during the callback. A receiver that needs the
//! data later must copy it.

use framebridge_core::{
    AudioFrame, BridgeError, BufferMode, CallbackTarget, FrameBuffer, FrameReceiver,
    MarshalingError, VideoFrame,
};
use jni::objects::{JObject, JString, JValue, WeakRef};
use jni::JNIEnv;
use tracing::trace;

use crate::error::AndroidError;

pub const VIDEO_CALLBACK: &str = "onVideoFrame";
pub const VIDEO_SIGNATURE: &str = "(Ljava/nio/ByteBuffer;DIII)V";
pub const AUDIO_CALLBACK: &str = "onAudioFrame";
pub const AUDIO_SIGNATURE: &str = "(Ljava/nio/ByteBuffer;D)V";

// buffer, its read-only view, and whatever the call itself needs
const LOCAL_FRAME_CAPACITY: i32 = 8;

/// Weak reference to a Java receiver, bound to the calling thread's env.
pub struct JavaTarget<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    receiver: &'a WeakRef,
    buffer_mode: BufferMode,
}

impl<'a, 'local> JavaTarget<'a, 'local> {
    pub fn new(env: &'a mut JNIEnv<'local>, receiver: &'a WeakRef, buffer_mode: BufferMode) -> Self {
        Self {
            env,
            receiver,
            buffer_mode,
        }
    }
}

impl<'a, 'local> CallbackTarget for JavaTarget<'a, 'local> {
    type Receiver = JavaReceiver<'a, 'local>;

    fn resolve(self) -> Result<Option<Self::Receiver>, BridgeError> {
        let obj = self.receiver.upgrade_local(self.env).map_err(|e| {
            MarshalingError::Runtime(format!("failed to resolve receiver: {}", e))
        })?;

        Ok(obj.map(|obj| JavaReceiver {
            env: self.env,
            obj,
            buffer_mode: self.buffer_mode,
        }))
    }
}

/// A live Java receiver for the duration of one call.
pub struct JavaReceiver<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    obj: JObject<'local>,
    buffer_mode: BufferMode,
}

impl FrameReceiver for JavaReceiver<'_, '_> {
    fn deliver_video(&mut self, frame: &VideoFrame<'_>) -> Result<(), BridgeError> {
        let receiver = &self.obj;
        let mode = self.buffer_mode;
        let meta = frame.meta;

        self.env
            .with_local_frame(LOCAL_FRAME_CAPACITY, |env| -> Result<(), AndroidError> {
                let buffer = wrap_buffer(env, frame.buffer, mode)?;
                let args = [
                    JValue::Object(&buffer),
                    JValue::Double(meta.pts),
                    JValue::Int(meta.format.raw()),
                    JValue::Int(meta.width),
                    JValue::Int(meta.height),
                ];
                invoke(env, receiver, VIDEO_CALLBACK, VIDEO_SIGNATURE, &args)
            })
            .map_err(BridgeError::from)
    }

    fn deliver_audio(&mut self, frame: &AudioFrame<'_>) -> Result<(), BridgeError> {
        let receiver = &self.obj;
        let mode = self.buffer_mode;
        let pts = frame.meta.pts;

        self.env
            .with_local_frame(LOCAL_FRAME_CAPACITY, |env| -> Result<(), AndroidError> {
                let buffer = wrap_buffer(env, frame.buffer, mode)?;
                let args = [JValue::Object(&buffer), JValue::Double(pts)];
                invoke(env, receiver, AUDIO_CALLBACK, AUDIO_SIGNATURE, &args)
            })
            .map_err(BridgeError::from)
    }
}

impl Drop for JavaReceiver<'_, '_> {
    fn drop(&mut self) {
        let obj = std::mem::replace(&mut self.obj, JObject::null());
        let _ = self.env.delete_local_ref(obj);
    }
}

fn invoke(
    env: &mut JNIEnv,
    receiver: &JObject,
    name: &str,
    signature: &str,
    args: &[JValue],
) -> Result<(), AndroidError> {
    match env.call_method(receiver, name, signature, args) {
        Ok(_) => Ok(()),
        Err(e) => {
            let message = take_exception(env).unwrap_or_else(|| e.to_string());
            Err(BridgeError::callback(format!("{}: {}", name, message)).into())
        }
    }
}

/// Expose the decoder's buffer to Java according to `mode`.
fn wrap_buffer<'local>(
    env: &mut JNIEnv<'local>,
    buffer: FrameBuffer<'_>,
    mode: BufferMode,
) -> Result<JObject<'local>, AndroidError> {
    match mode {
        BufferMode::Direct => direct_buffer(env, buffer),
        BufferMode::Copy => copied_buffer(env, buffer),
        BufferMode::Auto => match direct_buffer(env, buffer) {
            Ok(wrapped) => Ok(wrapped),
            Err(e) => {
                trace!(error = %e, "Direct buffer unavailable, copying frame");
                copied_buffer(env, buffer)
            }
        },
    }
}

/// Zero-copy, read-only `ByteBuffer` over the decoder's memory.
fn direct_buffer<'local>(
    env: &mut JNIEnv<'local>,
    buffer: FrameBuffer<'_>,
) -> Result<JObject<'local>, AndroidError> {
    // SAFETY: the buffer outlives the local frame this view is created in,
    // and Java only ever sees the read-only duplicate below.
    let direct = unsafe { env.new_direct_byte_buffer(buffer.as_ptr() as *mut u8, buffer.len()) }
        .map_err(|e| marshaling_failure(env, "NewDirectByteBuffer", e))?;

    env.call_method(&direct, "asReadOnlyBuffer", "()Ljava/nio/ByteBuffer;", &[])
        .and_then(|value| value.l())
        .map_err(|e| marshaling_failure(env, "asReadOnlyBuffer", e))
}

/// Java-heap copy of the buffer wrapped in a `ByteBuffer`.
fn copied_buffer<'local>(
    env: &mut JNIEnv<'local>,
    buffer: FrameBuffer<'_>,
) -> Result<JObject<'local>, AndroidError> {
    let array = env
        .byte_array_from_slice(buffer.as_slice())
        .map_err(|e| marshaling_failure(env, "NewByteArray", e))?;

    env.call_static_method(
        "java/nio/ByteBuffer",
        "wrap",
        "([B)Ljava/nio/ByteBuffer;",
        &[(&array).into()],
    )
    .and_then(|value| value.l())
    .map_err(|e| marshaling_failure(env, "ByteBuffer.wrap", e))
}

fn marshaling_failure(env: &mut JNIEnv, what: &str, e: jni::errors::Error) -> AndroidError {
    let message = take_exception(env).unwrap_or_else(|| e.to_string());
    MarshalingError::Allocation(format!("{}: {}", what, message)).into()
}

/// Clear a pending Java exception and describe it, if there is one.
pub fn take_exception(env: &mut JNIEnv) -> Option<String> {
    if !env.exception_check().unwrap_or(false) {
        return None;
    }

    let throwable = env.exception_occurred().ok();
    let _ = env.exception_clear();

    let description = throwable.and_then(|throwable| {
        let description = describe_throwable(env, &throwable);
        let _ = env.delete_local_ref(throwable);
        description
    });

    Some(description.unwrap_or_else(|| "unknown Java exception".to_string()))
}

fn describe_throwable(env: &mut JNIEnv, throwable: &JObject) -> Option<String> {
    let result = env
        .call_method(throwable, "toString", "()Ljava/lang/String;", &[])
        .and_then(|value| value.l());

    match result {
        Ok(obj) => {
            let text = JString::from(obj);
            let description = env.get_string(&text).ok().map(String::from);
            let _ = env.delete_local_ref(text);
            description
        }
        Err(_) => {
            // toString itself threw
            let _ = env.exception_clear();
            None
        }
    }
}
