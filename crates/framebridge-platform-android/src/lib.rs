//! Frame Bridge Platform Android - JNI binding for the frame bridge
//!
//! This crate delivers decoded frames from native decoder threads to a Java
//! receiver. Every delivery is fault-isolated: Java exceptions, JNI failures
//! and Rust panics are contained and recorded, never surfaced to the decoder.

mod error;
mod ffi;
mod jni_bindings;
mod logging;
mod receiver;
mod registration;

// Re-export main types
pub use error::AndroidError;
pub use logging::init as init_logging;
pub use receiver::{JavaReceiver, JavaTarget, AUDIO_CALLBACK, AUDIO_SIGNATURE, VIDEO_CALLBACK, VIDEO_SIGNATURE};
pub use registration::{forward_audio_frame, forward_video_frame, Registration};

// Natives for io.framebridge.FrameBridge
pub use jni_bindings::{
    Java_io_framebridge_FrameBridge_nativeInitLogging, Java_io_framebridge_FrameBridge_nativeRegister,
    Java_io_framebridge_FrameBridge_nativeStats, Java_io_framebridge_FrameBridge_nativeUnregister,
};

// C entry points for the decoder
pub use jni_bindings::{framebridge_forward_audio, framebridge_forward_video};
