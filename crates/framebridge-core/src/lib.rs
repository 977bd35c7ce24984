//! Frame Bridge Core - fault-isolated delivery of decoded media frames.
//!
//! This crate implements:
//! - The frame model handed over by a native decoder (borrowed buffers,
//!   video and audio metadata, pixel format tags)
//! - Weak callback targets that resolve to "absent" once released
//! - The video and audio forwarders and the single fault-isolation point
//!   they share
//! - Delivery diagnostics and configuration
//!
//! Platform bindings (JNI) live in `framebridge-platform-android`.

#![forbid(unsafe_code)]

pub mod bridge;
pub mod target;

pub mod format;
pub mod frame;

pub mod config;
pub mod diagnostics;
pub mod errors;

pub mod harness;

pub use bridge::{Delivery, FrameBridge, Handoff};
pub use config::{BridgeConfig, BufferMode};
pub use diagnostics::{BridgeStats, FaultRecord, FaultRecorder};
pub use errors::{BridgeError, ConfigError, FaultKind, MarshalingError};
pub use format::{PixelFormat, PixelFormatTag};
pub use frame::{
    AudioFrame, AudioFrameMetadata, FrameBuffer, FrameKind, FramePayload, VideoFrame,
    VideoFrameMetadata,
};
pub use target::{CallbackTarget, FrameReceiver, FrameSink, WeakTarget};
