//! Error types for the frame bridge.
//!
//! Nothing in this module ever reaches the decoder: every `BridgeError` is
//! caught by [`FrameBridge::isolate`](crate::bridge::FrameBridge::isolate),
//! classified into a [`FaultKind`] and recorded.

use serde::Serialize;
use thiserror::Error;

/// Failures while turning a native frame into something the managed side
/// can receive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarshalingError {
    /// Width or height below zero
    #[error("invalid frame dimensions {width}x{height}")]
    NegativeDimensions { width: i32, height: i32 },

    /// Buffer is shorter than the recognized pixel format requires
    #[error("buffer too small for {format}: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall {
        format: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Null data pointer with a non-zero length
    #[error("invalid buffer pointer")]
    InvalidPointer,

    /// Managed-side buffer wrapper could not be allocated
    #[error("buffer wrapper allocation failed: {0}")]
    Allocation(String),

    /// Managed runtime was not reachable from the calling thread
    #[error("managed runtime unavailable: {0}")]
    Runtime(String),
}

/// Errors raised while delivering one frame.
#[derive(Debug, Error, Clone)]
pub enum BridgeError {
    #[error("marshaling failed: {0}")]
    Marshaling(#[from] MarshalingError),

    /// The receiver itself raised (exception, missing method, `Err`).
    #[error("callback failed: {0}")]
    Callback(String),

    #[error("panic: {0}")]
    Panic(String),
}

impl BridgeError {
    pub fn callback(msg: impl Into<String>) -> Self {
        BridgeError::Callback(msg.into())
    }

    pub fn kind(&self) -> FaultKind {
        match self {
            BridgeError::Marshaling(_) => FaultKind::Marshaling,
            BridgeError::Callback(_) => FaultKind::Callback,
            BridgeError::Panic(_) => FaultKind::Panic,
        }
    }
}

/// Classification of a contained fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    Marshaling,
    Callback,
    Panic,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultKind::Marshaling => write!(f, "marshaling"),
            FaultKind::Callback => write!(f, "callback"),
            FaultKind::Panic => write!(f, "panic"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
