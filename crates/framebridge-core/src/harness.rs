//! Test receivers for exercising the bridge without a managed runtime.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::errors::{BridgeError, MarshalingError};
use crate::frame::{AudioFrame, AudioFrameMetadata, VideoFrame, VideoFrameMetadata};
use crate::target::{CallbackTarget, FrameSink};

/// A frame as seen by a receiver, copied out of the decoder's buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceivedFrame {
    Video { data: Bytes, meta: VideoFrameMetadata },
    Audio { data: Bytes, meta: AudioFrameMetadata },
}

/// Records a copy of every frame it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    frames: Mutex<Vec<ReceivedFrame>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<ReceivedFrame> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, frame: ReceivedFrame) {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).push(frame);
    }
}

impl FrameSink for RecordingSink {
    fn on_video_frame(&self, frame: &VideoFrame<'_>) -> Result<(), BridgeError> {
        self.push(ReceivedFrame::Video {
            data: frame.buffer.copy_to_bytes(),
            meta: frame.meta,
        });
        Ok(())
    }

    fn on_audio_frame(&self, frame: &AudioFrame<'_>) -> Result<(), BridgeError> {
        self.push(ReceivedFrame::Audio {
            data: frame.buffer.copy_to_bytes(),
            meta: frame.meta,
        });
        Ok(())
    }
}

/// How a [`FaultySink`] misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Return a callback error
    Error,
    /// Panic inside the callback
    Panic,
}

/// Counts invocations and fails every one of them.
#[derive(Debug)]
pub struct FaultySink {
    failure: Failure,
    calls: AtomicUsize,
}

impl FaultySink {
    pub fn new(failure: Failure) -> Self {
        Self {
            failure,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self, what: &str) -> Result<(), BridgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Failure::Error => Err(BridgeError::callback(format!("{} callback rejected frame", what))),
            Failure::Panic => panic!("{} callback panicked", what),
        }
    }
}

impl FrameSink for FaultySink {
    fn on_video_frame(&self, _frame: &VideoFrame<'_>) -> Result<(), BridgeError> {
        self.fail("video")
    }

    fn on_audio_frame(&self, _frame: &AudioFrame<'_>) -> Result<(), BridgeError> {
        self.fail("audio")
    }
}

/// A target whose runtime cannot be reached, like a thread that failed to
/// attach. Resolving it fails without ever reaching the sink.
#[derive(Debug, Clone)]
pub struct UnreachableTarget {
    sink: Arc<RecordingSink>,
}

impl UnreachableTarget {
    pub fn new(sink: Arc<RecordingSink>) -> Self {
        Self { sink }
    }
}

impl CallbackTarget for &UnreachableTarget {
    type Receiver = Arc<RecordingSink>;

    fn resolve(self) -> Result<Option<Self::Receiver>, BridgeError> {
        Err(MarshalingError::Runtime(format!(
            "runtime unreachable ({} frames delivered)",
            self.sink.len()
        ))
        .into())
    }
}
