//! Callback targets and the receivers they resolve to.
//!
//! A [`CallbackTarget`] is a non-owning handle to whatever consumes frames.
//! Resolving it yields a [`FrameReceiver`] for the duration of one call, or
//! `None` when the consumer has been released. A released consumer is an
//! expected outcome, not an error.

use std::sync::{Arc, Weak};

use crate::errors::BridgeError;
use crate::frame::{AudioFrame, VideoFrame};

/// The live side of a callback target, valid for one forwarding call.
pub trait FrameReceiver {
    fn deliver_video(&mut self, frame: &VideoFrame<'_>) -> Result<(), BridgeError>;

    fn deliver_audio(&mut self, frame: &AudioFrame<'_>) -> Result<(), BridgeError>;
}

/// A weak handle that may or may not still point at a receiver.
pub trait CallbackTarget {
    type Receiver: FrameReceiver;

    /// Resolve the handle.
    ///
    /// `Ok(None)` means the receiver is gone. `Err` is reserved for failures
    /// reaching the runtime that hosts the receiver; it is contained like any
    /// other marshaling failure.
    fn resolve(self) -> Result<Option<Self::Receiver>, BridgeError>;
}

/// In-process frame consumer.
///
/// Implementations may be invoked concurrently from the video and audio
/// decoder threads.
pub trait FrameSink: Send + Sync {
    fn on_video_frame(&self, frame: &VideoFrame<'_>) -> Result<(), BridgeError>;

    fn on_audio_frame(&self, frame: &AudioFrame<'_>) -> Result<(), BridgeError>;
}

impl<S: FrameSink + ?Sized> FrameReceiver for Arc<S> {
    fn deliver_video(&mut self, frame: &VideoFrame<'_>) -> Result<(), BridgeError> {
        self.on_video_frame(frame)
    }

    fn deliver_audio(&mut self, frame: &AudioFrame<'_>) -> Result<(), BridgeError> {
        self.on_audio_frame(frame)
    }
}

/// Non-owning reference to an in-process [`FrameSink`].
pub struct WeakTarget<S: ?Sized> {
    sink: Weak<S>,
}

impl<S: ?Sized> WeakTarget<S> {
    pub fn new(sink: &Arc<S>) -> Self {
        Self {
            sink: Arc::downgrade(sink),
        }
    }

    /// Whether the sink has been dropped.
    pub fn is_released(&self) -> bool {
        self.sink.strong_count() == 0
    }
}

impl<S: ?Sized> Clone for WeakTarget<S> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for WeakTarget<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakTarget")
            .field("released", &self.is_released())
            .finish()
    }
}

impl<'t, S: FrameSink + ?Sized> CallbackTarget for &'t WeakTarget<S> {
    type Receiver = Arc<S>;

    fn resolve(self) -> Result<Option<Arc<S>>, BridgeError> {
        Ok(self.sink.upgrade())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nop;

    impl FrameSink for Nop {
        fn on_video_frame(&self, _frame: &VideoFrame<'_>) -> Result<(), BridgeError> {
            Ok(())
        }

        fn on_audio_frame(&self, _frame: &AudioFrame<'_>) -> Result<(), BridgeError> {
            Ok(())
        }
    }

    #[test]
    fn test_weak_target_resolves_while_alive() {
        let sink = Arc::new(Nop);
        let target = WeakTarget::new(&sink);
        assert!(!target.is_released());
        assert!(matches!((&target).resolve(), Ok(Some(_))));
    }

    #[test]
    fn test_weak_target_resolves_to_none_after_drop() {
        let sink = Arc::new(Nop);
        let target = WeakTarget::new(&sink);
        drop(sink);
        assert!(target.is_released());
        assert!(matches!((&target).resolve(), Ok(None)));
    }

    #[test]
    fn test_weak_target_does_not_keep_sink_alive() {
        let sink = Arc::new(Nop);
        let target = WeakTarget::new(&sink);
        let _clone = target.clone();
        assert_eq!(Arc::strong_count(&sink), 1);
    }
}
