//! The frame delivery bridge.
//!
//! Every forwarding call runs inside [`FrameBridge::isolate`], the single
//! point where failures are caught. Whatever happens past that point (a
//! dead target, a marshaling error, a failing or panicking receiver) the
//! caller gets a [`Delivery`] back and never an error or an unwind.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::trace;

use crate::config::BridgeConfig;
use crate::diagnostics::{BridgeStats, FaultRecorder};
use crate::errors::{BridgeError, FaultKind};
use crate::frame::{AudioFrame, FrameKind, FramePayload, VideoFrame};
use crate::target::{CallbackTarget, FrameReceiver};

/// Outcome of one forwarding call. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The receiver was invoked and returned normally
    Delivered,
    /// The target had been released; nothing was invoked
    TargetGone,
    /// A fault was contained and the frame dropped
    Dropped(FaultKind),
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

/// How a frame left [`FrameBridge::deliver`] when nothing failed.
///
/// Dropped frames only come out of [`FrameBridge::isolate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handoff {
    Delivered,
    TargetGone,
}

impl From<Handoff> for Delivery {
    fn from(handoff: Handoff) -> Self {
        match handoff {
            Handoff::Delivered => Delivery::Delivered,
            Handoff::TargetGone => Delivery::TargetGone,
        }
    }
}

/// Forwards decoded frames to callback targets with fault containment.
///
/// Holds no per-call state; one bridge can be shared by the video and audio
/// decoder threads.
#[derive(Debug)]
pub struct FrameBridge {
    config: BridgeConfig,
    recorder: FaultRecorder,
}

impl FrameBridge {
    pub fn new(config: BridgeConfig) -> Self {
        let recorder = FaultRecorder::new(&config);
        Self { config, recorder }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn stats(&self) -> BridgeStats {
        self.recorder.snapshot()
    }

    /// Forward one video frame.
    pub fn forward_video_frame<T: CallbackTarget>(&self, target: T, frame: VideoFrame<'_>) -> Delivery {
        self.forward(target, FramePayload::Video(frame))
    }

    /// Forward one audio frame.
    pub fn forward_audio_frame<T: CallbackTarget>(&self, target: T, frame: AudioFrame<'_>) -> Delivery {
        self.forward(target, FramePayload::Audio(frame))
    }

    /// Forward a frame of either kind.
    pub fn forward<T: CallbackTarget>(&self, target: T, payload: FramePayload<'_>) -> Delivery {
        self.isolate(payload.kind(), || self.deliver(target, payload))
    }

    /// Run `op` with every failure contained.
    ///
    /// Errors returned by `op` and panics unwinding out of it are recorded
    /// and turned into [`Delivery::Dropped`]. Nothing is retried.
    pub fn isolate<F>(&self, frame: FrameKind, op: F) -> Delivery
    where
        F: FnOnce() -> Result<Handoff, BridgeError>,
    {
        let result = match panic::catch_unwind(AssertUnwindSafe(op)) {
            Ok(result) => result,
            Err(payload) => Err(BridgeError::Panic(panic_message(payload.as_ref()))),
        };

        let delivery = match &result {
            Ok(handoff) => Delivery::from(*handoff),
            Err(e) => Delivery::Dropped(e.kind()),
        };

        // Recording logs; a panicking log layer must not escape either.
        let recorded = panic::catch_unwind(AssertUnwindSafe(|| match &result {
            Ok(Handoff::Delivered) => self.recorder.record_delivered(frame),
            Ok(Handoff::TargetGone) => self.recorder.record_dead_target(frame),
            Err(e) => {
                self.recorder.record_fault(frame, e);
            }
        }));
        if recorded.is_err() {
            trace!(frame = %frame, "Failed to record delivery outcome");
        }

        delivery
    }

    /// Resolve `target`, validate the frame and invoke the receiver.
    ///
    /// Not isolated on its own; callers that need extra setup before the
    /// target can be built (attaching a thread to the managed runtime, say)
    /// run that setup and this inside one [`isolate`](Self::isolate).
    pub fn deliver<T: CallbackTarget>(
        &self,
        target: T,
        payload: FramePayload<'_>,
    ) -> Result<Handoff, BridgeError> {
        let Some(mut receiver) = target.resolve()? else {
            return Ok(Handoff::TargetGone);
        };

        match &payload {
            FramePayload::Video(frame) => {
                frame.validate(self.config.validate_frame_size)?;
                receiver.deliver_video(frame)?;
            }
            FramePayload::Audio(frame) => receiver.deliver_audio(frame)?,
        }

        Ok(Handoff::Delivered)
    }
}

impl Default for FrameBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MarshalingError;

    #[test]
    fn test_isolate_passes_through_success() {
        let bridge = FrameBridge::default();
        assert_eq!(bridge.isolate(FrameKind::Video, || Ok(Handoff::Delivered)), Delivery::Delivered);
        assert_eq!(bridge.stats().video_delivered, 1);
    }

    #[test]
    fn test_isolate_records_every_outcome() {
        let bridge = FrameBridge::default();
        let outcomes = [
            bridge.isolate(FrameKind::Audio, || Ok(Handoff::Delivered)),
            bridge.isolate(FrameKind::Audio, || Ok(Handoff::TargetGone)),
            bridge.isolate(FrameKind::Audio, || Err(BridgeError::callback("thrown"))),
            bridge.isolate(FrameKind::Audio, || panic!("boom")),
        ];
        assert_eq!(
            outcomes,
            [
                Delivery::Delivered,
                Delivery::TargetGone,
                Delivery::Dropped(FaultKind::Callback),
                Delivery::Dropped(FaultKind::Panic),
            ]
        );

        let stats = bridge.stats();
        let dropped = outcomes.iter().filter(|d| matches!(d, Delivery::Dropped(_))).count();
        assert_eq!(stats.total_faults(), dropped as u64);
        assert_eq!(stats.recent_faults.len(), dropped);
        assert_eq!(stats.audio_delivered, 1);
        assert_eq!(stats.dead_target, 1);
    }

    #[test]
    fn test_isolate_contains_error() {
        let bridge = FrameBridge::default();
        let delivery = bridge.isolate(FrameKind::Audio, || {
            Err(MarshalingError::Allocation("out of memory".into()).into())
        });
        assert_eq!(delivery, Delivery::Dropped(FaultKind::Marshaling));

        let stats = bridge.stats();
        assert_eq!(stats.marshaling_faults, 1);
        assert_eq!(stats.audio_delivered, 0);
    }

    #[test]
    fn test_isolate_contains_panic() {
        let bridge = FrameBridge::default();
        let delivery = bridge.isolate(FrameKind::Video, || panic!("receiver exploded"));
        assert_eq!(delivery, Delivery::Dropped(FaultKind::Panic));

        let stats = bridge.stats();
        assert_eq!(stats.panics, 1);
        assert_eq!(stats.recent_faults[0].message, "panic: receiver exploded");
    }

    #[test]
    fn test_isolate_contains_formatted_panic() {
        let bridge = FrameBridge::default();
        let width = 7;
        bridge.isolate(FrameKind::Video, || panic!("bad width {}", width));
        assert_eq!(bridge.stats().recent_faults[0].message, "panic: bad width 7");
    }

    #[test]
    fn test_panic_message_unknown_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
