//! A registered Java receiver and the bridge that feeds it.

use framebridge_core::{
    AudioFrame, BridgeConfig, BridgeError, BridgeStats, Delivery, FrameBridge, FrameKind,
    FramePayload, Handoff, MarshalingError, VideoFrame,
};
use jni::objects::{JObject, WeakRef};
use jni::{JNIEnv, JavaVM};
use tracing::{debug, info};

use crate::error::AndroidError;
use crate::receiver::{take_exception, JavaTarget};

/// A Java receiver registered for frame callbacks.
///
/// Only a weak reference is held: once Java drops the receiver, forwarding
/// calls become no-ops. Safe to share between the video and audio decoder
/// threads.
pub struct Registration {
    vm: JavaVM,
    receiver: WeakRef,
    bridge: FrameBridge,
}

impl Registration {
    pub fn new(env: &mut JNIEnv, receiver: &JObject, config: BridgeConfig) -> Result<Self, AndroidError> {
        config.validate()?;

        let vm = env.get_java_vm()?;
        let receiver = env
            .new_weak_ref(receiver)?
            .ok_or_else(|| AndroidError::InvalidParameter("receiver is null".to_string()))?;

        info!(buffer_mode = ?config.buffer_mode, "Registered frame receiver");

        Ok(Self {
            vm,
            receiver,
            bridge: FrameBridge::new(config),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        self.bridge.config()
    }

    pub fn stats(&self) -> BridgeStats {
        self.bridge.stats()
    }

    /// Forward a video frame from any thread.
    ///
    /// Native decoder threads are attached to the VM as daemons on first
    /// use.
    pub fn forward_video(&self, frame: VideoFrame<'_>) -> Delivery {
        self.forward_with(FrameKind::Video, || Ok(FramePayload::Video(frame)))
    }

    /// Forward an audio frame from any thread.
    pub fn forward_audio(&self, frame: AudioFrame<'_>) -> Delivery {
        self.forward_with(FrameKind::Audio, || Ok(FramePayload::Audio(frame)))
    }

    /// Build a frame with `read` and forward it.
    ///
    /// `read` runs inside the isolated region, so a buffer that cannot be
    /// read from the decoder is recorded like any other fault.
    pub fn forward_with<'f, F>(&self, frame: FrameKind, read: F) -> Delivery
    where
        F: FnOnce() -> Result<FramePayload<'f>, MarshalingError>,
    {
        let delivery = self.bridge.isolate(frame, || {
            let payload = read()?;
            self.deliver_attached(payload)
        });
        self.settle(delivery)
    }

    fn deliver_attached(&self, payload: FramePayload<'_>) -> Result<Handoff, BridgeError> {
        let mut env = self
            .vm
            .attach_current_thread_as_daemon()
            .map_err(|e| MarshalingError::Runtime(format!("failed to attach decoder thread: {}", e)))?;

        let target = JavaTarget::new(&mut env, &self.receiver, self.config().buffer_mode);
        self.bridge.deliver(target, payload)
    }

    /// Leave no Java exception pending on the decoder thread after a
    /// contained fault.
    fn settle(&self, delivery: Delivery) -> Delivery {
        if let Delivery::Dropped(kind) = delivery {
            if let Ok(mut env) = self.vm.get_env() {
                if let Some(exception) = take_exception(&mut env) {
                    debug!(kind = %kind, exception = %exception, "Cleared pending Java exception");
                }
            }
        }
        delivery
    }
}

/// Forward a video frame on a thread that already holds a `JNIEnv`.
pub fn forward_video_frame(
    env: &mut JNIEnv,
    receiver: &WeakRef,
    bridge: &FrameBridge,
    frame: VideoFrame<'_>,
) -> Delivery {
    let mode = bridge.config().buffer_mode;
    let delivery = bridge.forward_video_frame(JavaTarget::new(env, receiver, mode), frame);
    if let Delivery::Dropped(_) = delivery {
        take_exception(env);
    }
    delivery
}

/// Forward an audio frame on a thread that already holds a `JNIEnv`.
pub fn forward_audio_frame(
    env: &mut JNIEnv,
    receiver: &WeakRef,
    bridge: &FrameBridge,
    frame: AudioFrame<'_>,
) -> Delivery {
    let mode = bridge.config().buffer_mode;
    let delivery = bridge.forward_audio_frame(JavaTarget::new(env, receiver, mode), frame);
    if let Delivery::Dropped(_) = delivery {
        take_exception(env);
    }
    delivery
}
