//! Delivery counters and the recent-fault history.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::{BridgeConfig, MAX_FAULT_HISTORY};
use crate::errors::{BridgeError, FaultKind};
use crate::frame::FrameKind;

/// One contained fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultRecord {
    /// Sequence number of this fault, starting at 1
    pub seq: u64,
    pub kind: FaultKind,
    pub frame: FrameKind,
    pub message: String,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
    pub video_delivered: u64,
    pub audio_delivered: u64,
    pub dead_target: u64,
    pub marshaling_faults: u64,
    pub callback_faults: u64,
    pub panics: u64,
    pub recent_faults: Vec<FaultRecord>,
}

impl BridgeStats {
    pub fn total_faults(&self) -> u64 {
        self.marshaling_faults + self.callback_faults + self.panics
    }

    pub fn total_delivered(&self) -> u64 {
        self.video_delivered + self.audio_delivered
    }
}

/// Records delivery outcomes.
///
/// Counters are atomics; the history lock is only held to push or copy
/// records, never across a callback.
#[derive(Debug)]
pub struct FaultRecorder {
    video_delivered: AtomicU64,
    audio_delivered: AtomicU64,
    dead_target: AtomicU64,
    marshaling: AtomicU64,
    callback: AtomicU64,
    panics: AtomicU64,
    seq: AtomicU64,
    history: Mutex<VecDeque<FaultRecord>>,
    history_capacity: usize,
    log_burst: u64,
    log_every: u64,
}

impl FaultRecorder {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            video_delivered: AtomicU64::new(0),
            audio_delivered: AtomicU64::new(0),
            dead_target: AtomicU64::new(0),
            marshaling: AtomicU64::new(0),
            callback: AtomicU64::new(0),
            panics: AtomicU64::new(0),
            seq: AtomicU64::new(0),
            history: Mutex::new(VecDeque::new()),
            history_capacity: config.fault_history.min(MAX_FAULT_HISTORY),
            log_burst: config.log_burst,
            log_every: config.log_every.max(1),
        }
    }

    pub fn record_delivered(&self, frame: FrameKind) {
        match frame {
            FrameKind::Video => self.video_delivered.fetch_add(1, Ordering::Relaxed),
            FrameKind::Audio => self.audio_delivered.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_dead_target(&self, frame: FrameKind) {
        let count = self.dead_target.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(frame = %frame, count, "Callback target released, frame skipped");
    }

    /// Record one contained fault. Returns its sequence number.
    pub fn record_fault(&self, frame: FrameKind, error: &BridgeError) -> u64 {
        let kind = error.kind();
        match kind {
            FaultKind::Marshaling => self.marshaling.fetch_add(1, Ordering::Relaxed),
            FaultKind::Callback => self.callback.fetch_add(1, Ordering::Relaxed),
            FaultKind::Panic => self.panics.fetch_add(1, Ordering::Relaxed),
        };
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;

        if self.should_log(seq) {
            warn!(seq, kind = %kind, frame = %frame, error = %error, "Frame dropped");
        } else {
            trace!(seq, kind = %kind, frame = %frame, error = %error, "Frame dropped");
        }

        if self.history_capacity > 0 {
            let record = FaultRecord {
                seq,
                kind,
                frame,
                message: error.to_string(),
            };
            // a poisoned history only means a panic elsewhere; keep recording
            let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
            if history.len() == self.history_capacity {
                history.pop_front();
            }
            history.push_back(record);
        }

        seq
    }

    fn should_log(&self, seq: u64) -> bool {
        seq <= self.log_burst || (seq - self.log_burst) % self.log_every == 0
    }

    pub fn snapshot(&self) -> BridgeStats {
        let recent_faults = self
            .history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect();

        BridgeStats {
            video_delivered: self.video_delivered.load(Ordering::Relaxed),
            audio_delivered: self.audio_delivered.load(Ordering::Relaxed),
            dead_target: self.dead_target.load(Ordering::Relaxed),
            marshaling_faults: self.marshaling.load(Ordering::Relaxed),
            callback_faults: self.callback.load(Ordering::Relaxed),
            panics: self.panics.load(Ordering::Relaxed),
            recent_faults,
        }
    }
}

impl Default for FaultRecorder {
    fn default() -> Self {
        Self::new(&BridgeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MarshalingError;

    #[test]
    fn test_counts_by_kind() {
        let recorder = FaultRecorder::default();
        recorder.record_delivered(FrameKind::Video);
        recorder.record_delivered(FrameKind::Audio);
        recorder.record_delivered(FrameKind::Audio);
        recorder.record_dead_target(FrameKind::Video);
        recorder.record_fault(FrameKind::Video, &MarshalingError::InvalidPointer.into());
        recorder.record_fault(FrameKind::Audio, &BridgeError::callback("thrown"));
        recorder.record_fault(FrameKind::Audio, &BridgeError::Panic("boom".into()));

        let stats = recorder.snapshot();
        assert_eq!(stats.video_delivered, 1);
        assert_eq!(stats.audio_delivered, 2);
        assert_eq!(stats.dead_target, 1);
        assert_eq!(stats.marshaling_faults, 1);
        assert_eq!(stats.callback_faults, 1);
        assert_eq!(stats.panics, 1);
        assert_eq!(stats.total_faults(), 3);
        assert_eq!(stats.recent_faults.len(), 3);
        assert_eq!(stats.recent_faults[1].kind, FaultKind::Callback);
        assert_eq!(stats.recent_faults[1].frame, FrameKind::Audio);
    }

    #[test]
    fn test_history_is_bounded() {
        let config = BridgeConfig {
            fault_history: 2,
            ..Default::default()
        };
        let recorder = FaultRecorder::new(&config);
        for i in 0..5 {
            recorder.record_fault(FrameKind::Video, &BridgeError::callback(format!("fault {}", i)));
        }

        let stats = recorder.snapshot();
        assert_eq!(stats.callback_faults, 5);
        let seqs: Vec<u64> = stats.recent_faults.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![4, 5]);
        assert_eq!(stats.recent_faults[1].message, "callback failed: fault 4");
    }

    #[test]
    fn test_history_disabled() {
        let config = BridgeConfig {
            fault_history: 0,
            ..Default::default()
        };
        let recorder = FaultRecorder::new(&config);
        recorder.record_fault(FrameKind::Video, &BridgeError::callback("x"));
        let stats = recorder.snapshot();
        assert_eq!(stats.callback_faults, 1);
        assert!(stats.recent_faults.is_empty());
    }

    #[test]
    fn test_oversized_history_is_clamped() {
        let config = BridgeConfig {
            fault_history: usize::MAX,
            ..Default::default()
        };
        let recorder = FaultRecorder::new(&config);
        for i in 0..(MAX_FAULT_HISTORY + 3) {
            recorder.record_fault(FrameKind::Audio, &BridgeError::callback(format!("fault {}", i)));
        }

        let stats = recorder.snapshot();
        assert_eq!(stats.callback_faults, (MAX_FAULT_HISTORY + 3) as u64);
        assert_eq!(stats.recent_faults.len(), MAX_FAULT_HISTORY);
        assert_eq!(stats.recent_faults[0].seq, 4);
    }

    #[test]
    fn test_log_throttling() {
        let config = BridgeConfig {
            log_burst: 3,
            log_every: 10,
            ..Default::default()
        };
        let recorder = FaultRecorder::new(&config);
        let logged: Vec<u64> = (1..=30).filter(|seq| recorder.should_log(*seq)).collect();
        assert_eq!(logged, vec![1, 2, 3, 13, 23]);
    }

    #[test]
    fn test_stats_serialize() {
        let recorder = FaultRecorder::default();
        recorder.record_fault(FrameKind::Video, &BridgeError::callback("x"));
        let json = serde_json::to_value(recorder.snapshot()).unwrap();
        assert_eq!(json["callback_faults"], 1);
        assert_eq!(json["recent_faults"][0]["kind"], "callback");
        assert_eq!(json["recent_faults"][0]["frame"], "video");
    }
}
