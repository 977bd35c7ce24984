//! Frame data handed over by the decoder.

use bytes::Bytes;
use serde::Serialize;

use crate::errors::MarshalingError;
use crate::format::PixelFormatTag;

/// Borrowed view of decoded pixel or sample data.
///
/// Valid only for the duration of one forwarding call. Receivers that need
/// the data afterwards must copy it.
#[derive(Debug, Clone, Copy)]
pub struct FrameBuffer<'a> {
    data: &'a [u8],
}

impl<'a> FrameBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy the data out of the decoder's buffer.
    pub fn copy_to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.data)
    }
}

impl<'a> From<&'a [u8]> for FrameBuffer<'a> {
    fn from(data: &'a [u8]) -> Self {
        FrameBuffer::new(data)
    }
}

fn seconds_to_micros(pts: f64) -> i64 {
    (pts * 1_000_000.0) as i64
}

/// Video frame metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VideoFrameMetadata {
    /// Presentation timestamp in seconds
    pub pts: f64,
    pub format: PixelFormatTag,
    pub width: i32,
    pub height: i32,
}

impl VideoFrameMetadata {
    pub fn new(pts: f64, format: impl Into<PixelFormatTag>, width: i32, height: i32) -> Self {
        Self {
            pts,
            format: format.into(),
            width,
            height,
        }
    }

    /// Presentation timestamp in whole microseconds, truncated toward zero.
    pub fn pts_micros(&self) -> i64 {
        seconds_to_micros(self.pts)
    }
}

/// Audio frame metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioFrameMetadata {
    /// Presentation timestamp in seconds
    pub pts: f64,
}

impl AudioFrameMetadata {
    pub fn new(pts: f64) -> Self {
        Self { pts }
    }

    pub fn pts_micros(&self) -> i64 {
        seconds_to_micros(self.pts)
    }
}

/// One decoded video frame.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    pub buffer: FrameBuffer<'a>,
    pub meta: VideoFrameMetadata,
}

impl<'a> VideoFrame<'a> {
    pub fn new(
        data: &'a [u8],
        pts: f64,
        format: impl Into<PixelFormatTag>,
        width: i32,
        height: i32,
    ) -> Self {
        Self {
            buffer: FrameBuffer::new(data),
            meta: VideoFrameMetadata::new(pts, format, width, height),
        }
    }

    /// Check the frame before it is handed to the managed side.
    ///
    /// Dimensions must be non-negative. When `check_size` is set and the
    /// format is recognized, the buffer must be large enough to hold the
    /// frame. Unrecognized formats are never rejected.
    pub fn validate(&self, check_size: bool) -> Result<(), MarshalingError> {
        let VideoFrameMetadata { width, height, format, .. } = self.meta;
        if width < 0 || height < 0 {
            return Err(MarshalingError::NegativeDimensions { width, height });
        }

        if !check_size {
            return Ok(());
        }

        if let Some(pixel_format) = format.pixel_format() {
            let expected = pixel_format.frame_size(width as usize, height as usize);
            if self.buffer.len() < expected {
                return Err(MarshalingError::BufferTooSmall {
                    format: pixel_format.name(),
                    expected,
                    actual: self.buffer.len(),
                });
            }
        }

        Ok(())
    }
}

/// One decoded audio frame.
#[derive(Debug, Clone, Copy)]
pub struct AudioFrame<'a> {
    pub buffer: FrameBuffer<'a>,
    pub meta: AudioFrameMetadata,
}

impl<'a> AudioFrame<'a> {
    pub fn new(data: &'a [u8], pts: f64) -> Self {
        Self {
            buffer: FrameBuffer::new(data),
            meta: AudioFrameMetadata::new(pts),
        }
    }
}

/// Which forwarder a frame travels through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Video,
    Audio,
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameKind::Video => write!(f, "video"),
            FrameKind::Audio => write!(f, "audio"),
        }
    }
}

/// A frame of either kind, as accepted by the shared delivery path.
#[derive(Debug, Clone, Copy)]
pub enum FramePayload<'a> {
    Video(VideoFrame<'a>),
    Audio(AudioFrame<'a>),
}

impl FramePayload<'_> {
    pub fn kind(&self) -> FrameKind {
        match self {
            FramePayload::Video(_) => FrameKind::Video,
            FramePayload::Audio(_) => FrameKind::Audio,
        }
    }
}
