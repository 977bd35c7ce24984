//! Pixel format tags as produced by the decoder.

use serde::{Deserialize, Serialize};

/// Packs four characters into a little-endian FOURCC code.
pub const fn fourcc(a: u8, b: u8, c: u8, d: u8) -> i32 {
    (a as i32) | ((b as i32) << 8) | ((c as i32) << 16) | ((d as i32) << 24)
}

/// Raw pixel format tag.
///
/// The tag is forwarded to the managed side exactly as the decoder sent it,
/// recognized or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PixelFormatTag(pub i32);

impl PixelFormatTag {
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Known format for this tag, if any.
    pub fn pixel_format(self) -> Option<PixelFormat> {
        PixelFormat::from_tag(self.0)
    }
}

impl From<i32> for PixelFormatTag {
    fn from(tag: i32) -> Self {
        PixelFormatTag(tag)
    }
}

impl From<PixelFormat> for PixelFormatTag {
    fn from(format: PixelFormat) -> Self {
        PixelFormatTag(format.tag())
    }
}

impl std::fmt::Display for PixelFormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.pixel_format() {
            Some(format) => write!(f, "{}({})", format.name(), self.0),
            None => write!(f, "unknown({})", self.0),
        }
    }
}

/// Pixel formats the decoder can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Yuv420p,
    Yuyv422,
    Rgb24,
    Bgr24,
    Yuv422p,
    Yuv444p,
    Yuv410p,
    Yuv411p,
    Gray8,
    MonoWhite,
    MonoBlack,
    Pal8,
    Yuvj420p,
    Yuvj422p,
    Yuvj444p,
    /// Packed 32-bit RGB overlay format
    Rv32,
}

const RV32_TAG: i32 = fourcc(b'R', b'V', b'3', b'2');

/// Size of the palette that trails PAL8 image data.
const PALETTE_SIZE: usize = 256 * 4;

impl PixelFormat {
    pub const ALL: [PixelFormat; 16] = [
        PixelFormat::Yuv420p,
        PixelFormat::Yuyv422,
        PixelFormat::Rgb24,
        PixelFormat::Bgr24,
        PixelFormat::Yuv422p,
        PixelFormat::Yuv444p,
        PixelFormat::Yuv410p,
        PixelFormat::Yuv411p,
        PixelFormat::Gray8,
        PixelFormat::MonoWhite,
        PixelFormat::MonoBlack,
        PixelFormat::Pal8,
        PixelFormat::Yuvj420p,
        PixelFormat::Yuvj422p,
        PixelFormat::Yuvj444p,
        PixelFormat::Rv32,
    ];

    pub fn from_tag(tag: i32) -> Option<Self> {
        let format = match tag {
            0 => PixelFormat::Yuv420p,
            1 => PixelFormat::Yuyv422,
            2 => PixelFormat::Rgb24,
            3 => PixelFormat::Bgr24,
            4 => PixelFormat::Yuv422p,
            5 => PixelFormat::Yuv444p,
            6 => PixelFormat::Yuv410p,
            7 => PixelFormat::Yuv411p,
            8 => PixelFormat::Gray8,
            9 => PixelFormat::MonoWhite,
            10 => PixelFormat::MonoBlack,
            11 => PixelFormat::Pal8,
            12 => PixelFormat::Yuvj420p,
            13 => PixelFormat::Yuvj422p,
            14 => PixelFormat::Yuvj444p,
            RV32_TAG => PixelFormat::Rv32,
            _ => return None,
        };
        Some(format)
    }

    pub fn tag(self) -> i32 {
        match self {
            PixelFormat::Yuv420p => 0,
            PixelFormat::Yuyv422 => 1,
            PixelFormat::Rgb24 => 2,
            PixelFormat::Bgr24 => 3,
            PixelFormat::Yuv422p => 4,
            PixelFormat::Yuv444p => 5,
            PixelFormat::Yuv410p => 6,
            PixelFormat::Yuv411p => 7,
            PixelFormat::Gray8 => 8,
            PixelFormat::MonoWhite => 9,
            PixelFormat::MonoBlack => 10,
            PixelFormat::Pal8 => 11,
            PixelFormat::Yuvj420p => 12,
            PixelFormat::Yuvj422p => 13,
            PixelFormat::Yuvj444p => 14,
            PixelFormat::Rv32 => RV32_TAG,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Yuv420p => "yuv420p",
            PixelFormat::Yuyv422 => "yuyv422",
            PixelFormat::Rgb24 => "rgb24",
            PixelFormat::Bgr24 => "bgr24",
            PixelFormat::Yuv422p => "yuv422p",
            PixelFormat::Yuv444p => "yuv444p",
            PixelFormat::Yuv410p => "yuv410p",
            PixelFormat::Yuv411p => "yuv411p",
            PixelFormat::Gray8 => "gray8",
            PixelFormat::MonoWhite => "monowhite",
            PixelFormat::MonoBlack => "monoblack",
            PixelFormat::Pal8 => "pal8",
            PixelFormat::Yuvj420p => "yuvj420p",
            PixelFormat::Yuvj422p => "yuvj422p",
            PixelFormat::Yuvj444p => "yuvj444p",
            PixelFormat::Rv32 => "rv32",
        }
    }

    /// Minimum number of bytes a tightly packed frame of this format
    /// occupies. Saturates instead of overflowing.
    pub fn frame_size(self, width: usize, height: usize) -> usize {
        let luma = width.saturating_mul(height);
        let half_w = width.div_ceil(2);
        let half_h = height.div_ceil(2);
        let quarter_w = width.div_ceil(4);
        let quarter_h = height.div_ceil(4);

        match self {
            PixelFormat::Yuv420p | PixelFormat::Yuvj420p => {
                luma.saturating_add(half_w.saturating_mul(half_h).saturating_mul(2))
            }
            PixelFormat::Yuv422p | PixelFormat::Yuvj422p => {
                luma.saturating_add(half_w.saturating_mul(height).saturating_mul(2))
            }
            PixelFormat::Yuv444p | PixelFormat::Yuvj444p => luma.saturating_mul(3),
            PixelFormat::Yuv410p => {
                luma.saturating_add(quarter_w.saturating_mul(quarter_h).saturating_mul(2))
            }
            PixelFormat::Yuv411p => {
                luma.saturating_add(quarter_w.saturating_mul(height).saturating_mul(2))
            }
            PixelFormat::Yuyv422 => half_w.saturating_mul(4).saturating_mul(height),
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => luma.saturating_mul(3),
            PixelFormat::Gray8 => luma,
            PixelFormat::MonoWhite | PixelFormat::MonoBlack => {
                width.div_ceil(8).saturating_mul(height)
            }
            PixelFormat::Pal8 => luma.saturating_add(PALETTE_SIZE),
            PixelFormat::Rv32 => luma.saturating_mul(4),
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_decoder_enumeration() {
        for format in PixelFormat::ALL {
            assert_eq!(PixelFormat::from_tag(format.tag()), Some(format));
        }
        assert_eq!(PixelFormat::from_tag(0), Some(PixelFormat::Yuv420p));
        assert_eq!(PixelFormat::from_tag(12), Some(PixelFormat::Yuvj420p));
        assert_eq!(PixelFormat::from_tag(15), None);
        assert_eq!(PixelFormat::from_tag(-1), None);
    }

    #[test]
    fn test_rv32_fourcc() {
        assert_eq!(PixelFormat::Rv32.tag(), 0x3233_5652);
        assert_eq!(PixelFormatTag(0x3233_5652).pixel_format(), Some(PixelFormat::Rv32));
    }

    #[test]
    fn test_frame_sizes() {
        assert_eq!(PixelFormat::Yuv420p.frame_size(1920, 1080), 1920 * 1080 * 3 / 2);
        // odd dimensions round chroma up
        assert_eq!(PixelFormat::Yuv420p.frame_size(3, 3), 9 + 2 * 4);
        assert_eq!(PixelFormat::Yuv422p.frame_size(4, 2), 8 + 2 * 4);
        assert_eq!(PixelFormat::Yuyv422.frame_size(4, 2), 16);
        assert_eq!(PixelFormat::Rgb24.frame_size(2, 2), 12);
        assert_eq!(PixelFormat::MonoBlack.frame_size(9, 2), 4);
        assert_eq!(PixelFormat::Pal8.frame_size(1, 1), 1 + 1024);
        assert_eq!(PixelFormat::Rv32.frame_size(2, 3), 24);
        assert_eq!(PixelFormat::Gray8.frame_size(0, 100), 0);
    }

    #[test]
    fn test_frame_size_saturates() {
        assert_eq!(PixelFormat::Rv32.frame_size(usize::MAX, 2), usize::MAX);
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(PixelFormatTag(0).to_string(), "yuv420p(0)");
        assert_eq!(PixelFormatTag(99).to_string(), "unknown(99)");
    }
}
