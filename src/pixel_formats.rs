// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Runtime pixel format definitions for surfaces and pixel resources.
//!
//! Unlike a statically-typed texture API, a surface may reinterpret its backing
//! resource under a different format (a cast view), and the blit dispatcher has
//! to compare the formats of two arbitrary requests at runtime.  So formats here
//! are a plain enum with enum-dispatched properties, not zero-sized types.
//!
//! Each format knows:
//! - its block size (bytes per pixel),
//! - whether it is a depth and/or stencil format,
//! - whether it is a pure-integer format (no normalized or float sampling),
//! - whether it is an interleaved 8-bit-normalized color format, which is the
//!   class the multisample resolve engine can average byte-wise.

/// A concrete pixel format.
///
/// The set covers what the software backend can actually render to or resolve:
/// 8/16/32-bit normalized and float color, pure-integer color, and the common
/// depth/stencil layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Single 8-bit normalized channel.
    R8Unorm,
    /// Two 8-bit normalized channels.
    Rg8Unorm,
    /// Four 8-bit normalized channels, RGBA order.
    Rgba8Unorm,
    /// Four 8-bit normalized channels, BGRA order.
    Bgra8Unorm,
    /// Four 8-bit normalized channels with sRGB encoding, RGBA order.
    Rgba8UnormSrgb,
    /// Four 8-bit normalized channels with sRGB encoding, BGRA order.
    Bgra8UnormSrgb,
    /// Four 16-bit normalized channels.
    Rgba16Unorm,
    /// Single 32-bit float channel.
    R32Float,
    /// Four 32-bit float channels.
    Rgba32Float,
    /// Single 32-bit signed integer channel.
    R32Sint,
    /// Single 32-bit unsigned integer channel.
    R32Uint,
    /// Four 32-bit signed integer channels.
    Rgba32Sint,
    /// 24-bit depth with 8-bit stencil, packed.
    Depth24Stencil8,
    /// 32-bit float depth.
    Depth32Float,
    /// 8-bit stencil only.
    Stencil8,
}

impl PixelFormat {
    /// Bytes per pixel (block size for these uncompressed formats).
    pub const fn block_size(self) -> usize {
        match self {
            PixelFormat::R8Unorm | PixelFormat::Stencil8 => 1,
            PixelFormat::Rg8Unorm => 2,
            PixelFormat::Rgba8Unorm
            | PixelFormat::Bgra8Unorm
            | PixelFormat::Rgba8UnormSrgb
            | PixelFormat::Bgra8UnormSrgb
            | PixelFormat::R32Float
            | PixelFormat::R32Sint
            | PixelFormat::R32Uint
            | PixelFormat::Depth24Stencil8
            | PixelFormat::Depth32Float => 4,
            PixelFormat::Rgba16Unorm => 8,
            PixelFormat::Rgba32Float | PixelFormat::Rgba32Sint => 16,
        }
    }

    /// True for formats carrying depth or stencil data.
    pub const fn is_depth_or_stencil(self) -> bool {
        matches!(
            self,
            PixelFormat::Depth24Stencil8 | PixelFormat::Depth32Float | PixelFormat::Stencil8
        )
    }

    /// True for pure-integer formats, which cannot be filtered or averaged.
    pub const fn is_pure_integer(self) -> bool {
        matches!(
            self,
            PixelFormat::R32Sint | PixelFormat::R32Uint | PixelFormat::Rgba32Sint
        )
    }

    /// True for interleaved 8-bit-normalized color formats.
    ///
    /// For this class a byte-wise average over interleaved components is
    /// equivalent to a per-channel average, which is what lets the resolve
    /// engine operate on raw bytes without decoding channels.
    pub const fn is_unorm8(self) -> bool {
        matches!(
            self,
            PixelFormat::R8Unorm
                | PixelFormat::Rg8Unorm
                | PixelFormat::Rgba8Unorm
                | PixelFormat::Bgra8Unorm
                | PixelFormat::Rgba8UnormSrgb
                | PixelFormat::Bgra8UnormSrgb
        )
    }
}

/// Converts an 8-bit normalized value to a unit float in [0, 1].
#[inline]
pub const fn unorm8_to_unit(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Converts a unit float back to an 8-bit normalized value.
///
/// Rounds to nearest, half away from zero, and clamps to [0, 255].  The resolve
/// engine relies on this exact rule: a 0.5 average lands on 127.5 and must
/// produce 0x80, not 0x7f, so repeated resolves do not drift downward.
#[inline]
pub fn unit_to_unorm8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
