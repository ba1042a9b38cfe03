//! Pixel layouts understood by pipeline stages.
//!
//! This module provides the runtime description of interleaved pixel data
//! flowing between stages.
//!
//! # Types
//!
//! - [`BitDepth`] - Storage type of a single channel sample
//! - [`AlphaMode`] - Whether (and how) the last channel carries alpha
//! - [`PixelFormat`] - Closed set of interleaved layouts
//!
//! # Usage
//!
//! ```rust
//! use rescale_core::format::{AlphaMode, BitDepth, PixelFormat};
//!
//! let fmt = PixelFormat::Pbgra32;
//! assert_eq!(fmt.channels(), 4);
//! assert_eq!(fmt.bit_depth(), BitDepth::U8);
//! assert_eq!(fmt.alpha(), AlphaMode::Premultiplied);
//! assert_eq!(fmt.bytes_per_pixel(), 4);
//! ```
//!
//! # Sample encoding
//!
//! Multi-byte integer samples are stored in native byte order. Channel order
//! within a pixel follows the format name (B, G, R, A for the BGR family).

use std::fmt;

/// Storage type of one channel sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    /// 8-bit unsigned integer [0, 255].
    #[default]
    U8,
    /// 16-bit unsigned integer [0, 65535].
    U16,
    /// 32-bit float.
    F32,
}

impl BitDepth {
    /// Number of bits per channel.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::F32 => 32,
        }
    }

    /// Bytes used to store one channel sample.
    #[inline]
    pub const fn bytes_per_channel(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }

    /// Whether this is a floating-point depth.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32)
    }

    /// Maximum integer sample value. Returns 0 for float depths.
    #[inline]
    pub const fn max_value(&self) -> u32 {
        match self {
            Self::U8 => 255,
            Self::U16 => 65535,
            Self::F32 => 0,
        }
    }
}

/// Interpretation of the alpha channel, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaMode {
    /// No alpha channel.
    #[default]
    None,
    /// Color channels are independent of alpha.
    Straight,
    /// Color channels are pre-multiplied by alpha.
    Premultiplied,
}

impl AlphaMode {
    /// Returns `true` if the layout carries an alpha channel.
    #[inline]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Closed set of interleaved pixel layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit greyscale.
    Grey8,
    /// 16-bit greyscale.
    Grey16,
    /// Interleaved 8-bit chroma pair (Cb, Cr).
    CbCr8,
    /// 8-bit B, G, R.
    Bgr24,
    /// 16-bit B, G, R.
    Bgr48,
    /// 8-bit B, G, R, A with straight alpha.
    Bgra32,
    /// 8-bit B, G, R, A with premultiplied alpha.
    Pbgra32,
    /// 16-bit B, G, R, A with straight alpha.
    Bgra64,
    /// 16-bit B, G, R, A with premultiplied alpha.
    Pbgra64,
    /// 32-bit float greyscale.
    Grey32Float,
    /// 32-bit float B, G, R, A with straight alpha.
    Bgra128Float,
}

impl PixelFormat {
    /// Every known format, in declaration order.
    pub const ALL: [PixelFormat; 11] = [
        Self::Grey8,
        Self::Grey16,
        Self::CbCr8,
        Self::Bgr24,
        Self::Bgr48,
        Self::Bgra32,
        Self::Pbgra32,
        Self::Bgra64,
        Self::Pbgra64,
        Self::Grey32Float,
        Self::Bgra128Float,
    ];

    /// Total interleaved channels per pixel, alpha included.
    #[inline]
    pub const fn channels(&self) -> usize {
        match self {
            Self::Grey8 | Self::Grey16 | Self::Grey32Float => 1,
            Self::CbCr8 => 2,
            Self::Bgr24 | Self::Bgr48 => 3,
            Self::Bgra32 | Self::Pbgra32 | Self::Bgra64 | Self::Pbgra64 | Self::Bgra128Float => 4,
        }
    }

    /// Channels that carry color (everything but alpha).
    #[inline]
    pub const fn color_channels(&self) -> usize {
        if self.alpha().is_present() {
            self.channels() - 1
        } else {
            self.channels()
        }
    }

    /// Storage type of each channel.
    #[inline]
    pub const fn bit_depth(&self) -> BitDepth {
        match self {
            Self::Grey8 | Self::CbCr8 | Self::Bgr24 | Self::Bgra32 | Self::Pbgra32 => BitDepth::U8,
            Self::Grey16 | Self::Bgr48 | Self::Bgra64 | Self::Pbgra64 => BitDepth::U16,
            Self::Grey32Float | Self::Bgra128Float => BitDepth::F32,
        }
    }

    /// Alpha interpretation of the last channel.
    #[inline]
    pub const fn alpha(&self) -> AlphaMode {
        match self {
            Self::Bgra32 | Self::Bgra64 | Self::Bgra128Float => AlphaMode::Straight,
            Self::Pbgra32 | Self::Pbgra64 => AlphaMode::Premultiplied,
            _ => AlphaMode::None,
        }
    }

    /// Bytes per interleaved pixel.
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        self.channels() * self.bit_depth().bytes_per_channel()
    }

    /// Minimum stride in bytes for a row of `width` pixels, or `None` on
    /// overflow.
    #[inline]
    pub fn row_bytes(&self, width: u32) -> Option<usize> {
        (width as usize).checked_mul(self.bytes_per_pixel())
    }

    /// Short display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Grey8 => "Grey8",
            Self::Grey16 => "Grey16",
            Self::CbCr8 => "CbCr8",
            Self::Bgr24 => "Bgr24",
            Self::Bgr48 => "Bgr48",
            Self::Bgra32 => "Bgra32",
            Self::Pbgra32 => "Pbgra32",
            Self::Bgra64 => "Bgra64",
            Self::Pbgra64 => "Pbgra64",
            Self::Grey32Float => "Grey32Float",
            Self::Bgra128Float => "Bgra128Float",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
