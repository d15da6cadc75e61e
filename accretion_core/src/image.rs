// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque handles to GPU-resident layer content.

use core::fmt;
use std::sync::Arc;

/// Pixel format of a backing image.
///
/// Only the formats the compositor actually attaches are listed; the byte
/// widths drive memory attribution, nothing else inspects the format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 4 channels, 8 bits each.
    Rgba8,
    /// BGRA ordering, 8 bits each (some GPU APIs prefer this).
    Bgra8,
    /// 4 channels, 16-bit float (wide-gamut / HDR intermediates).
    Rgba16F,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    #[inline]
    #[must_use]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Rgba16F => 8,
        }
    }
}

/// A reference-counted handle to GPU-resident pixel data backing a layer.
///
/// Images are produced externally (decode, readback, render-to-texture) and
/// shared read-only across layers; cloning is one `Arc` bump. The core stores
/// and forwards the handle and reads its dimensions for memory attribution,
/// never touching pixel contents.
#[derive(Clone)]
pub struct LayerImage {
    inner: Arc<ImageInner>,
}

#[derive(Debug)]
struct ImageInner {
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl LayerImage {
    /// Creates a handle describing a GPU image of the given size and format.
    #[must_use]
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            inner: Arc::new(ImageInner {
                width,
                height,
                format,
            }),
        }
    }

    /// Image width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Image height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Pixel format.
    #[inline]
    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.inner.format
    }

    /// GPU memory footprint attributed to this image, in bytes.
    #[inline]
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        u64::from(self.inner.width)
            * u64::from(self.inner.height)
            * u64::from(self.inner.format.bytes_per_pixel())
    }

    /// Returns whether two handles refer to the same image object.
    #[inline]
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for LayerImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LayerImage({}x{} {:?})",
            self.inner.width, self.inner.height, self.inner.format
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_size_scales_with_format() {
        assert_eq!(LayerImage::new(100, 100, PixelFormat::Rgba8).byte_size(), 40_000);
        assert_eq!(LayerImage::new(100, 100, PixelFormat::Bgra8).byte_size(), 40_000);
        assert_eq!(
            LayerImage::new(100, 100, PixelFormat::Rgba16F).byte_size(),
            80_000
        );
    }

    #[test]
    fn zero_sized_image_attributes_nothing() {
        assert_eq!(LayerImage::new(0, 128, PixelFormat::Rgba8).byte_size(), 0);
    }

    #[test]
    fn large_image_does_not_overflow() {
        let image = LayerImage::new(16_384, 16_384, PixelFormat::Rgba16F);
        assert_eq!(image.byte_size(), 16_384_u64 * 16_384 * 8);
    }

    #[test]
    fn clone_is_same_image() {
        let image = LayerImage::new(8, 8, PixelFormat::Rgba8);
        let clone = image.clone();
        assert!(LayerImage::ptr_eq(&image, &clone));
    }
}
