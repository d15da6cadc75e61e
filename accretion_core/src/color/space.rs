// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colorspace profiles: primaries plus transfer function.

use super::filter::ColorFilter;

/// Color primaries of a content colorspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primaries {
    /// BT.709 / sRGB gamut (most consumer content).
    Bt709,
    /// Display P3 wide gamut.
    DisplayP3,
    /// BT.2020 ultra-wide gamut (HDR / UHD content).
    Bt2020,
}

/// Transfer function (gamma curve) of a content colorspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferFunction {
    /// Piecewise sRGB curve.
    Srgb,
    /// Linear (no encoding).
    Linear,
    /// SMPTE ST 2084 perceptual quantizer (HDR10).
    Pq,
    /// Hybrid log-gamma (broadcast HDR).
    Hlg,
}

/// A source colorspace profile.
///
/// Used when the coarse [`Dataspace`](super::Dataspace) tag is insufficiently
/// precise. Profiles are plain values; the pipeline only compares them against
/// the working space and hands them to conversion filters, never interpreting
/// pixel data itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorSpace {
    /// Gamut primaries.
    pub primaries: Primaries,
    /// Encoding curve.
    pub transfer: TransferFunction,
}

impl ColorSpace {
    /// The pipeline's working space: sRGB.
    pub const SRGB: Self = Self::new(Primaries::Bt709, TransferFunction::Srgb);

    /// Linear sRGB (scRGB-style extended range content).
    pub const LINEAR_SRGB: Self = Self::new(Primaries::Bt709, TransferFunction::Linear);

    /// Display P3 with the sRGB curve.
    pub const DISPLAY_P3: Self = Self::new(Primaries::DisplayP3, TransferFunction::Srgb);

    /// BT.2020 with the PQ curve (HDR10).
    pub const BT2020_PQ: Self = Self::new(Primaries::Bt2020, TransferFunction::Pq);

    /// BT.2020 with the HLG curve.
    pub const BT2020_HLG: Self = Self::new(Primaries::Bt2020, TransferFunction::Hlg);

    /// Creates a profile from primaries and transfer function.
    #[inline]
    #[must_use]
    pub const fn new(primaries: Primaries, transfer: TransferFunction) -> Self {
        Self {
            primaries,
            transfer,
        }
    }

    /// Returns whether this profile *is* the working space, meaning content
    /// needs no conversion before compositing.
    #[inline]
    #[must_use]
    pub fn is_working(&self) -> bool {
        *self == Self::SRGB
    }

    /// Returns the filter converting content from this space into the working
    /// space, or `None` when this already is the working space.
    ///
    /// The identity case allocates nothing.
    #[must_use]
    pub fn conversion_filter(&self) -> Option<ColorFilter> {
        if self.is_working() {
            None
        } else {
            Some(ColorFilter::convert_from(*self))
        }
    }
}
