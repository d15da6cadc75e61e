// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coarse colorspace tags for layer content.

use super::space::ColorSpace;

/// Identifies the color encoding of a layer's current content.
///
/// Tags are the coarse, wire-friendly form of a [`ColorSpace`] profile; the
/// host renderer stamps one on each buffer it produces. When a tag is too
/// coarse, callers can supply a full profile directly instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dataspace {
    /// Encoding unknown; content is treated as already in the working space.
    #[default]
    Unknown,
    /// sRGB primaries and curve.
    Srgb,
    /// sRGB primaries, linear encoding.
    SrgbLinear,
    /// Display P3.
    DisplayP3,
    /// BT.2020 with the PQ curve (HDR10).
    Bt2020Pq,
    /// BT.2020 with the HLG curve.
    Bt2020Hlg,
}

impl Dataspace {
    /// Decodes a raw tag as carried in buffer metadata.
    ///
    /// Unrecognized encodings degrade to [`Unknown`](Self::Unknown) — an
    /// unsupported tag is never an error, it simply contributes no
    /// conversion.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Srgb,
            2 => Self::SrgbLinear,
            3 => Self::DisplayP3,
            4 => Self::Bt2020Pq,
            5 => Self::Bt2020Hlg,
            0 => Self::Unknown,
            other => {
                log::debug!("unsupported dataspace tag {other}, treating as unknown");
                Self::Unknown
            }
        }
    }

    /// Maps the tag to a full colorspace profile.
    ///
    /// [`Unknown`](Self::Unknown) carries no profile: the content is assumed
    /// to already be working-space and contributes no conversion filter.
    #[must_use]
    pub fn color_space(self) -> Option<ColorSpace> {
        match self {
            Self::Unknown => None,
            Self::Srgb => Some(ColorSpace::SRGB),
            Self::SrgbLinear => Some(ColorSpace::LINEAR_SRGB),
            Self::DisplayP3 => Some(ColorSpace::DISPLAY_P3),
            Self::Bt2020Pq => Some(ColorSpace::BT2020_PQ),
            Self::Bt2020Hlg => Some(ColorSpace::BT2020_HLG),
        }
    }
}
