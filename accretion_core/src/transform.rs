// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 3×3 projective transform.
//!
//! This type covers the subset of 2-D homogeneous transforms that
//! `accretion_core` actually needs (identity, multiply, column access, point
//! mapping) without pulling in a full linear-algebra crate. Each layer carries
//! two independent instances: one mapping texture sampling coordinates and one
//! placing the layer's geometry in its parent's space.

use core::ops::Mul;

/// A column-major 3×3 projective transform stored as `[[f64; 3]; 3]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// used by GPU APIs for homogeneous 2-D coordinates `[x, y, w]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2d {
    /// Three columns, each a 3-element array `[x, y, w]`.
    pub cols: [[f64; 3]; 3],
}

impl Transform2d {
    /// The 3×3 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Creates a transform from three column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 3], col1: [f64; 3], col2: [f64; 3]) -> Self {
        Self {
            cols: [col0, col1, col2],
        }
    }

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 3]; 3]) -> Self {
        Self { cols }
    }

    /// Returns the columns as a 2-D array.
    #[inline]
    #[must_use]
    pub const fn to_cols_array_2d(self) -> [[f64; 3]; 3] {
        self.cols
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 3`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 3] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64) -> Self {
        Self {
            cols: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [x, y, 1.0]],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64) -> Self {
        Self {
            cols: [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Creates a counter-clockwise rotation (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            cols: [[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Maps a point through the transform, performing the perspective divide.
    ///
    /// Returns the input unchanged in `w` terms when the bottom row is the
    /// affine `[0, 0, 1]`.
    #[inline]
    #[must_use]
    pub fn map_point(self, x: f64, y: f64) -> (f64, f64) {
        let c = &self.cols;
        let out_x = c[0][0] * x + c[1][0] * y + c[2][0];
        let out_y = c[0][1] * x + c[1][1] * y + c[2][1];
        let out_w = c[0][2] * x + c[1][2] * y + c[2][2];
        if out_w == 1.0 {
            (out_x, out_y)
        } else {
            (out_x / out_w, out_y / out_w)
        }
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        let c = &self.cols;
        c[0][0].is_finite()
            && c[0][1].is_finite()
            && c[0][2].is_finite()
            && c[1][0].is_finite()
            && c[1][1].is_finite()
            && c[1][2].is_finite()
            && c[2][0].is_finite()
            && c[2][1].is_finite()
            && c[2][2].is_finite()
    }

    /// Is this transform [NaN]?
    ///
    /// [NaN]: f64::is_nan
    #[inline]
    #[must_use]
    pub const fn is_nan(&self) -> bool {
        let c = &self.cols;
        c[0][0].is_nan()
            || c[0][1].is_nan()
            || c[0][2].is_nan()
            || c[1][0].is_nan()
            || c[1][1].is_nan()
            || c[1][2].is_nan()
            || c[2][0].is_nan()
            || c[2][1].is_nan()
            || c[2][2].is_nan()
    }
}

impl Default for Transform2d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform2d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 3]; 3];
        let mut j = 0;
        while j < 3 {
            let mut i = 0;
            while i < 3 {
                out[j][i] = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}
