// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque, immutable, reference-counted color transform descriptors.

use core::fmt;
use std::sync::Arc;

use super::space::ColorSpace;

/// A color transform descriptor shared read-only across layers.
///
/// Filters are immutable after construction and cheap to clone (one `Arc`
/// bump), so the same filter can back many layers. The pipeline composes
/// filters but never interprets their internal representation; evaluation is
/// the renderer's concern.
#[derive(Clone)]
pub struct ColorFilter {
    node: Arc<FilterNode>,
}

#[derive(Debug, PartialEq)]
enum FilterNode {
    /// Row-major 4×5 color matrix applied to unpremultiplied RGBA.
    Matrix([f32; 20]),
    /// Conversion from `src` into the working space.
    Convert { src: ColorSpace },
    /// Two-stage composition: `inner` runs first, then `outer`.
    Compose {
        outer: ColorFilter,
        inner: ColorFilter,
    },
}

impl ColorFilter {
    /// Creates a color-matrix filter from a row-major 4×5 matrix.
    #[must_use]
    pub fn matrix(matrix: [f32; 20]) -> Self {
        Self {
            node: Arc::new(FilterNode::Matrix(matrix)),
        }
    }

    /// Creates a filter converting content from `src` into the working space.
    pub(crate) fn convert_from(src: ColorSpace) -> Self {
        Self {
            node: Arc::new(FilterNode::Convert { src }),
        }
    }

    /// Builds a two-stage filter applying `inner` first, then `outer`.
    #[must_use]
    pub fn compose(outer: &Self, inner: &Self) -> Self {
        Self {
            node: Arc::new(FilterNode::Compose {
                outer: outer.clone(),
                inner: inner.clone(),
            }),
        }
    }

    /// Returns whether two filters are the same object (not merely equal).
    #[inline]
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.node, &b.node)
    }

    /// Returns the two stages of a composed filter as `(outer, inner)`, or
    /// `None` for single-stage filters.
    #[must_use]
    pub fn as_compose(&self) -> Option<(&Self, &Self)> {
        match &*self.node {
            FilterNode::Compose { outer, inner } => Some((outer, inner)),
            _ => None,
        }
    }

    /// Returns the source colorspace of a conversion filter, or `None` for
    /// other filter kinds.
    #[must_use]
    pub fn conversion_source(&self) -> Option<ColorSpace> {
        match &*self.node {
            FilterNode::Convert { src } => Some(*src),
            _ => None,
        }
    }
}

impl PartialEq for ColorFilter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node) || *self.node == *other.node
    }
}

impl fmt::Debug for ColorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.node {
            FilterNode::Matrix(_) => f.debug_struct("ColorFilter::Matrix").finish_non_exhaustive(),
            FilterNode::Convert { src } => f
                .debug_struct("ColorFilter::Convert")
                .field("src", src)
                .finish(),
            FilterNode::Compose { outer, inner } => f
                .debug_struct("ColorFilter::Compose")
                .field("outer", outer)
                .field("inner", inner)
                .finish(),
        }
    }
}
