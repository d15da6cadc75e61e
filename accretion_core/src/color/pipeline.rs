// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Eager composition of the explicit filter and the colorspace conversion.

use super::dataspace::Dataspace;
use super::filter::ColorFilter;
use super::space::ColorSpace;

/// Folds a layer's two color-correction inputs into one effective filter.
///
/// The two inputs are independent: an explicit caller-supplied
/// [`ColorFilter`] and the conversion implied by the content's [`Dataspace`]
/// (or an explicit [`ColorSpace`] profile when the tag is too coarse).
/// Every mutation recomposes synchronously, so [`composed`](Self::composed)
/// is never stale at the moment a reader observes it.
///
/// Composition is a pure function of the two inputs with three shapes:
///
/// - both absent/identity → no effective filter (nothing is allocated);
/// - exactly one input → that filter is reused directly, no wrapper;
/// - both present → a genuine two-stage composition, conversion first, then
///   the explicit filter (see the module docs for the order rationale).
#[derive(Clone, Debug, Default)]
pub struct ColorPipeline {
    /// Explicit filter used to draw the layer. Optional.
    filter: Option<ColorFilter>,
    /// Colorspace tag of the layer's current content.
    dataspace: Dataspace,
    /// Conversion into the working space implied by the current source
    /// space. Optional; rebuilt only when the source space changes.
    conversion: Option<ColorFilter>,
    /// The combination of `filter` and `conversion`. Optional.
    composed: Option<ColorFilter>,
}

impl ColorPipeline {
    /// Creates a pipeline with an optional initial explicit filter, an
    /// unknown dataspace, and no conversion.
    #[must_use]
    pub fn new(filter: Option<ColorFilter>) -> Self {
        let mut pipeline = Self {
            filter,
            ..Self::default()
        };
        pipeline.recompose();
        pipeline
    }

    /// Replaces the explicit filter (`None` clears it) and recomposes.
    pub fn set_filter(&mut self, filter: Option<ColorFilter>) {
        self.filter = filter;
        self.recompose();
    }

    /// Updates the colorspace tag.
    ///
    /// Setting the tag it already has is a no-op: the composed filter keeps
    /// its object identity, no recomposition runs.
    pub fn set_dataspace(&mut self, dataspace: Dataspace) {
        if self.dataspace == dataspace {
            return;
        }
        self.dataspace = dataspace;
        self.conversion = dataspace
            .color_space()
            .and_then(|space| space.conversion_filter());
        self.recompose();
    }

    /// Overrides the source colorspace with a full profile, for content whose
    /// tag is insufficiently precise. `None` clears the conversion.
    pub fn set_color_space(&mut self, space: Option<ColorSpace>) {
        self.conversion = space.and_then(|space| space.conversion_filter());
        self.recompose();
    }

    /// Returns the current explicit filter.
    #[inline]
    #[must_use]
    pub fn filter(&self) -> Option<&ColorFilter> {
        self.filter.as_ref()
    }

    /// Returns the current colorspace tag.
    #[inline]
    #[must_use]
    pub fn dataspace(&self) -> Dataspace {
        self.dataspace
    }

    /// Returns the current effective filter, or `None` when both inputs are
    /// absent/identity.
    #[inline]
    #[must_use]
    pub fn composed(&self) -> Option<&ColorFilter> {
        self.composed.as_ref()
    }

    /// Rebuilds `composed` from the two current inputs.
    ///
    /// Conversion runs first, then the explicit filter, so composition uses
    /// the conversion as the inner stage.
    fn recompose(&mut self) {
        self.composed = match (&self.filter, &self.conversion) {
            (None, None) => None,
            (None, Some(conversion)) => Some(conversion.clone()),
            (Some(filter), None) => Some(filter.clone()),
            (Some(filter), Some(conversion)) => Some(ColorFilter::compose(filter, conversion)),
        };
    }
}
