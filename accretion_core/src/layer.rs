// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer aggregate: a texture-backed compositing surface.
//!
//! A [`Layer`] has dimensions, blend and sampling state, two independent
//! transforms (texture sampling and geometry placement), an optional backing
//! image, and a [`ColorPipeline`] folding its color correction into one
//! effective filter. It registers its GPU memory footprint with the context's
//! [`MemoryTracker`](crate::memory::MemoryTracker) for the whole of its life.
//!
//! Layers are shared across threads as `Arc<Layer>`. Configuration belongs to
//! the thread holding exclusive access during frame construction
//! (conventionally the context's owning thread); the internal lock encodes
//! that contract safely and is uncontended in practice. The one operation
//! specified as thread-safe is [`Layer::post_dec_strong`], which routes the
//! release of a reference (and therefore teardown, if it is the last one)
//! to the owning thread.

use core::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use crate::color::{ColorFilter, ColorPipeline, ColorSpace, Dataspace};
use crate::context::ContextHandle;
use crate::image::LayerImage;
use crate::memory::TrackedId;
use crate::transform::Transform2d;

/// Compositing operator for blending a layer over its destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard source-over alpha compositing.
    #[default]
    SourceOver,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
}

/// Mutable configuration of a layer. Guarded by the layer's lock.
#[derive(Debug)]
struct LayerState {
    width: u32,
    height: u32,
    blend: bool,
    /// Raster data backing the layer is scaled, requiring filtered sampling.
    force_filter: bool,
    /// Opacity, conventionally 0–255. Unvalidated; callers are trusted.
    alpha: i32,
    mode: BlendMode,
    /// Texture sampling coordinate transform.
    tex_transform: Transform2d,
    /// Placement of the layer's geometry in its parent's space.
    transform: Transform2d,
    image: Option<LayerImage>,
    color: ColorPipeline,
}

/// A rectangular, independently transformable, independently blended
/// compositing unit backed by GPU-resident content.
pub struct Layer {
    id: TrackedId,
    context: ContextHandle,
    state: Mutex<LayerState>,
}

impl Layer {
    /// Creates a layer registered to the given context, with an optional
    /// initial color filter, initial opacity, and blend mode.
    ///
    /// The layer starts at zero size with no backing image, so registration
    /// attributes zero bytes.
    #[must_use]
    pub fn new(
        context: ContextHandle,
        filter: Option<ColorFilter>,
        alpha: i32,
        mode: BlendMode,
    ) -> Arc<Self> {
        let id = TrackedId::next();
        context.tracker().register(id);
        Arc::new(Self {
            id,
            context,
            state: Mutex::new(LayerState {
                width: 0,
                height: 0,
                blend: false,
                force_filter: false,
                alpha,
                mode,
                tex_transform: Transform2d::IDENTITY,
                transform: Transform2d::IDENTITY,
                image: None,
                color: ColorPipeline::new(filter),
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, LayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// This layer's tracker identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TrackedId {
        self.id
    }

    /// The context handle this layer was created with.
    #[must_use]
    pub fn context(&self) -> &ContextHandle {
        &self.context
    }

    // -- Geometry, blend, and sampling state --

    /// Layer width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.state().width
    }

    /// Layer height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.state().height
    }

    /// Sets the layer's dimensions.
    ///
    /// Resizing does not reallocate or touch the backing image; producing
    /// content at the new size is the renderer's concern.
    pub fn set_size(&self, width: u32, height: u32) {
        let mut state = self.state();
        state.width = width;
        state.height = height;
    }

    /// Whether the layer participates in alpha blending when composited.
    #[must_use]
    pub fn is_blend(&self) -> bool {
        self.state().blend
    }

    /// Enables or disables alpha blending.
    pub fn set_blend(&self, blend: bool) {
        self.state().blend = blend;
    }

    /// Whether sampling must use filtered (non-nearest) lookup.
    #[must_use]
    pub fn force_filter(&self) -> bool {
        self.state().force_filter
    }

    /// Forces filtered sampling, set when the backing raster is known to
    /// require scaling.
    pub fn set_force_filter(&self, force_filter: bool) {
        self.state().force_filter = force_filter;
    }

    /// Layer opacity.
    #[must_use]
    pub fn alpha(&self) -> i32 {
        self.state().alpha
    }

    /// Sets the layer opacity.
    pub fn set_alpha(&self, alpha: i32) {
        self.state().alpha = alpha;
    }

    /// Sets opacity and blend mode together.
    pub fn set_alpha_mode(&self, alpha: i32, mode: BlendMode) {
        let mut state = self.state();
        state.alpha = alpha;
        state.mode = mode;
    }

    /// Current blend mode.
    #[must_use]
    pub fn mode(&self) -> BlendMode {
        self.state().mode
    }

    /// Texture sampling coordinate transform.
    #[must_use]
    pub fn tex_transform(&self) -> Transform2d {
        self.state().tex_transform
    }

    /// Sets the texture sampling coordinate transform.
    pub fn set_tex_transform(&self, transform: Transform2d) {
        self.state().tex_transform = transform;
    }

    /// Geometry transform into the parent's coordinate space.
    #[must_use]
    pub fn transform(&self) -> Transform2d {
        self.state().transform
    }

    /// Sets the geometry transform.
    pub fn set_transform(&self, transform: Transform2d) {
        self.state().transform = transform;
    }

    // -- Color correction (delegates to the ColorPipeline) --

    /// Current explicit color filter.
    #[must_use]
    pub fn color_filter(&self) -> Option<ColorFilter> {
        self.state().color.filter().cloned()
    }

    /// Replaces the explicit color filter (`None` clears it) and recomposes
    /// the effective filter.
    pub fn set_color_filter(&self, filter: Option<ColorFilter>) {
        self.state().color.set_filter(filter);
    }

    /// Colorspace tag of the current content.
    #[must_use]
    pub fn dataspace(&self) -> Dataspace {
        self.state().color.dataspace()
    }

    /// Updates the content's colorspace tag, recomposing only when the
    /// implied conversion changes.
    pub fn set_dataspace(&self, dataspace: Dataspace) {
        self.state().color.set_dataspace(dataspace);
    }

    /// Overrides the source colorspace with a full profile.
    pub fn set_color_space(&self, space: Option<ColorSpace>) {
        self.state().color.set_color_space(space);
    }

    /// The effective filter combining the explicit filter with the
    /// colorspace conversion. Never stale: recomposition happens
    /// synchronously inside every color mutator.
    #[must_use]
    pub fn composed_color_filter(&self) -> Option<ColorFilter> {
        self.state().color.composed().cloned()
    }

    // -- Backing image --

    /// Current backing image handle.
    #[must_use]
    pub fn image(&self) -> Option<LayerImage> {
        self.state().image.clone()
    }

    /// Attaches, replaces, or clears (`None`) the backing image, updating the
    /// bytes attributed to this layer.
    pub fn set_image(&self, image: Option<LayerImage>) {
        let bytes = {
            let mut state = self.state();
            state.image = image;
            state.image.as_ref().map_or(0, LayerImage::byte_size)
        };
        self.context.tracker().update(self.id, bytes);
    }

    // -- Release --

    /// Releases one strong reference from any thread, routing the release to
    /// the context's owning thread when necessary.
    ///
    /// On the owning thread the reference drops immediately. On any other
    /// thread the reference moves into a task posted to the context, so a
    /// last-reference teardown (tracker deregistration, image release) runs
    /// on the owner once it drains its queue. The queue owns the reference
    /// until the task runs or the queue itself is torn down; either way the
    /// reference is released exactly once.
    pub fn post_dec_strong(this: Arc<Self>) {
        if this.context.is_owner() {
            drop(this);
            return;
        }
        let context = this.context.clone();
        context.post(move || drop(this));
    }
}

impl Drop for Layer {
    fn drop(&mut self) {
        log::debug!(
            "layer {:?} torn down on {:?}",
            self.id,
            thread::current().id()
        );
        self.context.tracker().deregister(self.id);
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("context", &self.context)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::context::RenderContext;
    use crate::image::{LayerImage, PixelFormat};

    use super::*;

    fn grayscale() -> ColorFilter {
        ColorFilter::matrix([
            0.2126, 0.7152, 0.0722, 0.0, 0.0, //
            0.2126, 0.7152, 0.0722, 0.0, 0.0, //
            0.2126, 0.7152, 0.0722, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    #[test]
    fn construction_defaults() {
        let context = RenderContext::new();
        let layer = Layer::new(context.handle(), None, 255, BlendMode::SourceOver);

        assert_eq!(layer.width(), 0);
        assert_eq!(layer.height(), 0);
        assert!(!layer.is_blend());
        assert!(!layer.force_filter());
        assert_eq!(layer.alpha(), 255);
        assert_eq!(layer.mode(), BlendMode::SourceOver);
        assert_eq!(layer.dataspace(), Dataspace::Unknown);
        assert!(layer.image().is_none());
        assert!(layer.composed_color_filter().is_none());
        assert_eq!(context.tracker().live_instances(), 1);
        assert_eq!(context.tracker().total_bytes(), 0);
    }

    #[test]
    fn setters_are_independent() {
        // Apply every setter in an arbitrary interleaving; the final state
        // must equal each setter's last value with no hidden coupling.
        let context = RenderContext::new();
        let layer = Layer::new(context.handle(), None, 255, BlendMode::SourceOver);

        layer.set_alpha(17);
        layer.set_size(640, 480);
        layer.set_blend(true);
        layer.set_transform(Transform2d::from_translation(5.0, 6.0));
        layer.set_alpha_mode(128, BlendMode::Multiply);
        layer.set_tex_transform(Transform2d::from_scale(2.0, 2.0));
        layer.set_force_filter(true);
        layer.set_size(800, 600);

        assert_eq!((layer.width(), layer.height()), (800, 600));
        assert!(layer.is_blend());
        assert!(layer.force_filter());
        assert_eq!(layer.alpha(), 128);
        assert_eq!(layer.mode(), BlendMode::Multiply);
        assert_eq!(layer.transform(), Transform2d::from_translation(5.0, 6.0));
        assert_eq!(layer.tex_transform(), Transform2d::from_scale(2.0, 2.0));
        // None of the above touches the color pipeline.
        assert!(layer.composed_color_filter().is_none());
    }

    #[test]
    fn alpha_out_of_conventional_range_is_accepted() {
        let context = RenderContext::new();
        let layer = Layer::new(context.handle(), None, 255, BlendMode::SourceOver);
        layer.set_alpha(-7);
        assert_eq!(layer.alpha(), -7);
        layer.set_alpha(1000);
        assert_eq!(layer.alpha(), 1000);
    }

    #[test]
    fn color_delegation_composes_eagerly() {
        let context = RenderContext::new();
        let filter = grayscale();
        let layer = Layer::new(
            context.handle(),
            Some(filter.clone()),
            255,
            BlendMode::SourceOver,
        );

        // Filter only: reused directly.
        let composed = layer.composed_color_filter().unwrap();
        assert!(ColorFilter::ptr_eq(&composed, &filter));

        // Add a non-working-space tag: two-stage composition.
        layer.set_dataspace(Dataspace::DisplayP3);
        let composed = layer.composed_color_filter().unwrap();
        assert!(composed.as_compose().is_some());

        // Clearing the filter leaves the conversion as sole effective filter.
        layer.set_color_filter(None);
        let composed = layer.composed_color_filter().unwrap();
        assert_eq!(
            composed.conversion_source(),
            Some(ColorSpace::DISPLAY_P3)
        );
    }

    #[test]
    fn resize_does_not_touch_attribution() {
        let context = RenderContext::new();
        let layer = Layer::new(context.handle(), None, 255, BlendMode::SourceOver);
        layer.set_image(Some(LayerImage::new(64, 64, PixelFormat::Rgba8)));
        let before = context.tracker().total_bytes();

        layer.set_size(4096, 4096);
        assert_eq!(context.tracker().total_bytes(), before);
    }

    #[test]
    fn image_attach_replace_clear_updates_attribution() {
        let context = RenderContext::new();
        let layer = Layer::new(context.handle(), None, 255, BlendMode::SourceOver);

        layer.set_image(Some(LayerImage::new(100, 100, PixelFormat::Rgba8)));
        assert_eq!(context.tracker().total_bytes(), 40_000);

        layer.set_image(Some(LayerImage::new(100, 100, PixelFormat::Rgba16F)));
        assert_eq!(context.tracker().total_bytes(), 80_000);

        layer.set_image(None);
        assert_eq!(context.tracker().total_bytes(), 0);
        assert_eq!(context.tracker().live_instances(), 1);
    }

    #[test]
    fn drop_deregisters() {
        let context = RenderContext::new();
        let layer = Layer::new(context.handle(), None, 255, BlendMode::SourceOver);
        layer.set_image(Some(LayerImage::new(32, 32, PixelFormat::Rgba8)));
        assert_eq!(context.tracker().live_instances(), 1);

        drop(layer);
        assert_eq!(context.tracker().live_instances(), 0);
        assert_eq!(context.tracker().total_bytes(), 0);
    }

    #[test]
    fn post_dec_strong_on_owner_is_synchronous() {
        let context = RenderContext::new();
        let layer = Layer::new(context.handle(), None, 255, BlendMode::SourceOver);

        Layer::post_dec_strong(layer);
        // No run_tasks needed: the fast path dropped the reference in place.
        assert_eq!(context.tracker().live_instances(), 0);
    }

    #[test]
    fn shared_filter_backs_multiple_layers() {
        let context = RenderContext::new();
        let filter = grayscale();
        let a = Layer::new(
            context.handle(),
            Some(filter.clone()),
            255,
            BlendMode::SourceOver,
        );
        let b = Layer::new(
            context.handle(),
            Some(filter.clone()),
            255,
            BlendMode::SourceOver,
        );

        let composed_a = a.composed_color_filter().unwrap();
        let composed_b = b.composed_color_filter().unwrap();
        assert!(ColorFilter::ptr_eq(&composed_a, &filter));
        assert!(ColorFilter::ptr_eq(&composed_b, &filter));
    }
}
