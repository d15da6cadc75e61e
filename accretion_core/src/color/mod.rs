// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color filter composition and colorspace tagging.
//!
//! A layer's draw-time color correction is the product of two independent
//! inputs:
//!
//! - An explicit, caller-supplied [`ColorFilter`] (optional).
//! - A conversion implied by the content's [`Dataspace`] tag or an explicit
//!   [`ColorSpace`] profile, bringing content into the pipeline's working
//!   space (optional — absent when the content is already working-space).
//!
//! [`ColorPipeline`] folds the two into one effective filter, recomputed
//! eagerly on every mutation so readers on the render thread never observe a
//! stale value.
//!
//! # Composition order
//!
//! The colorspace conversion always runs **first**, then the explicit filter:
//! content is brought into the working space before user correction is
//! applied. This order is a fixed constant of the pipeline, not a per-call
//! decision.

mod dataspace;
mod filter;
mod pipeline;
mod space;

pub use dataspace::Dataspace;
pub use filter::ColorFilter;
pub use pipeline::ColorPipeline;
pub use space::{ColorSpace, Primaries, TransferFunction};
