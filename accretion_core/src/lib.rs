// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer state, color pipeline, and GPU memory accounting for compositing.
//!
//! `accretion_core` provides the state-management half of a GPU compositing
//! layer: blend and sampling state, independent texture and geometry
//! transforms, eager color filter composition, per-layer GPU memory
//! attribution, and thread-safe deferred release. Drawing, texture upload,
//! and final-frame composition are the host renderer's concern and consume
//! this crate through plain in-process interfaces.
//!
//! # Architecture
//!
//! ```text
//!   producer thread(s)                     owning (render) thread
//!        │                                        │
//!        │  ContextHandle::post ──────────────►  RenderContext::run_tasks
//!        │  Layer::post_dec_strong (deferred)     │
//!        │                                        ▼
//!        │                              Layer setters / teardown
//!        │                                        │
//!        ▼                                        ▼
//!   ColorFilter / LayerImage  (shared)    MemoryTracker (attribution)
//! ```
//!
//! **[`layer`]** — The [`Layer`](layer::Layer) aggregate: geometry, blend,
//! opacity, transforms, backing image, and the release contract. The one
//! thread-safe operation is [`Layer::post_dec_strong`](layer::Layer::post_dec_strong),
//! which routes a reference release to the owning thread so GPU-resource
//! teardown never runs elsewhere.
//!
//! **[`color`]** — [`ColorPipeline`](color::ColorPipeline) folds an explicit
//! [`ColorFilter`](color::ColorFilter) and the conversion implied by a
//! [`Dataspace`](color::Dataspace) tag (or explicit
//! [`ColorSpace`](color::ColorSpace) profile) into one effective filter,
//! recomputed eagerly on mutation.
//!
//! **[`memory`]** — The injected [`MemoryTracker`](memory::MemoryTracker)
//! interface and the default [`MemoryLedger`](memory::MemoryLedger): live
//! layers report their backing image's byte footprint for global
//! budget/eviction decisions.
//!
//! **[`context`]** — [`RenderContext`](context::RenderContext) pins the
//! owning thread's identity and consumes the deferred-task queue;
//! [`ContextHandle`](context::ContextHandle) is the clonable sender side.
//!
//! **[`image`]** — Opaque [`LayerImage`](image::LayerImage) handles to
//! GPU-resident content; dimensions and format drive attribution only.
//!
//! **[`transform`]** — Column-major 3×3 projective
//! [`Transform2d`](transform::Transform2d) for texture and geometry mapping.

pub mod color;
pub mod context;
pub mod image;
pub mod layer;
pub mod memory;
pub mod transform;
