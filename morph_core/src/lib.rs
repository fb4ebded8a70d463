// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-element ("FLIP") transitions between two document nodes.
//!
//! `morph_core` measures two endpoints, decides which one paints on top,
//! inserts absolutely positioned clones of both over the page and animates
//! the clones so that their composite reads as one element morphing from
//! the first endpoint into the second. It is `no_std` compatible (with
//! `alloc`) and talks to the document only through the [`Host`] trait.
//!
//! [`Host`]: backend::Host
//!
//! # Architecture
//!
//! ```text
//!   from node        to node
//!       │               │
//!       ▼               ▼
//!   probe::capture() ─────► Snapshot ×2 ──► stacking::compare()
//!                               │                  │
//!                               ▼                  ▼
//!                        Interpolators ◄──── StackingOrder
//!                               │
//!   clone::Proxy ×2 ◄───────────┤
//!   (inserted in paint order)   ▼
//!                            Player ──► keyframes::generate() ──► @keyframes
//!                               │
//!                               └──► tick() per frame (timer strategy)
//! ```
//!
//! **[`transition`]** — The one-call entry point tying the pipeline
//! together, plus [`TransitionOptions`](transition::TransitionOptions).
//!
//! **[`probe`]** — Endpoint measurement into an immutable
//! [`Snapshot`](probe::Snapshot): naked box, own and cumulative transform,
//! opacity, background color, corner radii and margin.
//!
//! **[`stacking`]** — Paint-order comparison of two nodes by stacking
//! context and document order.
//!
//! **[`transform`]** — Affine helpers: multiplication, inversion,
//! decomposition and component-wise interpolation.
//!
//! **[`interpolate`]** — Per-channel interpolators for both clones.
//!
//! **[`easing`]** — Timing curves.
//!
//! **[`clone`]** — Deep clones with inlined computed styles and the
//! [`Proxy`](clone::Proxy) that places and styles them.
//!
//! **[`player`]** — Playback with play, pause, seek and teardown, over
//! native keyframes or a frame timer.
//!
//! **[`keyframes`]** — `@keyframes` sampling for native playback.
//!
//! **[`visibility`]** — Hiding the real endpoints while their clones run.
//!
//! **[`registry`]** — Id-keyed shared elements across mounts.
//!
//! **[`document`]** — An in-memory [`Host`] for headless use and tests.
//!
//! **[`style`]** — Parsers for the computed CSS values the engine reads.
//!
//! **[`time`]** — Host timestamps and durations.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates the per-frame
//!   event emitted every time the player applies a frame.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod clone;
pub mod document;
pub mod easing;
pub mod interpolate;
pub mod keyframes;
pub mod player;
pub mod probe;
pub mod registry;
pub mod stacking;
pub mod style;
pub mod time;
pub mod trace;
pub mod transform;
pub mod transition;
pub mod visibility;
