// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for morph
//! diagnostics.
//!
//! This crate provides [`TraceSink`](morph_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`] — writes Chrome Trace Event Format JSON from
//!   recorded bytes.
//!
//! A transition owns its sink. To inspect a recording afterwards, share it
//! through `Rc<RefCell<_>>`, which is itself a sink:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use morph_core::transition::TransitionOptions;
//! use morph_debug::recorder::RecorderSink;
//!
//! let recorder = Rc::new(RefCell::new(RecorderSink::new()));
//! let options = TransitionOptions::default().with_sink(Rc::clone(&recorder));
//! # drop(options);
//! assert!(recorder.borrow().as_bytes().is_empty());
//! ```

pub mod chrome;
pub mod pretty;
pub mod recorder;
