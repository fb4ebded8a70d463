// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for morph.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`WebHost`]: the [`Host`] implementation over the live DOM
//! - [`RafLoop`]: `requestAnimationFrame` frame source for timer playback
//! - [`WebTransition`]: a transition driven by `animationend` events or the
//!   frame loop, torn down on drop
//! - [`hide`] / [`show`]: hiding the real endpoints while clones animate
//!
//! ```no_run
//! # fn demo(from: &web_sys::Node, to: &web_sys::Node) -> Option<()> {
//! use morph_backend_web::{WebHost, WebTransition, hide, show};
//!
//! let mut host = WebHost::new()?;
//! let pair = [from.clone(), to.clone()];
//! hide(&mut host, &pair);
//! let mut revealed = host.clone();
//! let to = to.clone();
//! let transition = WebTransition::start(&host, &pair[0], &pair[1], move || {
//!     show(&mut revealed, core::slice::from_ref(&to));
//! })
//! .ok()?;
//! # core::mem::forget(transition);
//! # Some(())
//! # }
//! ```

#![no_std]

extern crate alloc;

mod host;
mod raf;
mod transition;

pub use host::WebHost;
pub use morph_core::backend::Host;
pub use morph_core::visibility::{hide, show};
pub use raf::RafLoop;
pub use transition::WebTransition;

use morph_core::time::HostTime;

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(raf::performance_now())
}
