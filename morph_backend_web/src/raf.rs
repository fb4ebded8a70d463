// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` frame source.
//!
//! [`RafLoop`] calls a frame callback once per animation frame with the
//! frame's [`DOMHighResTimeStamp`][mdn] converted to a [`HostTime`]. The
//! callback decides whether another frame is wanted, so a timer-driven
//! transition can stop the loop from inside the frame that completes it.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp
//! [`HostTime`]: morph_core::time::HostTime

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, OnceCell, RefCell};
use core::ops::ControlFlow;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use morph_core::time::HostTime;

// Global bindings, so no Window/Performance lookup happens per frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type FrameCallback = Box<dyn FnMut(HostTime) -> ControlFlow<()>>;

/// A `requestAnimationFrame` loop.
///
/// Create with [`RafLoop::new`], then call [`start`](Self::start). A frame
/// is requested after every callback until the callback returns
/// [`ControlFlow::Break`], [`stop`](Self::stop) is called, or the `RafLoop`
/// is dropped.
pub struct RafLoop {
    state: Rc<FrameState>,
}

struct FrameState {
    /// JS trampoline handed to `requestAnimationFrame`, built on first start.
    trampoline: OnceCell<Closure<dyn FnMut(f64)>>,
    on_frame: RefCell<FrameCallback>,
    /// Request id of the frame we are waiting for, if any.
    pending: Cell<Option<i32>>,
    frames: Cell<u64>,
}

impl FrameState {
    fn request(&self) {
        if let Some(trampoline) = self.trampoline.get() {
            let id = request_animation_frame(trampoline.as_ref().unchecked_ref());
            self.pending.set(Some(id));
        }
    }

    fn fire(&self, timestamp_ms: f64) {
        // A frame cancelled after it was queued still arrives.
        if self.pending.take().is_none() {
            return;
        }
        self.frames.set(self.frames.get() + 1);
        let flow = (self.on_frame.borrow_mut())(HostTime::from_millis_f64(timestamp_ms));
        // The callback may have stopped or restarted the loop itself.
        if flow.is_continue() && self.pending.get().is_none() {
            self.request();
        }
    }
}

impl RafLoop {
    /// Creates a loop that is **not yet running**.
    pub fn new(on_frame: impl FnMut(HostTime) -> ControlFlow<()> + 'static) -> Self {
        Self {
            state: Rc::new(FrameState {
                trampoline: OnceCell::new(),
                on_frame: RefCell::new(Box::new(on_frame)),
                pending: Cell::new(None),
                frames: Cell::new(0),
            }),
        }
    }

    /// Requests the next frame. A no-op while already running.
    pub fn start(&self) {
        if self.is_running() {
            return;
        }
        self.state.trampoline.get_or_init(|| {
            let weak: Weak<FrameState> = Rc::downgrade(&self.state);
            Closure::wrap(Box::new(move |timestamp_ms: f64| {
                if let Some(state) = weak.upgrade() {
                    state.fire(timestamp_ms);
                }
            }) as Box<dyn FnMut(f64)>)
        });
        self.state.request();
    }

    /// Cancels the pending frame. Can be restarted with
    /// [`start`](Self::start).
    pub fn stop(&self) {
        if let Some(id) = self.state.pending.take() {
            cancel_animation_frame(id);
        }
    }

    /// Returns `true` while a frame is pending.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.pending.get().is_some()
    }

    /// Number of frames delivered so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.state.frames.get()
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafLoop")
            .field("pending", &self.state.pending.get())
            .field("frames", &self.state.frames.get())
            .finish_non_exhaustive()
    }
}
