// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`Player`] wired to the browser's event and frame loops.
//!
//! [`WebTransition`] starts a transition and keeps it moving without the
//! caller pumping anything: `animationend` listeners on both clones finish
//! keyframe playback, and a [`RafLoop`] ticks timer playback. Dropping the
//! handle tears the transition down.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::ops::ControlFlow;

use morph_core::player::{Player, PlayerState, Strategy, Tick};
use morph_core::time::Duration;
use morph_core::transition::{TransitionError, TransitionOptions, transition};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, Node};

use crate::host::WebHost;
use crate::raf::RafLoop;

const ANIMATION_END: &str = "animationend";

type Listener = Closure<dyn FnMut(Event)>;

struct Inner {
    host: WebHost,
    player: Player<WebHost>,
}

/// A running transition in the browser.
pub struct WebTransition {
    inner: Rc<RefCell<Inner>>,
    raf: RafLoop,
    listeners: Vec<(Node, Listener)>,
}

impl WebTransition {
    /// Starts a transition from `from` to `to` (see
    /// [`morph_core::transition::transition`]).
    ///
    /// The completion callback in `options` runs from inside an event or
    /// frame callback and must not call back into this handle.
    ///
    /// # Errors
    ///
    /// Any [`TransitionError`].
    pub fn start(
        host: &WebHost,
        from: &Node,
        to: &Node,
        options: impl Into<TransitionOptions>,
    ) -> Result<Self, TransitionError> {
        let mut host = host.clone();
        let player = transition(&mut host, from, to, options)?;
        let inner = Rc::new(RefCell::new(Inner { host, player }));

        let weak = Rc::downgrade(&inner);
        let raf = RafLoop::new(move |_| frame(&weak));

        let mut this = Self {
            inner,
            raf,
            listeners: Vec::new(),
        };
        this.listen();
        this.sync_loop();
        Ok(this)
    }

    /// Resumes playback.
    pub fn play(&self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            let Inner { host, player } = &mut *inner;
            player.play(host);
        }
        self.sync_loop();
    }

    /// Pauses playback, keeping the clones where they are.
    pub fn pause(&self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            let Inner { host, player } = &mut *inner;
            player.pause(host);
        }
        self.raf.stop();
    }

    /// Pauses and jumps to linear progress `pos` in `[0, 1]`.
    pub fn goto(&self, pos: f64) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            let Inner { host, player } = &mut *inner;
            player.goto(host, pos);
        }
        self.raf.stop();
    }

    /// Removes both clones and stops all callbacks. Idempotent.
    pub fn teardown(&mut self) {
        self.raf.stop();
        self.unlisten();
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            let Inner { host, player } = &mut *inner;
            player.teardown(host);
        }
    }

    /// Current player state.
    ///
    /// `None` when called from inside this transition's own callbacks, while
    /// the player is borrowed. The same holds for [`strategy`](Self::strategy)
    /// and [`remaining`](Self::remaining).
    #[must_use]
    pub fn state(&self) -> Option<PlayerState> {
        peek(&self.inner, |inner| inner.player.state())
    }

    /// Playback strategy in use.
    #[must_use]
    pub fn strategy(&self) -> Option<Strategy> {
        peek(&self.inner, |inner| inner.player.strategy())
    }

    /// Time left as of the last pause.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        peek(&self.inner, |inner| inner.player.remaining())
    }

    fn listen(&mut self) {
        let clones: Vec<Node> = {
            let inner = self.inner.borrow();
            if inner.player.strategy() != Strategy::Keyframes {
                return;
            }
            [inner.player.from_proxy(), inner.player.to_proxy()]
                .into_iter()
                .map(|proxy| proxy.clone_node().clone())
                .collect()
        };
        for node in clones {
            let weak = Rc::downgrade(&self.inner);
            let listener: Listener = Closure::wrap(Box::new(move |event: Event| {
                animation_ended(&weak, &event);
            }) as Box<dyn FnMut(Event)>);
            let _ = node
                .add_event_listener_with_callback(ANIMATION_END, listener.as_ref().unchecked_ref());
            self.listeners.push((node, listener));
        }
    }

    fn unlisten(&mut self) {
        for (node, listener) in self.listeners.drain(..) {
            let _ = node.remove_event_listener_with_callback(
                ANIMATION_END,
                listener.as_ref().unchecked_ref(),
            );
        }
    }

    /// Runs the frame loop only while a timer-driven player is playing.
    fn sync_loop(&self) {
        let timer_running = self.inner.try_borrow().is_ok_and(|inner| {
            inner.player.strategy() == Strategy::Timer && inner.player.is_running()
        });
        if timer_running {
            self.raf.start();
        } else {
            self.raf.stop();
        }
    }
}

/// Reads through a shared cell unless it is mutably borrowed.
fn peek<S, T>(cell: &RefCell<S>, read: impl FnOnce(&S) -> T) -> Option<T> {
    cell.try_borrow().ok().map(|value| read(&value))
}

fn frame(inner: &Weak<RefCell<Inner>>) -> ControlFlow<()> {
    let Some(inner) = inner.upgrade() else {
        return ControlFlow::Break(());
    };
    let Ok(mut inner) = inner.try_borrow_mut() else {
        return ControlFlow::Continue(());
    };
    let Inner { host, player } = &mut *inner;
    match player.tick(host) {
        Tick::Continue => ControlFlow::Continue(()),
        Tick::Finished | Tick::Idle => ControlFlow::Break(()),
    }
}

fn animation_ended(inner: &Weak<RefCell<Inner>>, event: &Event) {
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
        return;
    };
    let Some(inner) = inner.upgrade() else {
        return;
    };
    if let Ok(mut inner) = inner.try_borrow_mut() {
        let Inner { host, player } = &mut *inner;
        player.animation_ended(host, &target);
    }
}

impl Drop for WebTransition {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl core::fmt::Debug for WebTransition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebTransition")
            .field("state", &self.state())
            .field("strategy", &self.strategy())
            .field("raf", &self.raf)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
