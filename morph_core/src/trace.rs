// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for transitions.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! probe, the stacking comparator and the player call as a transition runs.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) — gates [`FrameEvent`] and
//!   [`TraceSink::on_frame`], emitted for every applied frame.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Rect;

use crate::player::Strategy;
use crate::stacking::StackingOrder;
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which side of a transition an event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// The node the transition starts from.
    From,
    /// The node the transition ends at.
    To,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after an endpoint has been measured.
#[derive(Clone, Copy, Debug)]
pub struct CaptureEvent {
    /// Host time of the measurement.
    pub at: HostTime,
    /// Which endpoint was measured.
    pub endpoint: Endpoint,
    /// Naked layout box in client coordinates.
    pub bounding_box: Rect,
    /// Computed opacity.
    pub opacity: f64,
}

/// Emitted once the stacking order of the two endpoints is known.
#[derive(Clone, Copy, Debug)]
pub struct CompareEvent {
    /// Host time of the comparison.
    pub at: HostTime,
    /// Whether `from` renders above `to`.
    pub order: StackingOrder,
}

/// Emitted when playback starts or resumes.
#[derive(Clone, Copy, Debug)]
pub struct PlayEvent {
    /// Host time playback started.
    pub at: HostTime,
    /// Time left to run.
    pub remaining: Duration,
    /// How frames are produced.
    pub strategy: Strategy,
}

/// Emitted when playback is paused (including by `goto`).
#[derive(Clone, Copy, Debug)]
pub struct PauseEvent {
    /// Host time of the pause.
    pub at: HostTime,
    /// Time that was left when paused.
    pub remaining: Duration,
}

/// Emitted for every frame the player writes to the clones.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct FrameEvent {
    /// Host time of the frame.
    pub at: HostTime,
    /// Eased progress, 0 to 1.
    pub t: f64,
    /// Opacity written to the `from` clone.
    pub opacity_from: f64,
    /// Opacity written to the `to` clone.
    pub opacity_to: f64,
}

/// Emitted when a transition runs to completion.
#[derive(Clone, Copy, Debug)]
pub struct CompleteEvent {
    /// Host time of completion.
    pub at: HostTime,
}

/// Emitted when a player releases its clones.
#[derive(Clone, Copy, Debug)]
pub struct TeardownEvent {
    /// Host time of the teardown.
    pub at: HostTime,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a transition.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after each endpoint is measured.
    fn on_capture(&mut self, e: &CaptureEvent) {
        _ = e;
    }

    /// Called after the stacking comparison.
    fn on_compare(&mut self, e: &CompareEvent) {
        _ = e;
    }

    /// Called when playback starts or resumes.
    fn on_play(&mut self, e: &PlayEvent) {
        _ = e;
    }

    /// Called when playback pauses.
    fn on_pause(&mut self, e: &PauseEvent) {
        _ = e;
    }

    /// Called for every applied frame (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_frame(&mut self, e: &FrameEvent) {
        _ = e;
    }

    /// Called when a transition completes naturally.
    fn on_complete(&mut self, e: &CompleteEvent) {
        _ = e;
    }

    /// Called when a player tears down.
    fn on_teardown(&mut self, e: &TeardownEvent) {
        _ = e;
    }
}

/// Shares one sink between the caller and a transition that owns its sink
/// (see `TransitionOptions::sink`).
impl<S: TraceSink> TraceSink for Rc<RefCell<S>> {
    fn on_capture(&mut self, e: &CaptureEvent) {
        self.borrow_mut().on_capture(e);
    }

    fn on_compare(&mut self, e: &CompareEvent) {
        self.borrow_mut().on_compare(e);
    }

    fn on_play(&mut self, e: &PlayEvent) {
        self.borrow_mut().on_play(e);
    }

    fn on_pause(&mut self, e: &PauseEvent) {
        self.borrow_mut().on_pause(e);
    }

    #[cfg(feature = "trace-rich")]
    fn on_frame(&mut self, e: &FrameEvent) {
        self.borrow_mut().on_frame(e);
    }

    fn on_complete(&mut self, e: &CompleteEvent) {
        self.borrow_mut().on_complete(e);
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.borrow_mut().on_teardown(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer over an optional sink.
    #[inline]
    #[must_use]
    pub fn from_option(sink: Option<&'a mut dyn TraceSink>) -> Self {
        match sink {
            Some(sink) => Self::new(sink),
            None => Self::none(),
        }
    }

    /// Creates a tracer over an owned, optional sink.
    #[inline]
    #[must_use]
    pub fn from_boxed(sink: &'a mut Option<Box<dyn TraceSink>>) -> Self {
        match sink.as_deref_mut() {
            Some(sink) => Self::new(sink),
            None => Self::none(),
        }
    }

    /// Emits a [`CaptureEvent`].
    #[inline]
    pub fn capture(&mut self, e: &CaptureEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_capture(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CompareEvent`].
    #[inline]
    pub fn compare(&mut self, e: &CompareEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_compare(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PlayEvent`].
    #[inline]
    pub fn play(&mut self, e: &PlayEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_play(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PauseEvent`].
    #[inline]
    pub fn pause(&mut self, e: &PauseEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pause(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn frame(&mut self, e: &FrameEvent) {
        if let Some(s) = &mut self.sink {
            s.on_frame(e);
        }
    }

    /// Emits a [`CompleteEvent`].
    #[inline]
    pub fn complete(&mut self, e: &CompleteEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_complete(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TeardownEvent`].
    #[inline]
    pub fn teardown(&mut self, e: &TeardownEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_teardown(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_play() -> PlayEvent {
        PlayEvent {
            at: HostTime(1_000),
            remaining: Duration::from_millis(400),
            strategy: Strategy::Timer,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_play(&sample_play());
        sink.on_compare(&CompareEvent {
            at: HostTime(0),
            order: StackingOrder::Above,
        });
        sink.on_teardown(&TeardownEvent { at: HostTime(0) });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.play(&sample_play());
        tracer.complete(&CompleteEvent { at: HostTime(5) });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            plays: Vec<Duration>,
            pauses: Vec<Duration>,
        }
        impl TraceSink for RecordingSink {
            fn on_play(&mut self, e: &PlayEvent) {
                self.plays.push(e.remaining);
            }
            fn on_pause(&mut self, e: &PauseEvent) {
                self.pauses.push(e.remaining);
            }
        }

        let mut sink = RecordingSink {
            plays: Vec::new(),
            pauses: Vec::new(),
        };
        let mut tracer = Tracer::from_option(Some(&mut sink));
        tracer.play(&sample_play());
        tracer.pause(&PauseEvent {
            at: HostTime(2_000),
            remaining: Duration::from_millis(399),
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.plays, &[Duration::from_millis(400)]);
        assert_eq!(sink.pauses, &[Duration::from_millis(399)]);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn shared_sinks_forward_events() {
        #[derive(Default)]
        struct Counter(usize);
        impl TraceSink for Counter {
            fn on_complete(&mut self, _: &CompleteEvent) {
                self.0 += 1;
            }
        }

        let shared = Rc::new(RefCell::new(Counter::default()));
        let mut owned: Option<Box<dyn TraceSink>> = Some(Box::new(shared.clone()));
        let mut tracer = Tracer::from_boxed(&mut owned);
        tracer.complete(&CompleteEvent { at: HostTime(1) });
        tracer.complete(&CompleteEvent { at: HostTime(2) });
        drop(tracer);
        assert_eq!(shared.borrow().0, 2, "both events reach the shared sink");
    }
}
