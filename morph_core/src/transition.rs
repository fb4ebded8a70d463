// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `transition` entry point and its configuration.

use alloc::boxed::Box;
use core::fmt;

use thiserror::Error;

use crate::backend::Host;
use crate::clone::{CloneError, Proxy};
use crate::easing::Easing;
use crate::interpolate::Interpolators;
use crate::player::Player;
use crate::probe::{ProbeError, Snapshot, capture};
use crate::stacking::{StackingError, StackingOrder, compare};
use crate::time::Duration;
use crate::trace::{CaptureEvent, CompareEvent, Endpoint, TraceSink, Tracer};

/// Default transition length.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(400);

/// Default spacing between generated keyframes.
pub const DEFAULT_KEYFRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Configuration for [`transition`].
///
/// Any `FnOnce()` closure converts into options that only set
/// [`done`](Self::done).
pub struct TransitionOptions {
    /// Total length. Zero shows the end state immediately.
    pub duration: Duration,
    /// Timing curve.
    pub easing: Easing,
    /// Produce frames from [`Player::tick`] even when the host runs
    /// keyframes natively.
    pub use_timer: bool,
    /// Blend background colors.
    pub interpolate_background_color: bool,
    /// Blend corner radii.
    pub interpolate_border_radius: bool,
    /// Spacing between generated keyframes.
    pub keyframe_interval: Duration,
    /// Called once when the transition completes. Not called on teardown.
    pub done: Option<Box<dyn FnOnce()>>,
    /// Receives trace events.
    pub sink: Option<Box<dyn TraceSink>>,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            easing: Easing::Linear,
            use_timer: false,
            interpolate_background_color: false,
            interpolate_border_radius: false,
            keyframe_interval: DEFAULT_KEYFRAME_INTERVAL,
            done: None,
            sink: None,
        }
    }
}

impl fmt::Debug for TransitionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionOptions")
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("use_timer", &self.use_timer)
            .field(
                "interpolate_background_color",
                &self.interpolate_background_color,
            )
            .field("interpolate_border_radius", &self.interpolate_border_radius)
            .field("keyframe_interval", &self.keyframe_interval)
            .field("done", &self.done.is_some())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl TransitionOptions {
    /// Sets the duration.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the easing curve.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Forces timer playback.
    #[must_use]
    pub fn with_timer(mut self, use_timer: bool) -> Self {
        self.use_timer = use_timer;
        self
    }

    /// Enables or disables background color blending.
    #[must_use]
    pub fn with_background_color(mut self, enabled: bool) -> Self {
        self.interpolate_background_color = enabled;
        self
    }

    /// Enables or disables corner radius blending.
    #[must_use]
    pub fn with_border_radius(mut self, enabled: bool) -> Self {
        self.interpolate_border_radius = enabled;
        self
    }

    /// Sets the keyframe spacing.
    #[must_use]
    pub fn with_keyframe_interval(mut self, interval: Duration) -> Self {
        self.keyframe_interval = interval;
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn with_done(mut self, done: impl FnOnce() + 'static) -> Self {
        self.done = Some(Box::new(done));
        self
    }

    /// Sets the trace sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }
}

impl<F: FnOnce() + 'static> From<F> for TransitionOptions {
    fn from(done: F) -> Self {
        Self::default().with_done(done)
    }
}

/// Why a transition could not start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The endpoints cannot be ordered.
    #[error(transparent)]
    Stacking(#[from] StackingError),
    /// An endpoint cannot be measured.
    #[error(transparent)]
    Probe(#[from] ProbeError),
    /// An endpoint cannot be cloned.
    #[error(transparent)]
    Cloning(#[from] CloneError),
}

/// Starts a transition from `from` to `to`.
///
/// Both endpoints are measured, cloned and the clones inserted on top of
/// them in the endpoints' paint order; the returned player is already
/// playing. Hiding the real endpoints is up to the caller (see
/// [`hide`](crate::visibility::hide)).
///
/// # Errors
///
/// Any [`TransitionError`]. Nothing is left in the document on error.
pub fn transition<H: Host>(
    host: &mut H,
    from: &H::Node,
    to: &H::Node,
    options: impl Into<TransitionOptions>,
) -> Result<Player<H>, TransitionError> {
    let mut options = options.into();
    let from_snapshot = capture(host, from)?;
    let to_snapshot = capture(host, to)?;
    let order = compare(&*host, from, to)?;

    let at = host.now();
    let mut tracer = Tracer::from_boxed(&mut options.sink);
    for (endpoint, snapshot) in [(Endpoint::From, &from_snapshot), (Endpoint::To, &to_snapshot)] {
        tracer.capture(&CaptureEvent {
            at,
            endpoint,
            bounding_box: snapshot.bounding_box,
            opacity: snapshot.opacity,
        });
    }
    tracer.compare(&CompareEvent { at, order });

    let interpolators = Interpolators::new(
        &from_snapshot,
        &to_snapshot,
        order,
        options.interpolate_background_color,
        options.interpolate_border_radius,
    );

    let mut from_proxy = Proxy::new(host, from)?;
    let mut to_proxy = Proxy::new(host, to)?;
    from_proxy.set_opacity(host, 1.0);
    to_proxy.set_opacity(host, 0.0);

    let from_pair = (&mut from_proxy, &from_snapshot);
    let to_pair = (&mut to_proxy, &to_snapshot);
    let inserted = match order {
        StackingOrder::Above => insert_pair(host, to_pair, from_pair),
        StackingOrder::Below => insert_pair(host, from_pair, to_pair),
    };
    if let Err(err) = inserted {
        from_proxy.detach(host);
        to_proxy.detach(host);
        return Err(err.into());
    }

    let mut player = Player::new(&*host, from_proxy, to_proxy, interpolators, options);
    player.play(host);
    Ok(player)
}

/// Inserts `first`, then `second` so that it paints on top.
fn insert_pair<H: Host>(
    host: &mut H,
    first: (&mut Proxy<H::Node>, &Snapshot<H::Node>),
    second: (&mut Proxy<H::Node>, &Snapshot<H::Node>),
) -> Result<(), CloneError> {
    first.0.insert(host, first.1)?;
    second.0.insert(host, second.1)
}
