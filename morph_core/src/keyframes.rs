// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `@keyframes` generation for native playback.
//!
//! The remaining part of a transition is sampled once per keyframe interval
//! (easing applied per sample, since the generated animation itself runs
//! with a linear timing function), followed by an exact `100%` frame at
//! `t = 1`. Each endpoint clone gets its own uniquely named rule set.

use alloc::format;
use alloc::string::String;
use core::fmt::Write as _;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::easing::Easing;
use crate::interpolate::{Frame, Interpolators, TransformFrame};
use crate::style::{CornerRadii, Rgba};
use crate::time::Duration;

static NEXT_SET: AtomicU32 = AtomicU32::new(1);

/// Shorter non-zero sampling intervals are raised to this.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Upper bound on samples per rule, not counting the final frame.
pub const MAX_SAMPLES: u32 = 1_000;

/// Generated animation names and the stylesheet defining them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyframeSet {
    /// Animation name for the `from` clone.
    pub from_name: String,
    /// Animation name for the `to` clone.
    pub to_name: String,
    /// Both `@keyframes` rules.
    pub css: String,
}

/// Samples the interpolators over the remaining part of a transition.
///
/// `remaining` is how much of `duration` is left to play. Samples are
/// `interval` apart in time and positioned relative to the remaining part,
/// so that a resumed transition continues from where it was paused. A zero
/// `duration`, `remaining` or `interval` yields only the final frame.
///
/// The interval is at least [`MIN_INTERVAL`] and at most [`MAX_SAMPLES`]
/// samples are taken; long transitions sample more sparsely instead.
#[must_use]
pub fn generate(
    interpolators: &Interpolators,
    easing: &Easing,
    remaining: Duration,
    duration: Duration,
    interval: Duration,
) -> KeyframeSet {
    let span = if duration.is_zero() {
        0.0
    } else {
        remaining.as_millis_f64() / duration.as_millis_f64()
    };
    let start = 1.0 - span;
    let frames = if interval.is_zero() {
        0.0
    } else {
        let interval = interval.as_millis_f64().max(MIN_INTERVAL.as_millis_f64());
        (remaining.as_millis_f64() / interval).min(f64::from(MAX_SAMPLES))
    };

    let mut from = String::new();
    let mut to = String::new();
    let mut push = |percent: f64, t: f64| {
        let frame = interpolators.sample(t);
        push_frame(&mut from, percent, &frame, Side::From);
        push_frame(&mut to, percent, &frame, Side::To);
    };

    let mut i = 0_u32;
    while f64::from(i) < frames {
        let relative = f64::from(i) / frames;
        push(100.0 * relative, easing.apply(start + span * relative));
        i += 1;
    }
    push(100.0, 1.0);

    let id = NEXT_SET.fetch_add(1, Ordering::Relaxed);
    let from_name = format!("morph-{id}-from");
    let to_name = format!("morph-{id}-to");
    let css = format!("@keyframes {from_name} {{{from}\n}}\n@keyframes {to_name} {{{to}\n}}\n");
    KeyframeSet {
        from_name,
        to_name,
        css,
    }
}

#[derive(Clone, Copy)]
enum Side {
    From,
    To,
}

impl Side {
    fn pick<T>(self, from: T, to: T) -> T {
        match self {
            Self::From => from,
            Self::To => to,
        }
    }
}

fn push_frame(out: &mut String, percent: f64, frame: &Frame, side: Side) {
    let opacity = side.pick(frame.opacity.from, frame.opacity.to);
    let transform: TransformFrame = side.pick(frame.transform.from, frame.transform.to);
    let _ = write!(out, "\n{percent}% {{opacity: {opacity};transform: {transform};");
    if let Some(colors) = frame.background_color {
        let color: Rgba = side.pick(colors.from, colors.to);
        let _ = write!(out, "background-color: {color};");
    }
    if let Some(radii) = frame.border_radius {
        let radius: CornerRadii = side.pick(radii.from, radii.to);
        let _ = write!(out, "border-radius: {radius};");
    }
    out.push('}');
}
