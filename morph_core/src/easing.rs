// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves mapping linear progress to eased progress.

use alloc::rc::Rc;
use core::fmt;

/// A timing curve over `[0, 1]`.
///
/// The built-in curves are cubic polynomials; [`Easing::Custom`] accepts any
/// function.
#[derive(Clone, Default)]
pub enum Easing {
    /// `t`
    #[default]
    Linear,
    /// `t³`
    EaseIn,
    /// `(t − 1)³ + 1`
    EaseOut,
    /// `t³` mirrored about the midpoint.
    EaseInOut,
    /// A caller-supplied curve.
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Easing {
    /// Wraps a function as an easing curve.
    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }

    /// Evaluates the curve at `t`.
    #[must_use]
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Self::Linear => linear(t),
            Self::EaseIn => ease_in(t),
            Self::EaseOut => ease_out(t),
            Self::EaseInOut => ease_in_out(t),
            Self::Custom(f) => f(t),
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("Linear"),
            Self::EaseIn => f.write_str("EaseIn"),
            Self::EaseOut => f.write_str("EaseOut"),
            Self::EaseInOut => f.write_str("EaseInOut"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Identity curve.
#[inline]
#[must_use]
pub fn linear(t: f64) -> f64 {
    t
}

/// Cubic ease-in.
#[inline]
#[must_use]
pub fn ease_in(t: f64) -> f64 {
    t * t * t
}

/// Cubic ease-out.
#[inline]
#[must_use]
pub fn ease_out(t: f64) -> f64 {
    let u = t - 1.0;
    u * u * u + 1.0
}

/// Cubic ease-in-out, split at `0.5`.
#[must_use]
pub fn ease_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t < 1.0 {
        0.5 * t * t * t
    } else {
        let u = t - 2.0;
        0.5 * (u * u * u + 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn curves_are_anchored_at_both_ends() {
        for easing in [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
        ] {
            assert!(easing.apply(0.0).abs() < EPS, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < EPS, "{easing:?} at 1");
        }
    }

    #[test]
    fn cubic_values() {
        assert!((ease_in(0.5) - 0.125).abs() < EPS);
        assert!((ease_out(0.5) - 0.875).abs() < EPS);
        assert!((ease_in_out(0.25) - 0.0625).abs() < EPS);
        assert!((ease_in_out(0.5) - 0.5).abs() < EPS);
        assert!((ease_in_out(0.75) - 0.9375).abs() < EPS);
    }

    #[test]
    fn custom_curves_are_called() {
        let easing = Easing::custom(|t| t * t);
        assert!((easing.apply(0.5) - 0.25).abs() < EPS);
        assert_eq!(alloc::format!("{easing:?}"), "Custom(..)");
    }

    #[test]
    fn default_is_linear() {
        assert!((Easing::default().apply(0.3) - 0.3).abs() < EPS);
    }
}
