// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2-D affine matrix algebra.
//!
//! Matrices are [`kurbo::Affine`] values with coefficients `[a, b, c, d, e, f]`
//! mapping `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`. Composition follows
//! nested coordinate systems: `multiply(parent, child)` applies `child`
//! first, so an ancestor chain is folded by left-multiplying each outer
//! matrix.
//!
//! [`decompose`] splits a matrix into the components CSS composes as
//! `translate() rotate() skewX() scale()`, which interpolate far better than
//! raw matrix entries.

use core::f64::consts::{PI, TAU};
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Vec2};

/// The identity matrix `[1, 0, 0, 1, 0, 0]`.
pub const IDENTITY: Affine = Affine::IDENTITY;

/// Composes two matrices: the result applies `m2` first, then `m1`.
#[inline]
#[must_use]
pub fn multiply(m1: Affine, m2: Affine) -> Affine {
    m1 * m2
}

/// Inverts a matrix using the closed form over its determinant `a·d - c·b`.
///
/// Returns `None` when the determinant is zero or not finite.
#[must_use]
pub fn invert(m: Affine) -> Option<Affine> {
    let [a, b, c, d, e, f] = m.as_coeffs();
    let det = a * d - c * b;
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    Some(Affine::new([
        d / det,
        -b / det,
        -c / det,
        a / det,
        (c * f - e * d) / det,
        (e * b - a * f) / det,
    ]))
}

/// Wraps an angle in radians into `(-π, π]`.
#[must_use]
pub fn normalize_angle(radians: f64) -> f64 {
    if !radians.is_finite() {
        return radians;
    }
    let mut r = radians % TAU;
    if r > PI {
        r -= TAU;
    } else if r <= -PI {
        r += TAU;
    }
    r
}

/// A matrix split into CSS-style components.
///
/// Re-synthesized as `translate · rotate · skewX · scale` by
/// [`to_affine`](Self::to_affine).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    /// Rotation in radians, normalized to `(-π, π]`.
    pub rotate: f64,
    /// Horizontal scale (length of the first column).
    pub scale_x: f64,
    /// Vertical scale; negative for reflections.
    pub scale_y: f64,
    /// Horizontal skew angle in radians.
    pub skew_x: f64,
    /// Horizontal translation in px.
    pub translate_x: f64,
    /// Vertical translation in px.
    pub translate_y: f64,
}

impl Decomposed {
    /// Components of the identity matrix.
    pub const IDENTITY: Self = Self {
        rotate: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        skew_x: 0.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Recomposes the matrix `translate · rotate · skewX · scale`.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        let (sin, cos) = (self.rotate.sin(), self.rotate.cos());
        let shear = self.skew_x.sin() / self.skew_x.cos();
        Affine::translate((self.translate_x, self.translate_y))
            * Affine::new([cos, sin, -sin, cos, 0.0, 0.0])
            * Affine::new([1.0, 0.0, shear, 1.0, 0.0, 0.0])
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Interpolates every component linearly, except rotation, which takes
    /// the shorter way around the circle.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let turn = normalize_angle(other.rotate - self.rotate);
        Self {
            rotate: self.rotate + turn * t,
            scale_x: lerp(self.scale_x, other.scale_x, t),
            scale_y: lerp(self.scale_y, other.scale_y, t),
            skew_x: lerp(self.skew_x, other.skew_x, t),
            translate_x: lerp(self.translate_x, other.translate_x, t),
            translate_y: lerp(self.translate_y, other.translate_y, t),
        }
    }
}

impl fmt::Display for Decomposed {
    /// Formats as a CSS transform list.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) rotate({}rad) skewX({}rad) scale({}, {})",
            self.translate_x, self.translate_y, self.rotate, self.skew_x, self.scale_x, self.scale_y
        )
    }
}

/// Decomposes a matrix by deshearing its columns.
///
/// The first column yields `scale_x` and the rotation; projecting the second
/// column onto the normalized first gives the shear, and what remains gives
/// `scale_y`. Returns `None` for singular matrices, in which case callers
/// fall back to [`lerp_matrix`].
#[must_use]
pub fn decompose(m: Affine) -> Option<Decomposed> {
    let [a, b, c, d, e, f] = m.as_coeffs();
    let det = a * d - b * c;
    if det == 0.0 || !det.is_finite() {
        return None;
    }

    let scale_x = Vec2::new(a, b).hypot();
    let (a, b) = (a / scale_x, b / scale_x);

    let shear = a * c + b * d;
    let desheared = Vec2::new(c - a * shear, d - b * shear);
    let scale_y = if det < 0.0 {
        -desheared.hypot()
    } else {
        desheared.hypot()
    };
    let skew_x = (shear / scale_y).atan2(1.0);

    let angle = a.clamp(-1.0, 1.0).acos();
    let rotate = if b > 0.0 { angle } else { TAU - angle };

    Some(Decomposed {
        rotate: normalize_angle(rotate),
        scale_x,
        scale_y,
        skew_x,
        translate_x: e,
        translate_y: f,
    })
}

/// Interpolates the six matrix entries independently.
#[must_use]
pub fn lerp_matrix(from: Affine, to: Affine, t: f64) -> Affine {
    let a = from.as_coeffs();
    let b = to.as_coeffs();
    Affine::new(core::array::from_fn(|i| lerp(a[i], b[i], t)))
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Formats a matrix as a CSS `matrix(a, b, c, d, e, f)` function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CssMatrix(pub Affine);

impl fmt::Display for CssMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0.as_coeffs();
        write!(f, "matrix({a}, {b}, {c}, {d}, {e}, {g})")
    }
}
