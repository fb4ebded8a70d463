// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-channel interpolators between two snapshots.
//!
//! Every interpolator produces a [`Pair`]: the value for the clone of the
//! `from` node and the value for the clone of the `to` node. Both clones are
//! visible for the whole transition, stacked in their original paint order,
//! so the channels are computed so that the *composite* looks like a single
//! element morphing:
//!
//! - **Opacity** — the upper clone's alpha is chosen so that `upper over
//!   lower` equals the linearly interpolated target opacity.
//! - **Background color** — each clone keeps its own RGB; alphas follow the
//!   opacity rule.
//! - **Border radius** — each clone's radii are rescaled into its own box so
//!   the visible curvature matches the other endpoint at the far end.
//! - **Transform** — the `from` clone moves from its own transform to a
//!   matrix that lands it exactly on the `to` box; the `to` clone does the
//!   mirror image, sampled at `1 − t`.

use core::fmt;

use kurbo::{Affine, Size, Vec2};

use crate::probe::Snapshot;
use crate::stacking::StackingOrder;
use crate::style::{CornerRadii, Rgba};
use crate::transform::{CssMatrix, Decomposed, decompose, lerp_matrix};

/// A value for each clone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pair<T> {
    /// Applied to the clone of the `from` node.
    pub from: T,
    /// Applied to the clone of the `to` node.
    pub to: T,
}

/// Opacity pair whose alpha composite equals a linear blend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacityInterpolator {
    from: f64,
    to: f64,
    order: StackingOrder,
}

impl OpacityInterpolator {
    /// `order` is the stacking order of `from` relative to `to`.
    #[must_use]
    pub const fn new(from: f64, to: f64, order: StackingOrder) -> Self {
        Self { from, to, order }
    }

    /// Samples the pair at progress `t`.
    ///
    /// For a target `T = from + t·(to − from)` the pair is
    /// `from' = T − t²·T`, `to' = (T − from') / (1 − from')`. A fully opaque
    /// target has no solution of that form and fades the upper clone
    /// linearly instead.
    #[must_use]
    pub fn at(&self, t: f64) -> Pair<f64> {
        let target = self.from + t * (self.to - self.from);
        if target == 1.0 {
            return match self.order {
                StackingOrder::Above => Pair {
                    from: 1.0 - t,
                    to: 1.0,
                },
                StackingOrder::Below => Pair { from: 1.0, to: t },
            };
        }
        let from = target - t * t * target;
        Pair {
            from,
            to: (target - from) / (1.0 - from),
        }
    }
}

/// Background colors whose alphas follow the opacity rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RgbaInterpolator {
    from: Rgba,
    to: Rgba,
    alpha: OpacityInterpolator,
}

impl RgbaInterpolator {
    /// Returns `None` when both colors are opaque, since there is nothing to
    /// blend.
    #[must_use]
    pub fn new(from: Rgba, to: Rgba, order: StackingOrder) -> Option<Self> {
        if from.alpha == 1.0 && to.alpha == 1.0 {
            return None;
        }
        Some(Self {
            from,
            to,
            alpha: OpacityInterpolator::new(from.alpha, to.alpha, order),
        })
    }

    /// Samples the pair at progress `t`.
    #[must_use]
    pub fn at(&self, t: f64) -> Pair<Rgba> {
        let alpha = self.alpha.at(t);
        Pair {
            from: self.from.with_alpha(alpha.from),
            to: self.to.with_alpha(alpha.to),
        }
    }
}

/// Corner radii for both clones, each expressed in its own box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderRadiusInterpolator {
    from: Pair<CornerRadii>,
    to: Pair<CornerRadii>,
}

impl BorderRadiusInterpolator {
    /// Builds the interpolator from two snapshots' radii and box sizes.
    #[must_use]
    pub fn new<N>(a: &Snapshot<N>, b: &Snapshot<N>) -> Self {
        let a_size = a.bounding_box.size();
        let b_size = b.bounding_box.size();
        Self {
            from: Pair {
                from: a.border_radius,
                to: rescale(&b.border_radius, a_size, b_size),
            },
            to: Pair {
                from: rescale(&a.border_radius, b_size, a_size),
                to: b.border_radius,
            },
        }
    }

    /// Samples the pair at progress `t`.
    #[must_use]
    pub fn at(&self, t: f64) -> Pair<CornerRadii> {
        Pair {
            from: lerp_radii(&self.from.from, &self.from.to, t),
            to: lerp_radii(&self.to.from, &self.to.to, t),
        }
    }
}

/// Scales radii measured in a box of size `den` into a box of size `num`.
/// Zero-sized dimensions leave radii unscaled.
fn rescale(radii: &CornerRadii, num: Size, den: Size) -> CornerRadii {
    let factor = |n: f64, d: f64| if d == 0.0 { 1.0 } else { n / d };
    let fx = factor(num.width, den.width);
    let fy = factor(num.height, den.height);
    CornerRadii::from_arrays(radii.xs().map(|x| x * fx), radii.ys().map(|y| y * fy))
}

fn lerp_radii(a: &CornerRadii, b: &CornerRadii, t: f64) -> CornerRadii {
    let (ax, ay, bx, by) = (a.xs(), a.ys(), b.xs(), b.ys());
    CornerRadii::from_arrays(
        core::array::from_fn(|i| ax[i] + t * (bx[i] - ax[i])),
        core::array::from_fn(|i| ay[i] + t * (by[i] - ay[i])),
    )
}

/// One sampled transform, in the form it was interpolated in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformFrame {
    /// Component-wise interpolation.
    Components(Decomposed),
    /// Raw matrix-entry interpolation (an endpoint was singular).
    Matrix(Affine),
}

impl TransformFrame {
    /// The equivalent matrix.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        match self {
            Self::Components(parts) => parts.to_affine(),
            Self::Matrix(m) => *m,
        }
    }
}

impl fmt::Display for TransformFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Components(parts) => fmt::Display::fmt(parts, f),
            Self::Matrix(m) => fmt::Display::fmt(&CssMatrix(*m), f),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TransformPath {
    Components(Decomposed, Decomposed),
    Matrix(Affine, Affine),
}

/// Moves one clone from its own transform onto the other endpoint's box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformInterpolator {
    path: TransformPath,
}

impl TransformInterpolator {
    /// Builds the path for a clone of `a` travelling to `b`.
    ///
    /// The end matrix is `a.inverted_parent_ctm · translate(b − a) · b.ctm ·
    /// scale(b.size / a.size)`: it undoes `a`'s ancestors, moves to `b`'s
    /// box, applies `b`'s full transform and stretches `a`'s box to `b`'s
    /// size. A zero-sized dimension of `a` is not stretched.
    #[must_use]
    pub fn new<N>(a: &Snapshot<N>, b: &Snapshot<N>) -> Self {
        let (ra, rb) = (a.bounding_box, b.bounding_box);
        let ratio = |n: f64, d: f64| if d == 0.0 { 1.0 } else { n / d };
        let scale = Affine::scale_non_uniform(
            ratio(rb.width(), ra.width()),
            ratio(rb.height(), ra.height()),
        );
        let offset = Vec2::new(rb.x0 - ra.x0, rb.y0 - ra.y0);
        let end = a.inverted_parent_ctm * Affine::translate(offset) * b.ctm * scale;
        let start = a.transform;

        let path = match (decompose(start), decompose(end)) {
            (Some(s), Some(e)) => TransformPath::Components(s, e),
            _ => TransformPath::Matrix(start, end),
        };
        Self { path }
    }

    /// Samples the transform at progress `t`.
    #[must_use]
    pub fn at(&self, t: f64) -> TransformFrame {
        match self.path {
            TransformPath::Components(s, e) => TransformFrame::Components(s.lerp(&e, t)),
            TransformPath::Matrix(s, e) => TransformFrame::Matrix(lerp_matrix(s, e, t)),
        }
    }

    /// Returns `true` if an endpoint was singular and entries are blended
    /// directly.
    #[must_use]
    pub fn is_matrix_fallback(&self) -> bool {
        matches!(self.path, TransformPath::Matrix(..))
    }
}

/// Every channel of one sampled frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Clone opacities.
    pub opacity: Pair<f64>,
    /// Clone transforms.
    pub transform: Pair<TransformFrame>,
    /// Clone background colors, when interpolated.
    pub background_color: Option<Pair<Rgba>>,
    /// Clone corner radii, when interpolated.
    pub border_radius: Option<Pair<CornerRadii>>,
}

/// All interpolators for one transition.
#[derive(Clone, Debug)]
pub struct Interpolators {
    /// Opacity channel.
    pub opacity: OpacityInterpolator,
    /// Background channel, if requested and not fully opaque.
    pub background_color: Option<RgbaInterpolator>,
    /// Border radius channel, if requested.
    pub border_radius: Option<BorderRadiusInterpolator>,
    /// Transform of the `from` clone.
    pub transform_from: TransformInterpolator,
    /// Transform of the `to` clone, sampled at `1 − t`.
    pub transform_to: TransformInterpolator,
}

impl Interpolators {
    /// Builds every channel from the two snapshots and their stacking order.
    #[must_use]
    pub fn new<N>(
        from: &Snapshot<N>,
        to: &Snapshot<N>,
        order: StackingOrder,
        background_color: bool,
        border_radius: bool,
    ) -> Self {
        let background_color = match (background_color, from.background_color, to.background_color) {
            (true, Some(a), Some(b)) => RgbaInterpolator::new(a, b, order),
            _ => None,
        };
        Self {
            opacity: OpacityInterpolator::new(from.opacity, to.opacity, order),
            background_color,
            border_radius: border_radius.then(|| BorderRadiusInterpolator::new(from, to)),
            transform_from: TransformInterpolator::new(from, to),
            transform_to: TransformInterpolator::new(to, from),
        }
    }

    /// Samples every channel at eased progress `t`.
    #[must_use]
    pub fn sample(&self, t: f64) -> Frame {
        Frame {
            opacity: self.opacity.at(t),
            transform: Pair {
                from: self.transform_from.at(t),
                to: self.transform_to.at(1.0 - t),
            },
            background_color: self.background_color.map(|i| i.at(t)),
            border_radius: self.border_radius.map(|i| i.at(t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use kurbo::{Point, Rect};

    use super::*;
    use crate::style::Radius;
    use crate::transform::IDENTITY;

    const EPS: f64 = 1e-9;

    fn snapshot(rect: Rect) -> Snapshot<()> {
        Snapshot {
            node: (),
            bounding_box: rect,
            transform: IDENTITY,
            ctm: IDENTITY,
            inverted_parent_ctm: IDENTITY,
            opacity: 1.0,
            background_color: None,
            border_radius: CornerRadii::default(),
            margin: Vec2::ZERO,
        }
    }

    fn uniform(r: f64) -> CornerRadii {
        let corner = Radius { x: r, y: r };
        CornerRadii {
            top_left: corner,
            top_right: corner,
            bottom_right: corner,
            bottom_left: corner,
        }
    }

    #[test]
    fn opacity_endpoints() {
        let interp = OpacityInterpolator::new(0.4, 0.8, StackingOrder::Above);
        let start = interp.at(0.0);
        assert!((start.from - 0.4).abs() < EPS, "{start:?}");
        assert!(start.to.abs() < EPS, "{start:?}");

        let end = interp.at(1.0);
        // At t = 1 the lower layer is gone and the upper one carries the target.
        assert!(end.from.abs() < EPS, "{end:?}");
        assert!((end.to - 0.8).abs() < EPS, "{end:?}");
    }

    #[test]
    fn opacity_composite_is_linear() {
        let interp = OpacityInterpolator::new(0.3, 0.9, StackingOrder::Below);
        for i in 0..=20 {
            let t = f64::from(i) / 20.0;
            let Pair { from, to } = interp.at(t);
            let composite = from + to * (1.0 - from);
            let target = 0.3 + t * 0.6;
            assert!((composite - target).abs() < 1e-9, "t = {t}: {composite} vs {target}");
        }
    }

    #[test]
    fn opaque_target_fades_upper_layer() {
        let above = OpacityInterpolator::new(1.0, 1.0, StackingOrder::Above);
        assert_eq!(above.at(0.25), Pair { from: 0.75, to: 1.0 });
        let below = OpacityInterpolator::new(1.0, 1.0, StackingOrder::Below);
        assert_eq!(below.at(0.25), Pair { from: 1.0, to: 0.25 });
    }

    #[test]
    fn opaque_colors_are_not_interpolated() {
        let red = Rgba {
            r: 255.0,
            g: 0.0,
            b: 0.0,
            alpha: 1.0,
        };
        assert!(RgbaInterpolator::new(red, red, StackingOrder::Above).is_none());
    }

    #[test]
    fn colors_keep_their_own_rgb() {
        let red = Rgba {
            r: 255.0,
            g: 0.0,
            b: 0.0,
            alpha: 0.5,
        };
        let blue = Rgba {
            r: 0.0,
            g: 0.0,
            b: 255.0,
            alpha: 1.0,
        };
        let interp = RgbaInterpolator::new(red, blue, StackingOrder::Below).unwrap();
        let mid = interp.at(0.5);
        assert_eq!((mid.from.r, mid.from.b), (255.0, 0.0));
        assert_eq!((mid.to.r, mid.to.b), (0.0, 255.0));
        assert_eq!(interp.at(0.0).from.to_string(), "rgba(255,0,0,0.5)");
    }

    #[test]
    fn radius_between_identical_shapes_is_constant() {
        let mut a = snapshot(Rect::new(0.0, 0.0, 100.0, 50.0));
        a.border_radius = uniform(8.0);
        let interp = BorderRadiusInterpolator::new(&a, &a.clone());
        for t in [0.0, 0.3, 1.0] {
            let Pair { from, to } = interp.at(t);
            assert_eq!(from, uniform(8.0), "t = {t}");
            assert_eq!(to, uniform(8.0), "t = {t}");
        }
    }

    #[test]
    fn radius_rescales_into_each_box() {
        let a = snapshot(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut b = snapshot(Rect::new(0.0, 0.0, 200.0, 50.0));
        b.border_radius = uniform(10.0);
        let interp = BorderRadiusInterpolator::new(&a, &b);

        let end = interp.at(1.0);
        assert_eq!(end.from.top_left, Radius { x: 5.0, y: 20.0 });
        assert_eq!(end.to, uniform(10.0));
        assert_eq!(
            end.to.to_string(),
            "10px 10px 10px 10px / 10px 10px 10px 10px"
        );
        assert_eq!(interp.at(0.0).from, CornerRadii::default());
    }

    #[test]
    fn zero_sized_boxes_skip_rescaling() {
        let mut a = snapshot(Rect::new(0.0, 0.0, 0.0, 0.0));
        a.border_radius = uniform(4.0);
        let b = snapshot(Rect::new(0.0, 0.0, 10.0, 10.0));
        let interp = BorderRadiusInterpolator::new(&a, &b);
        assert_eq!(interp.at(0.0).to, uniform(4.0));
        let transform = TransformInterpolator::new(&a, &b);
        assert!(!transform.is_matrix_fallback());
    }

    #[test]
    fn transform_lands_on_other_box() {
        let a = snapshot(Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = snapshot(Rect::new(200.0, 50.0, 250.0, 250.0));
        let interp = TransformInterpolator::new(&a, &b);

        assert_eq!(interp.at(0.0).to_affine(), IDENTITY);
        let end = interp.at(1.0).to_affine();
        let mapped = end.transform_rect_bbox(Rect::new(0.0, 0.0, 100.0, 100.0));
        for (got, want) in [
            (mapped.x0, 200.0),
            (mapped.y0, 50.0),
            (mapped.x1, 250.0),
            (mapped.y1, 250.0),
        ] {
            assert!((got - want).abs() < EPS, "{mapped:?}");
        }
        assert_eq!(
            interp.at(1.0).to_string(),
            "translate(200px, 50px) rotate(0rad) skewX(0rad) scale(0.5, 2)"
        );
    }

    #[test]
    fn transform_respects_endpoint_rotation() {
        let a = snapshot(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut b = snapshot(Rect::new(0.0, 0.0, 100.0, 100.0));
        b.transform = Affine::rotate(0.5);
        b.ctm = b.transform;
        let end = TransformInterpolator::new(&a, &b).at(1.0);
        let TransformFrame::Components(parts) = end else {
            panic!("expected a decomposed path, got {end:?}");
        };
        assert!((parts.rotate - 0.5).abs() < EPS, "{parts:?}");
    }

    #[test]
    fn singular_endpoint_falls_back_to_matrix_lerp() {
        let mut a = snapshot(Rect::new(0.0, 0.0, 100.0, 100.0));
        a.transform = Affine::scale_non_uniform(0.0, 1.0);
        let b = snapshot(Rect::new(100.0, 0.0, 200.0, 100.0));
        let interp = TransformInterpolator::new(&a, &b);
        assert!(interp.is_matrix_fallback());
        let mid = interp.at(0.5);
        assert_eq!(mid.to_affine().as_coeffs(), [0.5, 0.0, 0.0, 1.0, 50.0, 0.0]);
        assert_eq!(mid.to_string(), "matrix(0.5, 0, 0, 1, 50, 0)");
    }

    #[test]
    fn to_clone_runs_backwards() {
        let a = snapshot(Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = snapshot(Rect::new(300.0, 0.0, 400.0, 100.0));
        let interps = Interpolators::new(&a, &b, StackingOrder::Below, true, true);
        assert!(interps.background_color.is_none(), "no colors captured");

        let start = interps.sample(0.0);
        let to_start = start.transform.to.to_affine() * Point::ORIGIN;
        assert!((to_start.x + 300.0).abs() < EPS, "{to_start:?}");

        let end = interps.sample(1.0);
        assert_eq!(end.transform.to.to_affine(), IDENTITY);
        assert_eq!(end.opacity, Pair { from: 1.0, to: 1.0 });
        assert!(end.border_radius.is_some());
    }
}
