// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parsers for the computed CSS values the engine reads.
//!
//! Every parser returns `None` on malformed input instead of failing; callers
//! decide the fallback. Only the serializations hosts produce for computed
//! styles are accepted (px lengths, `rgb()`/`rgba()` colors, transform
//! function lists), plus percentages for border radii.

use alloc::vec::Vec;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Size, Vec2};

/// An RGB color with alpha. Channels are 0–255, alpha is 0–1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha, 0 (transparent) to 1 (opaque).
    pub alpha: f64,
}

impl Rgba {
    /// Fully transparent black, the computed value of `transparent`.
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        alpha: 0.0,
    };

    /// Returns a copy with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.alpha)
    }
}

/// Parses `rgb(r, g, b)`, `rgba(r, g, b, a)` (comma or space separated) or
/// `transparent`.
#[must_use]
pub fn parse_color(s: &str) -> Option<Rgba> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("transparent") {
        return Some(Rgba::TRANSPARENT);
    }
    let body = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let mut parts = arguments(body).into_iter();
    let r = parts.next()?.parse().ok()?;
    let g = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    let alpha = match parts.next() {
        Some(a) => a.parse().ok()?,
        None => 1.0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Rgba { r, g, b, alpha })
}

/// One corner's elliptical radius in px.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Radius {
    /// Horizontal radius.
    pub x: f64,
    /// Vertical radius.
    pub y: f64,
}

/// The four corner radii of a box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerRadii {
    /// Top-left corner.
    pub top_left: Radius,
    /// Top-right corner.
    pub top_right: Radius,
    /// Bottom-right corner.
    pub bottom_right: Radius,
    /// Bottom-left corner.
    pub bottom_left: Radius,
}

impl CornerRadii {
    /// Builds radii from horizontal and vertical arrays in `tl, tr, br, bl`
    /// order.
    #[must_use]
    pub const fn from_arrays(xs: [f64; 4], ys: [f64; 4]) -> Self {
        Self {
            top_left: Radius { x: xs[0], y: ys[0] },
            top_right: Radius { x: xs[1], y: ys[1] },
            bottom_right: Radius { x: xs[2], y: ys[2] },
            bottom_left: Radius { x: xs[3], y: ys[3] },
        }
    }

    /// Horizontal radii in `tl, tr, br, bl` order.
    #[must_use]
    pub const fn xs(&self) -> [f64; 4] {
        [
            self.top_left.x,
            self.top_right.x,
            self.bottom_right.x,
            self.bottom_left.x,
        ]
    }

    /// Vertical radii in `tl, tr, br, bl` order.
    #[must_use]
    pub const fn ys(&self) -> [f64; 4] {
        [
            self.top_left.y,
            self.top_right.y,
            self.bottom_right.y,
            self.bottom_left.y,
        ]
    }
}

impl fmt::Display for CornerRadii {
    /// Formats as the `border-radius` shorthand with explicit vertical radii.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x0, x1, x2, x3] = self.xs();
        let [y0, y1, y2, y3] = self.ys();
        write!(
            f,
            "{x0}px {x1}px {x2}px {x3}px / {y0}px {y1}px {y2}px {y3}px"
        )
    }
}

/// Parses a single corner value such as `8px`, `8px 4px` or `50%`.
///
/// Percentages resolve against the box width (horizontal) and height
/// (vertical).
#[must_use]
pub fn parse_corner_radius(s: &str, size: Size) -> Option<Radius> {
    let mut tokens = s.split_whitespace();
    let first = tokens.next()?;
    let second = tokens.next();
    if tokens.next().is_some() {
        return None;
    }
    let x = parse_length_or_percent(first, size.width)?;
    let y = match second {
        Some(second) => parse_length_or_percent(second, size.height)?,
        None => match first.strip_suffix('%') {
            Some(_) => parse_length_or_percent(first, size.height)?,
            None => x,
        },
    };
    Some(Radius { x, y })
}

fn parse_length_or_percent(s: &str, basis: f64) -> Option<f64> {
    match s.strip_suffix('%') {
        Some(pct) => Some(pct.parse::<f64>().ok()? / 100.0 * basis),
        None => parse_px(s),
    }
}

/// Parses a px length (`12.5px`) or a bare number.
#[must_use]
pub fn parse_px(s: &str) -> Option<f64> {
    let s = s.trim();
    s.strip_suffix("px").unwrap_or(s).parse().ok()
}

/// Parses the longest numeric prefix, the way `parseFloat` does.
///
/// Leading whitespace is skipped; `"12px"` yields `12` and `"px"` yields
/// `None`.
#[must_use]
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}

/// Parses an angle in `deg`, `rad`, `grad` or `turn` (bare `0` allowed) into
/// radians.
#[must_use]
pub fn parse_angle(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Some(v) = s.strip_suffix("deg") {
        return Some(v.parse::<f64>().ok()?.to_radians());
    }
    if let Some(v) = s.strip_suffix("grad") {
        return Some(v.parse::<f64>().ok()? * core::f64::consts::PI / 200.0);
    }
    if let Some(v) = s.strip_suffix("rad") {
        return v.parse().ok();
    }
    if let Some(v) = s.strip_suffix("turn") {
        return Some(v.parse::<f64>().ok()? * core::f64::consts::TAU);
    }
    let v = s.parse::<f64>().ok()?;
    if v == 0.0 { Some(0.0) } else { None }
}

/// Parses a CSS transform list into a single matrix.
///
/// `none` and the empty string are the identity. Functions compose left to
/// right the way CSS applies them.
#[must_use]
pub fn parse_transform(s: &str) -> Option<Affine> {
    let s = s.trim();
    if s.is_empty() || s == "none" {
        return Some(Affine::IDENTITY);
    }
    let mut matrix = Affine::IDENTITY;
    let mut rest = s;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let open = rest.find('(')?;
        let close = open + rest[open..].find(')')?;
        let name = rest[..open].trim();
        let args = arguments(&rest[open + 1..close]);
        matrix = matrix * transform_function(name, &args)?;
        rest = &rest[close + 1..];
    }
    Some(matrix)
}

fn transform_function(name: &str, args: &[&str]) -> Option<Affine> {
    let m = match (name, args) {
        ("matrix", [a, b, c, d, e, f]) => Affine::new([
            a.parse().ok()?,
            b.parse().ok()?,
            c.parse().ok()?,
            d.parse().ok()?,
            e.parse().ok()?,
            f.parse().ok()?,
        ]),
        ("translate", [x]) => Affine::translate((parse_px(x)?, 0.0)),
        ("translate", [x, y]) => Affine::translate((parse_px(x)?, parse_px(y)?)),
        ("translateX", [x]) => Affine::translate((parse_px(x)?, 0.0)),
        ("translateY", [y]) => Affine::translate((0.0, parse_px(y)?)),
        ("scale", [s]) => Affine::scale(s.parse().ok()?),
        ("scale", [x, y]) => Affine::scale_non_uniform(x.parse().ok()?, y.parse().ok()?),
        ("scaleX", [x]) => Affine::scale_non_uniform(x.parse().ok()?, 1.0),
        ("scaleY", [y]) => Affine::scale_non_uniform(1.0, y.parse().ok()?),
        ("rotate", [a]) => Affine::rotate(parse_angle(a)?),
        ("skewX", [a]) => Affine::new([1.0, 0.0, tan(parse_angle(a)?), 1.0, 0.0, 0.0]),
        ("skewY", [a]) => Affine::new([1.0, tan(parse_angle(a)?), 0.0, 1.0, 0.0, 0.0]),
        ("skew", [ax]) => Affine::new([1.0, 0.0, tan(parse_angle(ax)?), 1.0, 0.0, 0.0]),
        ("skew", [ax, ay]) => Affine::new([
            1.0,
            tan(parse_angle(ay)?),
            tan(parse_angle(ax)?),
            1.0,
            0.0,
            0.0,
        ]),
        _ => return None,
    };
    Some(m)
}

fn tan(radians: f64) -> f64 {
    radians.sin() / radians.cos()
}

/// Parses a computed `transform-origin` (`"50px 25px"` or
/// `"50px 25px 0px"`) into an offset from the box's top-left corner.
#[must_use]
pub fn parse_origin(s: &str) -> Option<Vec2> {
    let mut tokens = s.split_whitespace();
    let x = parse_px(tokens.next()?)?;
    let y = match tokens.next() {
        Some(y) => parse_px(y)?,
        None => x,
    };
    Some(Vec2::new(x, y))
}

/// Splits a function argument list on commas, slashes and whitespace.
fn arguments(body: &str) -> Vec<&str> {
    body.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn colors() {
        assert_eq!(
            parse_color("rgb(255, 0, 10)"),
            Some(Rgba {
                r: 255.0,
                g: 0.0,
                b: 10.0,
                alpha: 1.0
            })
        );
        assert_eq!(
            parse_color("rgba(0, 0, 0, 0)"),
            Some(Rgba::TRANSPARENT),
            "zero alpha is a valid color"
        );
        assert_eq!(parse_color("rgba(1, 2, 3, .5)").map(|c| c.alpha), Some(0.5));
        assert_eq!(parse_color("rgb(1 2 3 / 0.25)").map(|c| c.alpha), Some(0.25));
        assert_eq!(parse_color("transparent"), Some(Rgba::TRANSPARENT));
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("rgb(1, 2)"), None);
        assert_eq!(parse_color("rgba(1, 2, 3, 4, 5)"), None);
    }

    #[test]
    fn color_serialization() {
        let c = Rgba {
            r: 10.0,
            g: 20.0,
            b: 30.0,
            alpha: 0.5,
        };
        assert_eq!(c.to_string(), "rgba(10,20,30,0.5)");
    }

    #[test]
    fn corner_radii() {
        let size = Size::new(200.0, 100.0);
        assert_eq!(
            parse_corner_radius("8px", size),
            Some(Radius { x: 8.0, y: 8.0 })
        );
        assert_eq!(
            parse_corner_radius("8px 4px", size),
            Some(Radius { x: 8.0, y: 4.0 })
        );
        assert_eq!(
            parse_corner_radius("50%", size),
            Some(Radius { x: 100.0, y: 50.0 })
        );
        assert_eq!(parse_corner_radius("", size), None);
        assert_eq!(parse_corner_radius("1px 2px 3px", size), None);
    }

    #[test]
    fn radii_shorthand() {
        let r = CornerRadii::from_arrays([1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]);
        assert_eq!(r.to_string(), "1px 2px 3px 4px / 5px 6px 7px 8px");
    }

    #[test]
    fn float_prefix() {
        assert_eq!(parse_float_prefix("0.5"), Some(0.5));
        assert_eq!(parse_float_prefix("  12px"), Some(12.0));
        assert_eq!(parse_float_prefix("-.25em"), Some(-0.25));
        assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
        assert_eq!(parse_float_prefix("px"), None);
        assert_eq!(parse_float_prefix("."), None);
    }

    #[test]
    fn angles() {
        let eps = 1e-12;
        assert!((parse_angle("180deg").unwrap() - core::f64::consts::PI).abs() < eps);
        assert!((parse_angle("0.5turn").unwrap() - core::f64::consts::PI).abs() < eps);
        assert!((parse_angle("200grad").unwrap() - core::f64::consts::PI).abs() < eps);
        assert_eq!(parse_angle("1.5rad"), Some(1.5));
        assert_eq!(parse_angle("0"), Some(0.0));
        assert_eq!(parse_angle("12"), None);
    }

    #[test]
    fn transform_lists() {
        assert_eq!(parse_transform("none"), Some(Affine::IDENTITY));
        assert_eq!(
            parse_transform("matrix(1, 0, 0, 1, 10, 20)"),
            Some(Affine::translate((10.0, 20.0)))
        );
        assert_eq!(
            parse_transform("translate(10px, 5px) scale(2)"),
            Some(Affine::translate((10.0, 5.0)) * Affine::scale(2.0))
        );
        assert_eq!(
            parse_transform("scale(3) translateY(4px)"),
            Some(Affine::new([3.0, 0.0, 0.0, 3.0, 0.0, 12.0])),
            "later functions apply in the space of earlier ones"
        );
        assert_eq!(parse_transform("matrix(1, 0, 0, 1)"), None);
        assert_eq!(parse_transform("perspective(10px)"), None);
        assert_eq!(parse_transform("translate(1px"), None);
    }

    #[test]
    fn rotation_and_skew() {
        let m = parse_transform("rotate(90deg)").unwrap();
        let p = m * kurbo::Point::new(1.0, 0.0);
        assert!(p.x.abs() < 1e-12 && (p.y - 1.0).abs() < 1e-12, "got {p:?}");

        let k = parse_transform("skewX(45deg)").unwrap().as_coeffs();
        assert!((k[2] - 1.0).abs() < 1e-12, "skewX shears x by y, got {k:?}");
    }

    #[test]
    fn origins() {
        assert_eq!(parse_origin("50px 25px"), Some(Vec2::new(50.0, 25.0)));
        assert_eq!(parse_origin("50px 25px 0px"), Some(Vec2::new(50.0, 25.0)));
        assert_eq!(parse_origin("0 0"), Some(Vec2::ZERO));
        assert_eq!(parse_origin("center"), None);
    }
}
