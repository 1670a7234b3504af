//! Triangular and trapezoidal membership functions.
//!
//! ```text
//!   triangle(a, b, c)          trapezoid(a, b, c, d)
//!
//!         /\                         ______
//!        /  \                       /      \
//!   ____/    \____             ____/        \____
//!       a  b  c                    a  b    c  d
//! ```
//!
//! Both functions are total: any `f32` (including NaN and infinities)
//! produces a finite degree in `[0, 1]`.

/// Degree of `x` in the triangle peaking at `b`.
///
/// The peak is checked first, so degenerate shapes (`a == b` or `b == c`)
/// return exactly 1 at `b` and never divide by zero.
pub fn triangle(x: f32, a: f32, b: f32, c: f32) -> f32 {
    if x.is_nan() {
        return 0.0;
    }
    if x == b {
        return 1.0;
    }
    if x <= a || x >= c {
        return 0.0;
    }
    let degree = if x < b {
        (x - a) / (b - a)
    } else {
        (c - x) / (c - b)
    };
    clamp_degree(degree)
}

/// Degree of `x` in the trapezoid with plateau `[b, c]`.
///
/// The outer bounds win over the plateau: `x <= a` or `x >= d` is always 0,
/// even for shoulder shapes where `a == b` or `c == d`.
pub fn trapezoid(x: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    if x.is_nan() || x <= a || x >= d {
        return 0.0;
    }
    if x >= b && x <= c {
        return 1.0;
    }
    let degree = if x < b {
        (x - a) / (b - a)
    } else {
        (d - x) / (d - c)
    };
    clamp_degree(degree)
}

fn clamp_degree(degree: f32) -> f32 {
    if degree.is_finite() {
        degree.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
