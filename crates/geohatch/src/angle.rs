//! Bearing arithmetic.
//!
//! Bearings are compass directions in degrees, clockwise from north.

/// Fold any angle into `[0, 360)`.
///
/// Total for finite input: negatives and multiple revolutions both fold.
///
/// ## Rust Lesson #31: rem_euclid
///
/// JS's `%` keeps the sign of the dividend (`-10 % 360 === -10`), so the
/// usual fix is "add 360 if negative". Rust's `%` behaves the same, but
/// `f64::rem_euclid` always returns a non-negative remainder.
#[inline]
pub fn normalize(angle: f64) -> f64 {
    let folded = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if folded >= 360.0 { 0.0 } else { folded }
}

/// Which side of a bearing a perpendicular points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Clockwise, +90°
    #[default]
    Right,
    /// Counter-clockwise, -90°
    Left,
}

/// Bearing perpendicular to `base`, normalized.
#[inline]
pub fn perpendicular_bearing(base: f64, side: Side) -> f64 {
    match side {
        Side::Right => normalize(normalize(base) + 90.0),
        Side::Left => normalize(normalize(base) - 90.0),
    }
}

/// The opposite direction.
#[inline]
pub fn reverse_bearing(bearing: f64) -> f64 {
    normalize(bearing + 180.0)
}

/// Signed turn from `from` to `to`, in `(-180, 180]`.
#[inline]
pub fn signed_delta(from: f64, to: f64) -> f64 {
    let delta = normalize(to - from);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

// ============================================================================
// TESTS
// ============================================================================
