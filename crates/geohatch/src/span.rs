//! Chord sweep: the unclipped candidate hatch lines.
//!
//! Chords are laid out by walking the corridor axis in `step` meter
//! increments and shooting a long geodesic both ways along the hatch bearing
//! from each axis point. Clipping happens later, in [`crate::hatch`].

use crate::angle::{normalize, reverse_bearing};
use crate::corridor::Corridor;
use crate::geodesy::Geodesy;
use crate::geometry::{Chord, GeoPoint};

/// Hard ceiling on chords per sweep.
pub const MAX_CHORDS: usize = 2000;

/// Fixed overshoot past the polygon at each chord end, meters.
pub const CHORD_MARGIN_M: f64 = 1_000.0;

/// Proportional overshoot past the polygon at each chord end.
pub const CHORD_SLACK: f64 = 0.05;

/// Longest a chord may reach from its axis point, in each direction (meters).
///
/// Keeps the whole chord well under half a meridian, so its endpoints never
/// approach antipodal and arc membership along it stays unambiguous.
pub const MAX_CHORD_HALF_SPAN: f64 = 9_000_000.0;

/// Lazy, restartable iterator over the chords covering a corridor.
///
/// ## Rust Lesson #33: Iterators Are Just `next()`
///
/// Implementing `Iterator` only needs `fn next(&mut self) -> Option<Item>`.
/// Every adapter (`map`, `take`, `collect`, ...) comes for free. Because the
/// sweep holds its own index, cloning it gives a fresh cursor at the same
/// position without recomputing anything.
pub struct ChordSweep<'a, G: Geodesy + ?Sized> {
    geodesy: &'a G,
    axis_origin: GeoPoint,
    axis_bearing: f64,
    reach: f64,
    main_bearing: f64,
    start: f64,
    end: f64,
    step: f64,
    index: usize,
    truncated: bool,
}

// Manual impl: derive would demand `G: Clone`, but only the reference is copied.
impl<G: Geodesy + ?Sized> Clone for ChordSweep<'_, G> {
    fn clone(&self) -> Self {
        Self {
            geodesy: self.geodesy,
            axis_origin: self.axis_origin,
            axis_bearing: self.axis_bearing,
            reach: self.reach,
            main_bearing: self.main_bearing,
            start: self.start,
            end: self.end,
            step: self.step,
            index: self.index,
            truncated: self.truncated,
        }
    }
}

impl<'a, G: Geodesy + ?Sized> ChordSweep<'a, G> {
    /// Sweep `t` from `min_projection - offset` to `max_projection + offset`.
    ///
    /// A `step` that is zero, negative or non-finite yields a single chord
    /// at the start of the range.
    pub fn new(corridor: &Corridor, main_bearing: f64, step: f64, offset: f64, geodesy: &'a G) -> Self {
        Self {
            geodesy,
            axis_origin: corridor.axis_origin,
            axis_bearing: corridor.axis_bearing,
            reach: corridor.reach,
            main_bearing: normalize(main_bearing),
            start: corridor.min_projection - offset,
            end: corridor.max_projection + offset,
            step,
            index: 0,
            truncated: false,
        }
    }

    /// Whether the sweep stopped at [`MAX_CHORDS`] before covering the range.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Signed axis position of chord `index`, if it falls within the range.
    fn position_at(&self, index: usize) -> Option<f64> {
        if !(self.start <= self.end) {
            return None;
        }
        if !(self.step > 0.0 && self.step.is_finite()) {
            return (index == 0).then_some(self.start);
        }
        let t = self.start + index as f64 * self.step;
        (t <= self.end).then_some(t)
    }

    /// How far the chord at axis position `t` reaches each way, meters.
    ///
    /// Every vertex lies within `reach` of the axis origin, hence within
    /// `reach + |t|` of the axis point, so a chord that long leaves the
    /// polygon at both ends. Capped at [`MAX_CHORD_HALF_SPAN`].
    pub fn half_span(&self, t: f64) -> f64 {
        ((self.reach + t.abs()) * (1.0 + CHORD_SLACK) + CHORD_MARGIN_M).min(MAX_CHORD_HALF_SPAN)
    }

    /// Chord crossing the axis at signed distance `t` from the origin.
    pub fn chord_at(&self, t: f64) -> Chord {
        let axis_point = if t < 0.0 {
            self.geodesy
                .direct(&self.axis_origin, reverse_bearing(self.axis_bearing), -t)
                .point
        } else {
            self.geodesy.direct(&self.axis_origin, self.axis_bearing, t).point
        };

        let half_span = self.half_span(t);
        let forward = self.geodesy.direct(&axis_point, self.main_bearing, half_span);
        let backward = self
            .geodesy
            .direct(&axis_point, reverse_bearing(self.main_bearing), half_span);

        Chord::new(forward.point.flatten(), backward.point.flatten())
    }
}

impl<G: Geodesy + ?Sized> Iterator for ChordSweep<'_, G> {
    type Item = Chord;

    fn next(&mut self) -> Option<Chord> {
        let t = self.position_at(self.index)?;

        if self.index >= MAX_CHORDS {
            if !self.truncated {
                log::warn!(
                    "chord sweep hit the {MAX_CHORDS} chord ceiling at {t:.1} m of {:.1} m; output is truncated",
                    self.end
                );
                self.truncated = true;
            }
            return None;
        }

        self.index += 1;
        Some(self.chord_at(t))
    }
}

// ============================================================================
// TESTS
// ============================================================================
