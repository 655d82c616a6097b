//! Piecewise-linear colormaps and scalar clamp ranges.

use paramsurf_core::{Error, Result};

use crate::Color;

/// A `(position, color)` anchor of a [`ColorMap`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Position in `[0, 1]`
    pub position: f32,
    pub color: Color,
}

impl ColorStop {
    /// Create a stop at `position` in `[0, 1]`
    pub const fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Ordered color stops spanning `[0, 1]`.
///
/// A position `t` is mapped by finding the segment containing it and
/// interpolating linearly between its two stops.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMap {
    stops: Vec<ColorStop>,
}

impl ColorMap {
    /// Evenly spaced stops, first color at 0 and last at 1.
    pub fn new(colors: &[Color]) -> Result<Self> {
        if colors.len() < 2 {
            return Err(Error::InvalidColorMap(format!(
                "need at least two colors, got {}",
                colors.len()
            )));
        }
        let last = (colors.len() - 1) as f32;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| ColorStop::new(i as f32 / last, color))
            .collect();
        Ok(Self { stops })
    }

    /// Two-stop map from `low` at 0 to `high` at 1.
    pub fn two_tone(low: Color, high: Color) -> Self {
        Self {
            stops: vec![ColorStop::new(0.0, low), ColorStop::new(1.0, high)],
        }
    }

    /// Explicitly positioned stops.
    ///
    /// Positions must be finite, non-decreasing, start at 0 and end at 1.
    pub fn with_stops(stops: Vec<ColorStop>) -> Result<Self> {
        if stops.len() < 2 {
            return Err(Error::InvalidColorMap(format!(
                "need at least two stops, got {}",
                stops.len()
            )));
        }
        if stops.iter().any(|s| !s.position.is_finite()) {
            return Err(Error::InvalidColorMap("stop positions must be finite".into()));
        }
        if stops.windows(2).any(|w| w[1].position < w[0].position) {
            return Err(Error::InvalidColorMap(
                "stop positions must be non-decreasing".into(),
            ));
        }
        let first = stops[0].position;
        let last = stops[stops.len() - 1].position;
        if first != 0.0 || last != 1.0 {
            return Err(Error::InvalidColorMap(format!(
                "stops must span [0, 1], got [{first}, {last}]"
            )));
        }
        Ok(Self { stops })
    }

    /// Get the ordered stops
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at global position `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        // First segment whose end is at or beyond t; coincident stops make a hard edge.
        let end = self
            .stops
            .iter()
            .position(|s| s.position >= t)
            .unwrap_or(self.stops.len() - 1)
            .max(1);
        let lo = self.stops[end - 1];
        let hi = self.stops[end];

        let span = hi.position - lo.position;
        if span <= 0.0 {
            return hi.color;
        }
        lo.color.lerp(hi.color, (t - lo.position) / span)
    }
}

/// Clamp range mapping scalar field values onto `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarRange {
    pub min: f32,
    pub max: f32,
}

impl ScalarRange {
    /// Create a range mapping `min` to 0 and `max` to 1
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// `clamp((value - min) / (max - min), 0, 1)`.
    ///
    /// A degenerate range (`max == min`) maps everything to 0.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span == 0.0 {
            return 0.0;
        }
        let t = (value - self.min) / span;
        if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
    }
}
