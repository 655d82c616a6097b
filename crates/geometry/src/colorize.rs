//! Per-point colors from a scalar field.

use std::convert::Infallible;

use glam::Vec3;
use paramsurf_core::{BoxError, Error, Result};

use crate::{Color, ColorMap, ScalarRange};

fn map_points<E>(
    points: &[Vec3],
    field: &impl Fn(Vec3) -> std::result::Result<f32, E>,
    colormap: &ColorMap,
    range: ScalarRange,
) -> std::result::Result<Vec<Color>, E> {
    points
        .iter()
        .map(|&p| Ok(colormap.sample(range.normalize(field(p)?))))
        .collect()
}

/// Color every point by evaluating `field` and mapping it through `colormap`.
///
/// Each value is normalized with [`ScalarRange::normalize`], so values
/// outside the range saturate at the end colors and a degenerate range
/// yields the first color everywhere.
pub fn colorize<F>(points: &[Vec3], field: F, colormap: &ColorMap, range: ScalarRange) -> Vec<Color>
where
    F: Fn(Vec3) -> f32,
{
    let Ok(colors) = map_points::<Infallible>(points, &|p| Ok(field(p)), colormap, range);
    colors
}

/// Like [`colorize`], with a field that can fail.
pub fn try_colorize<F, E>(
    points: &[Vec3],
    field: F,
    colormap: &ColorMap,
    range: ScalarRange,
) -> Result<Vec<Color>>
where
    F: Fn(Vec3) -> std::result::Result<f32, E>,
    E: Into<BoxError>,
{
    map_points(points, &field, colormap, range).map_err(Error::evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_color(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
    }

    fn sample_points() -> Vec<Vec3> {
        (0..25)
            .map(|i| {
                let x = (i % 5) as f32 * 0.5 - 1.0;
                let y = (i / 5) as f32 * 0.5 - 1.0;
                Vec3::new(x, y, 0.0)
            })
            .collect()
    }

    #[test]
    fn test_midpoint_blend() {
        let map = ColorMap::two_tone(Color::BLUE, Color::RED);
        let colors = colorize(&[Vec3::ZERO], |_| 0.0, &map, ScalarRange::new(-1.0, 1.0));
        assert_eq!(colors, vec![Color::BLUE.lerp(Color::RED, 0.5)]);
    }

    #[test]
    fn test_parallel_to_points() {
        let points = sample_points();
        let map = ColorMap::two_tone(Color::BLACK, Color::WHITE);
        let colors = colorize(&points, |p| p.x, &map, ScalarRange::new(-1.0, 1.0));
        assert_eq!(colors.len(), points.len());
        assert_eq!(colors[0], Color::BLACK);
        assert_eq!(colors[4], Color::WHITE);
    }

    #[test]
    fn test_affine_reparameterization_invariance() {
        let points = sample_points();
        let map = ColorMap::new(&[Color::BLUE, Color::WHITE, Color::RED]).unwrap();
        let field = |p: Vec3| p.x * p.y;

        let base = colorize(&points, field, &map, ScalarRange::new(-1.0, 1.0));
        let (a, b) = (3.5, -2.0);
        let scaled = colorize(
            &points,
            |p| a * field(p) + b,
            &map,
            ScalarRange::new(a * -1.0 + b, a * 1.0 + b),
        );

        for (x, y) in base.iter().zip(&scaled) {
            assert!(approx_color(*x, *y), "{:?} != {:?}", x, y);
        }
    }

    #[test]
    fn test_values_saturate() {
        let map = ColorMap::two_tone(Color::BLUE, Color::RED);
        let colors = colorize(
            &[Vec3::ZERO, Vec3::ONE],
            |p| if p.x > 0.5 { 10.0 } else { -10.0 },
            &map,
            ScalarRange::new(-1.0, 1.0),
        );
        assert_eq!(colors, vec![Color::BLUE, Color::RED]);
    }

    #[test]
    fn test_degenerate_range_uses_first_stop() {
        let map = ColorMap::two_tone(Color::BLUE, Color::RED);
        let colors = colorize(&sample_points(), |p| p.y, &map, ScalarRange::new(0.0, 0.0));
        assert!(colors.iter().all(|c| *c == Color::BLUE));
    }

    #[test]
    fn test_try_colorize_propagates() {
        let map = ColorMap::two_tone(Color::BLUE, Color::RED);
        let result = try_colorize(
            &sample_points(),
            |p| if p.x > 0.0 { Err("negative radius") } else { Ok(p.x) },
            &map,
            ScalarRange::new(-1.0, 1.0),
        );
        assert!(matches!(result, Err(Error::Evaluation(_))));
    }
}
