//! Integration tests for surface generation and coloring.

use glam::Vec3;
use paramsurf_core::Error;
use paramsurf_geometry::{
    Color, ColorMap, ScalarRange, Surface, UvGrid, colorize, generate, try_generate,
};

#[test]
fn test_flat_grid_points() {
    let grid = UvGrid::new((0.0, 1.0), (0.0, 1.0), (2, 2)).expect("valid grid");
    let mesh = generate(|u, v| Vec3::new(u, v, 0.0), &grid);

    assert_eq!(
        mesh.points(),
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ]
    );
    assert_eq!(mesh.du_points().len(), 4);
    assert_eq!(mesh.dv_points().len(), 4);
    assert!(mesh.du_points().iter().chain(mesh.dv_points()).all(|p| p.z == 0.0));

    // Offsets move along u and v only
    let eps = grid.epsilon();
    assert!((mesh.du_points()[0].x - eps).abs() < 1e-7);
    assert!((mesh.dv_points()[0].y - eps).abs() < 1e-7);
}

#[test]
fn test_buffer_lengths() {
    let grid = UvGrid::new((-5.0, 5.0), (-5.0, 5.0), (7, 13)).expect("valid grid");
    let mesh = generate(|u, v| Vec3::new(u, v, (-(u * u + v * v)).exp()), &grid);

    assert_eq!(mesh.len(), 7 * 13);
    assert_eq!(mesh.points().len(), mesh.du_points().len());
    assert_eq!(mesh.points().len(), mesh.dv_points().len());
    assert_eq!(mesh.triangle_indices().len(), 6 * 12 * 6);
    assert_eq!(mesh.point_bytes().len(), 7 * 13 * 12);
}

#[test]
fn test_invalid_grids() {
    assert!(matches!(
        UvGrid::new((0.0, 1.0), (0.0, 1.0), (1, 5)),
        Err(Error::InvalidDomain(_))
    ));
    assert!(matches!(
        UvGrid::new((1.0, 1.0), (0.0, 1.0), (5, 5)),
        Err(Error::InvalidDomain(_))
    ));
    assert!(matches!(
        UvGrid::new((0.0, f32::INFINITY), (0.0, 1.0), (5, 5)),
        Err(Error::InvalidDomain(_))
    ));
}

#[test]
fn test_failing_function_is_reported() {
    let grid = UvGrid::new((0.0, 1.0), (0.0, 1.0), (4, 4)).expect("valid grid");
    let result = try_generate(
        |u, v| {
            if u > 0.5 {
                Err(format!("no surface at u = {u}"))
            } else {
                Ok(Vec3::new(u, v, 0.0))
            }
        },
        &grid,
    );

    let err = result.expect_err("function fails past u = 0.5");
    assert!(matches!(err, Error::Evaluation(_)));
    assert!(err.to_string().contains("no surface"));
}

#[test]
fn test_field_midpoint_color() {
    let colormap = ColorMap::two_tone(Color::BLUE, Color::RED);
    let colors = colorize(&[Vec3::ZERO], |_| 0.0, &colormap, ScalarRange::new(-1.0, 1.0));
    let expected = Color::BLUE.lerp(Color::RED, 0.5);

    assert!((colors[0].r - expected.r).abs() < 1e-6);
    assert!((colors[0].g - expected.g).abs() < 1e-6);
    assert!((colors[0].b - expected.b).abs() < 1e-6);
}

#[test]
fn test_surface_colored_by_field() {
    let grid = UvGrid::new((-1.0, 1.0), (-1.0, 1.0), (5, 5)).expect("valid grid");
    let mesh = generate(|u, v| Vec3::new(u, v, 0.0), &grid);
    let mut surface = Surface::new(mesh, Color::GREY_B, 0.5);
    let colormap = ColorMap::new(&[Color::BLUE, Color::GREEN, Color::RED]).expect("three colors");

    surface.set_color_by_field(|p| p.x, &colormap, ScalarRange::new(-1.0, 1.0));
    let colors = surface.point_colors();
    assert_eq!(colors.len(), 25);

    // u = -1, 0, 1 land on the three stops
    for (i, expected) in [(0, Color::BLUE), (2, Color::GREEN), (4, Color::RED)] {
        let c = colors[grid.index(i, 0)];
        assert!((c.r - expected.r).abs() < 1e-5, "row {i}");
        assert!((c.g - expected.g).abs() < 1e-5, "row {i}");
        assert!((c.b - expected.b).abs() < 1e-5, "row {i}");
        assert!((c.a - 0.5).abs() < 1e-6);
    }

    let vertices = surface.vertices();
    assert!(vertices.iter().all(|v| (v.normal - Vec3::Z).length() < 1e-3));
}
