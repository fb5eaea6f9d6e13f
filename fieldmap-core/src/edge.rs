//! Edge projection for off-screen markers.
//!
//! When a marker of interest lies outside the visible window, the map
//! draws an indicator on the window edge plus a dashed connector back to
//! the true position. The indicator sits where the sight line from the
//! viewport center to the marker crosses the window rectangle; this
//! module finds that crossing in pixel space and hands it back as a
//! geographic point.

use crate::types::{LatLng, PixelPoint};
use crate::viewport::{MapProjection, Viewport};
use serde::{Deserialize, Serialize};

/// Result of projecting one marker against one viewport snapshot.
///
/// Valid only for the viewport generation it was computed against; a
/// newer viewport supersedes it and its result is simply discarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeProjection {
    pub offscreen: bool,
    pub edge_point: Option<LatLng>,
}

impl EdgeProjection {
    /// The marker is visible; nothing to draw at the edge.
    pub fn onscreen() -> Self {
        Self {
            offscreen: false,
            edge_point: None,
        }
    }

    fn at(point: LatLng) -> Self {
        Self {
            offscreen: true,
            edge_point: Some(point),
        }
    }

    /// Endpoints of the dashed connector from the edge indicator back to
    /// the marker's true position.
    pub fn connector(&self, target: LatLng) -> Option<(LatLng, LatLng)> {
        self.edge_point.map(|edge| (edge, target))
    }
}

/// Project a marker onto the viewport boundary.
///
/// Tests each window edge the sight line heads toward, keeps crossings
/// that land within the rectangle, and picks the one nearest the center.
/// Degenerate inputs (zero-area window, marker coinciding with the
/// center) come back as "not offscreen" rather than an error; the map
/// simply draws no indicator.
pub fn project_to_edge<P: MapProjection>(
    viewport: &Viewport,
    projection: &P,
    target: LatLng,
) -> EdgeProjection {
    if viewport.is_degenerate() {
        return EdgeProjection::onscreen();
    }
    if viewport.contains(&target) {
        return EdgeProjection::onscreen();
    }

    let width = viewport.width as f64;
    let height = viewport.height as f64;
    let center_px = projection.project(viewport.center());
    let target_px = projection.project(target);

    let dx = target_px.x - center_px.x;
    let dy = target_px.y - center_px.y;
    if dx == 0.0 && dy == 0.0 {
        return EdgeProjection::onscreen();
    }

    let mut candidates: Vec<PixelPoint> = Vec::with_capacity(2);

    // top edge (y = 0), only when the line heads up
    if dy < 0.0 {
        let x = center_px.x + (0.0 - center_px.y) * dx / dy;
        if (0.0..=width).contains(&x) {
            candidates.push(PixelPoint::new(x, 0.0));
        }
    }
    // bottom edge (y = height), only when the line heads down
    if dy > 0.0 {
        let x = center_px.x + (height - center_px.y) * dx / dy;
        if (0.0..=width).contains(&x) {
            candidates.push(PixelPoint::new(x, height));
        }
    }
    // left edge (x = 0), only when the line heads left
    if dx < 0.0 {
        let y = center_px.y + (0.0 - center_px.x) * dy / dx;
        if (0.0..=height).contains(&y) {
            candidates.push(PixelPoint::new(0.0, y));
        }
    }
    // right edge (x = width), only when the line heads right
    if dx > 0.0 {
        let y = center_px.y + (width - center_px.x) * dy / dx;
        if (0.0..=height).contains(&y) {
            candidates.push(PixelPoint::new(width, y));
        }
    }

    let mut nearest: Option<(PixelPoint, f64)> = None;
    for candidate in candidates {
        let dist = candidate.distance(&center_px);
        if nearest.map_or(true, |(_, best)| dist < best) {
            nearest = Some((candidate, dist));
        }
    }

    // no candidate cannot happen for a well-formed rectangle and a
    // non-zero direction, but degrade to the center rather than panic
    let edge_px = nearest.map(|(point, _)| point).unwrap_or(center_px);
    EdgeProjection::at(projection.unproject(edge_px))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::GeoBounds;
    use proptest::prelude::*;

    // 800×600 window over the Java Sea: 80 px/deg lng, 150 px/deg lat
    fn viewport() -> Viewport {
        Viewport::new(GeoBounds::new(-9.0, 105.0, -5.0, 115.0), 800, 600)
    }

    #[test]
    fn test_marker_inside_bounds_is_onscreen() {
        let vp = viewport();
        let result = project_to_edge(&vp, &vp.linear_projection(), LatLng::new(-6.2, 106.8));
        assert!(!result.offscreen);
        assert_eq!(result.edge_point, None);
        assert_eq!(result.connector(LatLng::new(-6.2, 106.8)), None);
    }

    #[test]
    fn test_right_edge_crossing() {
        // target pixel (1200, 100): dx = 800, dy = -200 from center
        // (400, 300). The top-edge candidate solves to x = 1600, outside
        // the window; only the right edge accepts, at y = 200.
        let vp = viewport();
        let projection = vp.linear_projection();
        let target = LatLng::new(-5.0 - 2.0 / 3.0, 120.0);

        let target_px = projection.project(target);
        assert!((target_px.x - 1200.0).abs() < 1e-9);
        assert!((target_px.y - 100.0).abs() < 1e-9);

        let result = project_to_edge(&vp, &projection, target);
        assert!(result.offscreen);

        let edge = result.edge_point.unwrap();
        let edge_px = projection.project(edge);
        assert!((edge_px.x - 800.0).abs() < 1e-6);
        assert!((edge_px.y - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_sight_line() {
        // directly north of center: dx = 0 must not divide
        let vp = viewport();
        let projection = vp.linear_projection();
        let target = LatLng::new(-3.0, 110.0);

        let result = project_to_edge(&vp, &projection, target);
        assert!(result.offscreen);

        let edge_px = projection.project(result.edge_point.unwrap());
        assert!((edge_px.x - 400.0).abs() < 1e-6);
        assert!((edge_px.y - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_connector_runs_from_edge_to_marker() {
        let vp = viewport();
        let projection = vp.linear_projection();
        let target = LatLng::new(-3.0, 110.0);

        let result = project_to_edge(&vp, &projection, target);
        let (from, to) = result.connector(target).unwrap();
        assert_eq!(Some(from), result.edge_point);
        assert_eq!(to, target);
    }

    #[test]
    fn test_degenerate_viewport_is_never_offscreen() {
        let vp = Viewport::new(GeoBounds::new(-9.0, 105.0, -5.0, 115.0), 0, 0);
        let projection = vp.linear_projection();
        let result = project_to_edge(&vp, &projection, LatLng::new(40.0, 2.0));
        assert!(!result.offscreen);
    }

    #[test]
    fn test_marker_collapsing_onto_center_is_onscreen() {
        // a projection may collapse a far marker onto the center pixel;
        // a zero-length direction cannot point at any edge
        struct CollapsingProjection;
        impl MapProjection for CollapsingProjection {
            fn project(&self, _point: LatLng) -> PixelPoint {
                PixelPoint::new(400.0, 300.0)
            }
            fn unproject(&self, _pixel: PixelPoint) -> LatLng {
                LatLng::new(-7.0, 110.0)
            }
        }

        let vp = viewport();
        let result = project_to_edge(&vp, &CollapsingProjection, LatLng::new(40.0, 2.0));
        assert!(!result.offscreen);
    }

    #[test]
    fn test_corner_diagonal_accepts_either_edge() {
        // sight line straight through the bottom-right corner
        let vp = viewport();
        let projection = vp.linear_projection();
        // pixel (1200, 900) -> both right and bottom candidates solve to
        // the corner itself
        let target = LatLng::new(-11.0, 120.0);

        let result = project_to_edge(&vp, &projection, target);
        let edge_px = projection.project(result.edge_point.unwrap());
        assert!((edge_px.x - 800.0).abs() < 1e-6);
        assert!((edge_px.y - 600.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_edge_point_lies_on_the_boundary(
            lat in -30.0f64..10.0,
            lng in 85.0f64..135.0,
        ) {
            let vp = viewport();
            let projection = vp.linear_projection();
            let target = LatLng::new(lat, lng);
            prop_assume!(!vp.contains(&target));

            let result = project_to_edge(&vp, &projection, target);
            prop_assert!(result.offscreen);

            let edge_px = projection.project(result.edge_point.unwrap());
            let on_vertical_edge =
                (edge_px.x.abs() < 1e-6 || (edge_px.x - 800.0).abs() < 1e-6)
                    && (0.0..=600.0 + 1e-6).contains(&edge_px.y);
            let on_horizontal_edge =
                (edge_px.y.abs() < 1e-6 || (edge_px.y - 600.0).abs() < 1e-6)
                    && (0.0..=800.0 + 1e-6).contains(&edge_px.x);
            prop_assert!(on_vertical_edge || on_horizontal_edge);
        }

        #[test]
        fn prop_edge_point_sits_between_center_and_marker(
            lat in -30.0f64..10.0,
            lng in 85.0f64..135.0,
        ) {
            let vp = viewport();
            let projection = vp.linear_projection();
            let target = LatLng::new(lat, lng);
            prop_assume!(!vp.contains(&target));

            let result = project_to_edge(&vp, &projection, target);
            let edge_px = projection.project(result.edge_point.unwrap());
            let center_px = projection.project(vp.center());
            let target_px = projection.project(target);

            prop_assert!(
                edge_px.distance(&center_px) <= target_px.distance(&center_px) + 1e-6
            );
        }
    }
}
