//! Viewport snapshots and the geographic↔pixel projection seam.

use crate::types::{LatLng, PixelPoint};
use serde::{Deserialize, Serialize};

/// Geographic bounding box of the visible map window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }
}

/// Conversion between geographic and viewport pixel coordinates.
///
/// Supplied by the rendering collaborator; the engine never owns the
/// rendering surface and only calls through this seam.
pub trait MapProjection {
    fn project(&self, point: LatLng) -> PixelPoint;
    fn unproject(&self, pixel: PixelPoint) -> LatLng;
}

/// Equirectangular projection over fixed bounds.
///
/// Pixel y grows downward, so north maps to y = 0. Sufficient for the
/// province-scale windows this engine works at, and for tests; tiled map
/// collaborators supply their own mercator-backed implementation.
#[derive(Debug, Clone)]
pub struct LinearProjection {
    bounds: GeoBounds,
    width: f64,
    height: f64,
}

impl LinearProjection {
    pub fn new(bounds: GeoBounds, width: u32, height: u32) -> Self {
        Self {
            bounds,
            width: width as f64,
            height: height as f64,
        }
    }

    // degenerate bounds project everything onto the window origin
    // rather than dividing by zero
    fn lng_scale(&self) -> f64 {
        let span = self.bounds.lng_span();
        if span == 0.0 {
            0.0
        } else {
            self.width / span
        }
    }

    fn lat_scale(&self) -> f64 {
        let span = self.bounds.lat_span();
        if span == 0.0 {
            0.0
        } else {
            self.height / span
        }
    }
}

impl MapProjection for LinearProjection {
    fn project(&self, point: LatLng) -> PixelPoint {
        PixelPoint::new(
            (point.lng - self.bounds.west) * self.lng_scale(),
            (self.bounds.north - point.lat) * self.lat_scale(),
        )
    }

    fn unproject(&self, pixel: PixelPoint) -> LatLng {
        let lng = if self.width == 0.0 {
            self.bounds.west
        } else {
            self.bounds.west + (pixel.x / self.width) * self.bounds.lng_span()
        };
        let lat = if self.height == 0.0 {
            self.bounds.north
        } else {
            self.bounds.north - (pixel.y / self.height) * self.bounds.lat_span()
        };
        LatLng::new(lat, lng)
    }
}

/// Immutable snapshot of the visible map window for one computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub bounds: GeoBounds,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(bounds: GeoBounds, width: u32, height: u32) -> Self {
        Self {
            bounds,
            width,
            height,
        }
    }

    pub fn center(&self) -> LatLng {
        self.bounds.center()
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        self.bounds.contains(point)
    }

    /// A zero-area window cannot host slope math.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The matching equirectangular projection for this snapshot.
    pub fn linear_projection(&self) -> LinearProjection {
        LinearProjection::new(self.bounds, self.width, self.height)
    }
}
