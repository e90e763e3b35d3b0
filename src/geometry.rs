//! Planar shape representation.
//!
//! A depression is an immutable polygonal region. Growth and merging never
//! mutate a shape in place; every operation returns a new value. The offset
//! ("buffer") operation is delegated to the straight-skeleton implementation
//! in `geo-buffer`, with rounded joins so repeated offsets of a disk stay
//! close to circular.

use std::f64::consts::PI;

use geo::{Area, Centroid, EuclideanLength};
use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use geo_buffer::buffer_multi_polygon_rounded;
use serde::{Deserialize, Serialize};

/// Segments used when a point is dilated into a disk.
pub const DISK_SEGMENTS: usize = 32;

/// Areas at or below this are treated as a collapsed (extinct) shape.
const EMPTY_AREA_EPS: f64 = 1e-12;

/// An immutable planar region, simple or multi-part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Depression {
    geometry: MultiPolygon<f64>,
}

impl Depression {
    pub fn from_polygon(polygon: Polygon<f64>) -> Self {
        Self {
            geometry: MultiPolygon::new(vec![polygon]),
        }
    }

    pub fn from_multi_polygon(geometry: MultiPolygon<f64>) -> Self {
        Self { geometry }
    }

    /// A disk of the given radius: the buffer of a bare point.
    pub fn disk(center: Point<f64>, radius: f64) -> Self {
        let ring: Vec<Coord<f64>> = (0..DISK_SEGMENTS)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / DISK_SEGMENTS as f64;
                Coord {
                    x: center.x() + radius * theta.cos(),
                    y: center.y() + radius * theta.sin(),
                }
            })
            .collect();
        Self::from_polygon(Polygon::new(LineString::from(ring), vec![]))
    }

    /// A disk with the equivalent-disk radius for the given area,
    /// `radius = sqrt(area / pi)`.
    pub fn disk_with_area(center: Point<f64>, area: f64) -> Self {
        Self::disk(center, (area / PI).sqrt())
    }

    pub fn area(&self) -> f64 {
        self.geometry.unsigned_area()
    }

    /// Total boundary length over all exterior and interior rings.
    pub fn perimeter(&self) -> f64 {
        self.geometry
            .iter()
            .map(|polygon| {
                let outer = polygon.exterior().euclidean_length();
                let inner: f64 = polygon
                    .interiors()
                    .iter()
                    .map(EuclideanLength::euclidean_length)
                    .sum();
                outer + inner
            })
            .sum()
    }

    pub fn centroid(&self) -> Option<Point<f64>> {
        self.geometry.centroid()
    }

    /// Number of disjoint parts.
    pub fn parts(&self) -> usize {
        self.geometry.0.len()
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Offsets the boundary by a signed perpendicular distance, outward for
    /// positive values. A degenerate input (point-like or zero-area polygon)
    /// has no interior to offset and dilates into a disk of radius `distance`
    /// around its representative point. Returns `None` when a shrink
    /// collapses the shape to nothing; the caller decides what extinction
    /// means.
    pub fn buffer(&self, distance: f64) -> Option<Depression> {
        if distance == 0.0 {
            return Some(self.clone());
        }
        if self.area() <= EMPTY_AREA_EPS {
            if distance < 0.0 {
                return None;
            }
            return self
                .representative_point()
                .map(|center| Self::disk(center, distance));
        }
        let buffered = buffer_multi_polygon_rounded(&self.geometry, distance);
        if buffered.unsigned_area() <= EMPTY_AREA_EPS {
            None
        } else {
            Some(Self::from_multi_polygon(buffered))
        }
    }

    /// Centroid when it exists, otherwise the first boundary coordinate.
    fn representative_point(&self) -> Option<Point<f64>> {
        self.centroid().or_else(|| {
            self.geometry
                .iter()
                .flat_map(|polygon| polygon.exterior().coords())
                .next()
                .copied()
                .map(Point::from)
        })
    }
}
