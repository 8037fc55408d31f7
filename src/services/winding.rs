// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Polygon ring winding normalization for GeoJSON interchange.
//!
//! Every polygon's exterior ring gets the requested orientation and every
//! hole the opposite one. Works through Feature, FeatureCollection and
//! GeometryCollection wrappers without touching anything but ring order.

use geojson::{Feature, GeoJson, Geometry, Position, Value};

/// Ring orientation in a y-up coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
}

impl Orientation {
    pub fn opposite(self) -> Self {
        match self {
            Orientation::Clockwise => Orientation::CounterClockwise,
            Orientation::CounterClockwise => Orientation::Clockwise,
        }
    }
}

/// Exterior orientation used for diagrams sent to Geodesignhub: the
/// RFC 7946 right-hand rule, counter-clockwise exteriors and clockwise holes.
pub const GDH_EXTERIOR: Orientation = Orientation::CounterClockwise;

/// Twice the signed shoelace area with the sign flipped (positive = clockwise),
/// summed with Neumaier compensation. `None` if a position lacks x/y.
fn compensated_winding_sum(ring: &[Position]) -> Option<f64> {
    let mut area = 0.0_f64;
    let mut err = 0.0_f64;

    let mut j = ring.len().checked_sub(1)?;
    for i in 0..ring.len() {
        let (xi, yi) = xy(&ring[i])?;
        let (xj, yj) = xy(&ring[j])?;
        let k = (xi - xj) * (yj + yi);
        let m = area + k;
        err += if area.abs() >= k.abs() {
            area - m + k
        } else {
            k - m + area
        };
        area = m;
        j = i;
    }

    Some(area + err)
}

fn xy(position: &Position) -> Option<(f64, f64)> {
    match position.as_slice() {
        [x, y, ..] => Some((*x, *y)),
        _ => None,
    }
}

/// Orientation of a ring, or `None` for degenerate rings (fewer than 3
/// positions, zero area, missing coordinates).
pub fn ring_orientation(ring: &[Position]) -> Option<Orientation> {
    if ring.len() < 3 {
        return None;
    }
    let sum = compensated_winding_sum(ring)?;
    if sum > 0.0 {
        Some(Orientation::Clockwise)
    } else if sum < 0.0 {
        Some(Orientation::CounterClockwise)
    } else {
        None
    }
}

/// Reverse `ring` if its orientation disagrees with `orientation`.
/// Returns true when the ring was reversed.
pub fn rewind_ring(ring: &mut [Position], orientation: Orientation) -> bool {
    match ring_orientation(ring) {
        Some(current) if current != orientation => {
            ring.reverse();
            true
        }
        _ => false,
    }
}

/// Rewind one polygon: first ring is the exterior, the rest are holes.
pub fn rewind_polygon(rings: &mut [Vec<Position>], exterior: Orientation) {
    let mut rings = rings.iter_mut();
    if let Some(outer) = rings.next() {
        rewind_ring(outer, exterior);
    }
    for hole in rings {
        rewind_ring(hole, exterior.opposite());
    }
}

/// Rewind every polygon inside a geometry; other geometry types are untouched.
pub fn rewind_geometry(geometry: &mut Geometry, exterior: Orientation) {
    match &mut geometry.value {
        Value::Polygon(rings) => rewind_polygon(rings, exterior),
        Value::MultiPolygon(polygons) => {
            for rings in polygons.iter_mut() {
                rewind_polygon(rings, exterior);
            }
        }
        Value::GeometryCollection(geometries) => {
            for inner in geometries.iter_mut() {
                rewind_geometry(inner, exterior);
            }
        }
        Value::Point(_) | Value::MultiPoint(_) | Value::LineString(_) | Value::MultiLineString(_) => {}
    }
}

pub fn rewind_feature(feature: &mut Feature, exterior: Orientation) {
    if let Some(geometry) = feature.geometry.as_mut() {
        rewind_geometry(geometry, exterior);
    }
}

/// Rewind any GeoJSON object.
pub fn rewind(geojson: &mut GeoJson, exterior: Orientation) {
    match geojson {
        GeoJson::Geometry(geometry) => rewind_geometry(geometry, exterior),
        GeoJson::Feature(feature) => rewind_feature(feature, exterior),
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features.iter_mut() {
                rewind_feature(feature, exterior);
            }
        }
    }
}
