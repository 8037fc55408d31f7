// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Winding normalization checked against `geo`'s winding order.

use geo::{Coord, LineString, Winding};
use geodesign_bridge::services::winding::{
    rewind_geometry, rewind_ring, ring_orientation, Orientation,
};
use geojson::{Geometry, Position, Value};

fn to_line_string(ring: &[Position]) -> LineString<f64> {
    LineString::from(
        ring.iter()
            .map(|p| Coord { x: p[0], y: p[1] })
            .collect::<Vec<_>>(),
    )
}

/// Irregular closed rings in both orientations.
fn sample_rings() -> Vec<Vec<Position>> {
    let star: Vec<Position> = (0..10)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / 10.0;
            let r = if i % 2 == 0 { 1.0 } else { 0.4 };
            vec![-122.0 + r * t.cos(), 37.0 + r * t.sin()]
        })
        .chain(std::iter::once(vec![-121.0, 37.0]))
        .collect();
    let mut star_cw = star.clone();
    star_cw.reverse();

    let sliver = vec![
        vec![0.0, 0.0],
        vec![1000.0, 0.000_001],
        vec![1000.0, 0.000_002],
        vec![0.0, 0.0],
    ];

    vec![star, star_cw, sliver]
}

#[test]
fn test_orientation_agrees_with_geo() {
    for ring in sample_rings() {
        let expected = if to_line_string(&ring).is_cw() {
            Orientation::Clockwise
        } else {
            Orientation::CounterClockwise
        };
        assert_eq!(ring_orientation(&ring), Some(expected));
    }
}

#[test]
fn test_rewind_is_idempotent() {
    for orientation in [Orientation::Clockwise, Orientation::CounterClockwise] {
        for mut ring in sample_rings() {
            rewind_ring(&mut ring, orientation);
            let once = ring.clone();
            assert!(!rewind_ring(&mut ring, orientation));
            assert_eq!(ring, once);
        }
    }
}

#[test]
fn test_reverses_iff_orientation_disagrees() {
    for ring in sample_rings() {
        let before = ring_orientation(&ring).unwrap();
        for wanted in [Orientation::Clockwise, Orientation::CounterClockwise] {
            let mut copy = ring.clone();
            assert_eq!(rewind_ring(&mut copy, wanted), before != wanted);
            assert!(to_line_string(&copy).is_cw() == (wanted == Orientation::Clockwise));
        }
    }
}

#[test]
fn test_multipolygon_exteriors_clockwise_holes_counter_clockwise() {
    let rings = sample_rings();
    let mut geometry = Geometry::new(Value::MultiPolygon(vec![
        vec![rings[0].clone(), rings[1].clone()],
        vec![rings[1].clone()],
    ]));

    rewind_geometry(&mut geometry, Orientation::Clockwise);

    let Value::MultiPolygon(polygons) = &geometry.value else {
        panic!("expected a multipolygon");
    };
    assert!(to_line_string(&polygons[0][0]).is_cw());
    assert!(to_line_string(&polygons[0][1]).is_ccw());
    assert!(to_line_string(&polygons[1][0]).is_cw());
}
