//! Straight-down drop operations.
//!
//! Every variant casts one downward ray per input and silently skips the
//! inputs with nothing below them; the remaining results are keyed by input
//! index so the caller can pair them back up. Batches are best-effort by
//! construction: one miss never affects the other items.

use crate::geom::{Point3, Vec3};
use crate::scene::{Ray, SceneQuery, SceneWriter};

/// An origin point paired with the surface point found below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropTrace {
    pub origin: Point3,
    pub hit: Point3,
}

/// Trace points down to the surface below, keeping the origin of each
/// surviving cast so the host can draw a guide line to the landing point.
pub fn drop_points_trace<S: SceneQuery + ?Sized>(
    points: &[Point3],
    scene: &S,
    stop_at_ground: bool,
) -> Vec<DropTrace> {
    let mut traces = Vec::new();
    for (index, &point) in points.iter().enumerate() {
        let Some(hit) = Ray::down_from(point).test(scene, stop_at_ground) else {
            log::debug!("drop trace: nothing below point {index}");
            continue;
        };
        traces.push(DropTrace {
            origin: point,
            hit: hit.point,
        });
    }
    traces
}

/// Translation vectors that move each point onto the surface below it,
/// keyed by input index. Points with nothing below are skipped.
pub fn drop_points_move<S: SceneQuery + ?Sized>(
    points: &[Point3],
    scene: &S,
    stop_at_ground: bool,
) -> Vec<(usize, Vec3)> {
    down_offsets(points, scene, stop_at_ground, "point")
}

/// Translation vectors that drop instances onto the surface below their
/// insertion origins, keyed by input index. Pure translation; orientation is
/// untouched.
pub fn drop_instances<S: SceneQuery + ?Sized>(
    origins: &[Point3],
    scene: &S,
    stop_at_ground: bool,
) -> Vec<(usize, Vec3)> {
    down_offsets(origins, scene, stop_at_ground, "instance origin")
}

fn down_offsets<S: SceneQuery + ?Sized>(
    points: &[Point3],
    scene: &S,
    stop_at_ground: bool,
    what: &str,
) -> Vec<(usize, Vec3)> {
    let mut offsets = Vec::new();
    for (index, &point) in points.iter().enumerate() {
        let Some(hit) = Ray::down_from(point).test(scene, stop_at_ground) else {
            log::debug!("drop: nothing below {what} {index}");
            continue;
        };
        offsets.push((index, hit.point - point));
    }
    offsets
}

/// Write traces out as marker geometry: a point marker at each landing point
/// and a guide line back to its origin, all in one transaction.
pub fn write_traces<W: SceneWriter + ?Sized>(
    writer: &mut W,
    operation: &str,
    traces: &[DropTrace],
) {
    writer.begin_transaction(operation);
    for trace in traces {
        writer.add_point_marker(trace.hit);
        writer.add_line_marker(trace.origin, trace.hit);
    }
    writer.commit_transaction();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
