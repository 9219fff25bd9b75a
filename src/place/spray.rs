//! Omnidirectional ray spray.
//!
//! Fires an evenly spread bundle of rays from each source point and records
//! a trace for every ray that lands somewhere. Directions come from a spiral
//! distribution over the unit sphere around the source, so coverage is
//! deterministic and near-uniform regardless of count.

use crate::geom::{Point3, spiral_sphere};
use crate::place::DropTrace;
use crate::scene::{Ray, SceneQuery};

/// Ray counts above this deserve an explicit confirmation from the user
/// before the host runs the spray.
pub const SPRAY_CONFIRM_THRESHOLD: usize = 10_000;

/// Casts `rays_per_source` rays out of every source point and collects a
/// [`DropTrace`] per hit. Rays that escape the scene are skipped silently.
pub fn spray_rays<S: SceneQuery + ?Sized>(
    sources: &[Point3],
    rays_per_source: usize,
    scene: &S,
    stop_at_ground: bool,
) -> Vec<DropTrace> {
    let mut traces = Vec::new();
    for source in sources {
        for target in spiral_sphere(rays_per_source, *source, 1.0) {
            let ray = Ray::new(*source, target - *source);
            let Some(hit) = ray.test(scene, stop_at_ground) else {
                continue;
            };
            traces.push(DropTrace {
                origin: *source,
                hit: hit.point,
            });
        }
    }
    traces
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
