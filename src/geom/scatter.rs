//! Random disc scatter and deterministic spherical spirals.
//!
//! The disc sampler feeds the spraycan tool: offsets in the plane of a target
//! disc, drawn either area-uniform (`radius · √u`) or linearly clustered
//! toward the center (`radius · u`). The spherical spiral seeds bulk outward
//! ray sprays with a repeatable near-even direction set, so the same count
//! always produces the same directions.

use rand::Rng;

use super::core::{Point3, Vec3};

/// Random in-plane offsets within a disc of the given radius.
///
/// Per sample the angle is uniform in `[0, 2π)` and the radial distance is
/// `radius · √u` when `uniform` is set (area-uniform over the disc) or
/// `radius · u` otherwise (linear law, clustered toward the center). The
/// offset is `(radial · sin θ, radial · cos θ)`.
pub fn sample_disc<R: Rng + ?Sized>(
    radius: f64,
    count: usize,
    uniform: bool,
    rng: &mut R,
) -> Vec<(f64, f64)> {
    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        let angle = rng.random::<f64>() * std::f64::consts::TAU;
        let radial = if uniform {
            radius * rng.random::<f64>().sqrt()
        } else {
            radius * rng.random::<f64>()
        };
        offsets.push((radial * angle.sin(), radial * angle.cos()));
    }
    offsets
}

/// Deterministic golden-angle spiral of `count` points spread near-evenly
/// over a sphere around `center`. Used to seed bulk outward ray casts; the
/// point order is stable for a given count.
#[must_use]
pub fn spiral_sphere(count: usize, center: Point3, radius: f64) -> Vec<Point3> {
    let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    let n = count as f64;
    let mut points = Vec::with_capacity(count);
    for k in 0..count {
        let i = k as f64;
        let z = 1.0 - 2.0 * (i + 0.5) / n;
        let ring = (1.0 - z * z).max(0.0).sqrt();
        let theta = golden_angle * i;
        let dir = Vec3::new(ring * theta.cos(), ring * theta.sin(), z);
        points.push(center + dir.mul_scalar(radius));
    }
    points
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
