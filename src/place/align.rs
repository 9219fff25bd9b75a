//! Footprint-to-ground alignment.
//!
//! Reorients an object so the four corners of its footprint conform to the
//! surface found beneath them: cast all four corners straight down, fit a
//! ground plane through the hits, then derive a translation plus two
//! axis rotations that carry the footprint onto that plane. The rotations
//! come from comparing the footprint's 0→1 and 0→2 edges against their
//! projections, and both pivot on the point where the object's own origin
//! meets the fitted plane.
//!
//! The whole alignment is all-or-nothing: one missing corner hit and the
//! object is left untouched. Partial alignment is never attempted.

use crate::geom::{
    Point3, Tolerance, Transform, Vec3, fit_plane, intersect_line_plane,
};
use crate::scene::{Ray, SceneQuery};

/// The rigid transform that drops a 4-corner footprint onto the ground
/// below, or `None` when any corner ray misses, the hits cannot define a
/// plane, or the fitted plane is vertical with respect to the drop
/// direction.
///
/// Corner order matters: the basis pairs run corner 0 → 1 and corner 0 → 2,
/// matching [`crate::geom::BBox::base_corners`]. `origin` is the object's
/// insertion point; the returned transform maps it onto the fitted plane and
/// rotates about that landing point.
pub fn compute_alignment<S: SceneQuery + ?Sized>(
    corners: [Point3; 4],
    origin: Point3,
    scene: &S,
    stop_at_ground: bool,
    tol: Tolerance,
) -> Option<Transform> {
    // Every corner must find ground.
    let mut hits = [Point3::ORIGIN; 4];
    for (index, corner) in corners.iter().enumerate() {
        match Ray::down_from(*corner).test(scene, stop_at_ground) {
            Some(hit) => hits[index] = hit.point,
            None => {
                log::debug!("alignment: no ground below corner {index}");
                return None;
            }
        }
    }

    let plane = match fit_plane(&hits, tol) {
        Ok(plane) => plane,
        Err(err) => {
            log::debug!("alignment: ground fit rejected: {err}");
            return None;
        }
    };

    // Project the original corners straight down onto the fitted plane. A
    // vertical plane leaves the drop direction parallel and fails the whole
    // alignment.
    let mut projected = [Point3::ORIGIN; 4];
    for (slot, corner) in projected.iter_mut().zip(corners) {
        match intersect_line_plane(corner, Vec3::DOWN, &plane, tol) {
            Some(point) => *slot = point,
            None => {
                log::debug!("alignment: fitted plane is vertical");
                return None;
            }
        }
    }

    // Rotation axes from the basis pairs; a parallel pair falls back to a
    // canonical perpendicular of the original edge. The 0→1 pair takes its
    // frame's second axis, the 0→2 pair the first.
    let vx1 = corners[1] - corners[0];
    let vx2 = projected[1] - projected[0];
    let axis_x = match nonzero(vx1.cross(vx2), tol) {
        Some(axis) => axis,
        None => vx1.orthonormal_frame()?.1,
    };
    let angle_x = vx1.angle_to(vx2);

    let vy1 = corners[2] - corners[0];
    let vy2 = projected[2] - projected[0];
    let axis_y = match nonzero(vy1.cross(vy2), tol) {
        Some(axis) => axis,
        None => vy1.orthonormal_frame()?.0,
    };
    let angle_y = vy1.angle_to(vy2);

    // The origin's own downward line meets the fitted plane, not the scene;
    // that landing point is both the translation target and the pivot of
    // both rotations.
    let placement = intersect_line_plane(origin, Vec3::DOWN, &plane, tol)?;
    let offset = placement - origin;

    let tt = Transform::translate(offset);
    let ty = Transform::rotate_about(placement, axis_y, angle_y)?;
    let tx = Transform::rotate_about(placement, axis_x, angle_x)?;

    // Applied right to left: translate, rotate about the 0→2 axis, then
    // rotate about the 0→1 axis.
    Some(tx.compose(ty).compose(tt))
}

fn nonzero(v: Vec3, tol: Tolerance) -> Option<Vec3> {
    if tol.is_zero_vec3(v) { None } else { Some(v) }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
