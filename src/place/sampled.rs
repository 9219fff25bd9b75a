//! Ground fit from sampled object geometry.
//!
//! Instead of the four footprint corners, sample points taken from the
//! object's own geometry are cast down individually and a ground plane is
//! fitted through a chosen anchor triple: the two closest hits plus the
//! first hit beyond them that is not collinear with those two. Hits against
//! the object itself are discarded before any selection.
//!
//! The anchor selection deliberately favours near geometry over a
//! best-overall fit. Work in progress: the triple and its plane are
//! reported as-is, deriving an orientation from them is not done here.

use crate::geom::{Plane, Point3, Tolerance, fit_plane, point_line_distance};
use crate::scene::{EntityId, Ray, SceneQuery};

/// One surviving down-cast: where it started, where it landed, and how far
/// it travelled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundAnchor {
    pub origin: Point3,
    pub hit: Point3,
    pub distance: f64,
}

/// The selected anchor triple and the plane through its hit points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundFit {
    /// Ordered by selection: the two closest hits, then the first
    /// non-collinear one.
    pub anchors: [GroundAnchor; 3],
    pub plane: Plane,
}

/// Casts every sample point straight down and fits a ground plane through
/// the anchor triple, or `None` when fewer than three casts survive or no
/// third hit escapes the line through the first two.
///
/// `subject` names the object the samples came from; hits whose path
/// involves it are its own geometry and are skipped silently.
pub fn fit_by_sampled_geometry<S: SceneQuery + ?Sized>(
    samples: &[Point3],
    subject: Option<EntityId>,
    scene: &S,
    stop_at_ground: bool,
    tol: Tolerance,
) -> Option<GroundFit> {
    let mut candidates: Vec<GroundAnchor> = Vec::with_capacity(samples.len());
    for sample in samples {
        let Some(hit) = Ray::down_from(*sample).test(scene, stop_at_ground) else {
            continue;
        };
        if let Some(id) = subject {
            if hit.involves(id) {
                log::debug!("sampled fit: discarding self hit below {sample:?}");
                continue;
            }
        }
        candidates.push(GroundAnchor {
            origin: *sample,
            hit: hit.point,
            distance: sample.distance_to(hit.point),
        });
    }

    if candidates.len() < 3 {
        log::debug!(
            "sampled fit: {} usable hits, need at least 3",
            candidates.len()
        );
        return None;
    }

    // Stable sort keeps the input order among equal distances.
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    // The two closest hits anchor the fit; the third is the nearest one
    // that does not sit on the line through them.
    let third = candidates[2..].iter().position(|candidate| {
        point_line_distance(candidate.hit, candidates[0].hit, candidates[1].hit) > tol.eps
    })?;
    let anchors = [candidates[0], candidates[1], candidates[2 + third]];

    let plane = match fit_plane(&[anchors[0].hit, anchors[1].hit, anchors[2].hit], tol) {
        Ok(plane) => plane,
        Err(err) => {
            log::debug!("sampled fit: anchor plane rejected: {err}");
            return None;
        }
    };

    Some(GroundFit { anchors, plane })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
