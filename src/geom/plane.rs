//! Best-fit planes from ray-hit point sets.
//!
//! Hit points collected by downward casts are noisy; the ground plane is the
//! least-squares plane minimizing total squared orthogonal distance, computed
//! from the centroid and the smallest-eigenvalue axis of the covariance
//! matrix. Exactly coplanar input reproduces its plane to floating tolerance.
//!
//! A fitted normal carries no orientation guarantee. Callers that care about
//! "up" must resolve the sign themselves.

use super::core::{Point3, Tolerance, Vec3};

/// A plane given by a point on it and a unit normal.
///
/// Planes are derived (fitted or supplied by a scene query), never authored
/// from user input directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: Point3,
    pub normal: Vec3,
}

impl Plane {
    #[must_use]
    pub const fn new(origin: Point3, normal: Vec3) -> Self {
        Self { origin, normal }
    }

    /// Signed distance from a point to the plane, positive on the normal
    /// side. Degenerate normals yield `0.0`.
    #[must_use]
    pub fn signed_distance_to(&self, p: Point3) -> f64 {
        match self.normal.normalized() {
            Some(n) => n.dot(p.sub_point(self.origin)),
            None => 0.0,
        }
    }

    /// Absolute distance from a point to the plane.
    #[must_use]
    pub fn distance_to(&self, p: Point3) -> f64 {
        self.signed_distance_to(p).abs()
    }
}

/// Errors from plane fitting.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlaneFitError {
    /// Not enough points to define a plane.
    #[error("insufficient points: {provided} provided, {required} required")]
    InsufficientPoints { provided: usize, required: usize },
    /// Points are collinear or coincident; no unique plane exists.
    #[error("degenerate point configuration: {reason}")]
    DegeneratePoints { reason: String },
}

/// Least-squares plane through an unordered point set of size ≥ 3.
///
/// The fit minimizes total squared orthogonal distance: centroid plus the
/// covariance eigenvector with the smallest eigenvalue. Collinear or
/// coincident input is rejected rather than producing a degenerate plane.
pub fn fit_plane(points: &[Point3], tol: Tolerance) -> Result<Plane, PlaneFitError> {
    if points.len() < 3 {
        return Err(PlaneFitError::InsufficientPoints {
            provided: points.len(),
            required: 3,
        });
    }

    // Centroid
    let n = points.len() as f64;
    let centroid = {
        let sum = points.iter().fold(Vec3::ZERO, |acc, p| {
            Vec3::new(acc.x + p.x, acc.y + p.y, acc.z + p.z)
        });
        Point3::new(sum.x / n, sum.y / n, sum.z / n)
    };

    // Covariance matrix (symmetric, so fill the upper triangle and mirror)
    let mut cov = [[0.0_f64; 3]; 3];
    for p in points {
        let d = p.sub_point(centroid);
        cov[0][0] += d.x * d.x;
        cov[0][1] += d.x * d.y;
        cov[0][2] += d.x * d.z;
        cov[1][1] += d.y * d.y;
        cov[1][2] += d.y * d.z;
        cov[2][2] += d.z * d.z;
    }
    cov[1][0] = cov[0][1];
    cov[2][0] = cov[0][2];
    cov[2][1] = cov[1][2];

    let normal = smallest_axis(&cov, tol)?;
    Ok(Plane::new(centroid, normal))
}

/// Eigenvector of the smallest eigenvalue: power iteration for the dominant
/// axis, then a closed-form eigensolve of the 2x2 restriction to its
/// orthogonal complement.
fn smallest_axis(cov: &[[f64; 3]; 3], tol: Tolerance) -> Result<Vec3, PlaneFitError> {
    let iterations = 30;

    // The trace is the total spread; none at all means every point sits on
    // the centroid.
    let trace = cov[0][0] + cov[1][1] + cov[2][2];
    if trace <= tol.eps {
        return Err(PlaneFitError::DegeneratePoints {
            reason: "points are coincident".to_string(),
        });
    }

    // Dominant axis: iterate from every basis vector and keep the run with
    // the largest Rayleigh quotient. A single fixed seed can start orthogonal
    // to the dominant axis and converge somewhere else entirely.
    let mut first = power_iteration(cov, Vec3::X, iterations);
    let mut spread = rayleigh_quotient(cov, first);
    for seed in [Vec3::Y, Vec3::Z] {
        let candidate = power_iteration(cov, seed, iterations);
        let quotient = rayleigh_quotient(cov, candidate);
        if quotient > spread {
            first = candidate;
            spread = quotient;
        }
    }
    let Some((u, v)) = first.orthonormal_frame() else {
        return Err(PlaneFitError::DegeneratePoints {
            reason: "points are coincident".to_string(),
        });
    };

    // Covariance restricted to the plane perpendicular to the dominant axis:
    // a symmetric 2x2 system with an exact solution.
    let mu = apply_sym3(cov, u);
    let mv = apply_sym3(cov, v);
    let a = u.dot(mu);
    let b = u.dot(mv);
    let c = v.dot(mv);
    let mid = (a + c) * 0.5;
    let half_gap = ((a - c) * 0.5).hypot(b);
    let second_value = mid + half_gap;
    let smallest_value = mid - half_gap;

    // All remaining spread along one line means no unique plane.
    if second_value <= tol.eps * spread {
        return Err(PlaneFitError::DegeneratePoints {
            reason: "points are collinear".to_string(),
        });
    }

    // In-plane eigenvector of the smallest eigenvalue, taking whichever
    // algebraic form is better conditioned, mapped back to 3D.
    let by_row = (b, smallest_value - a);
    let by_col = (smallest_value - c, b);
    let (p, q) = if by_row.0.hypot(by_row.1) >= by_col.0.hypot(by_col.1) {
        by_row
    } else {
        by_col
    };
    let normal = u.mul_scalar(p) + v.mul_scalar(q);
    // Equal in-plane eigenvalues leave the direction free; either axis works.
    Ok(normal.normalized().unwrap_or(u))
}

/// Power iteration for the dominant eigenvector of a symmetric 3x3 matrix.
fn power_iteration(m: &[[f64; 3]; 3], initial: Vec3, iterations: usize) -> Vec3 {
    let mut v = initial;
    for _ in 0..iterations {
        let mv = apply_sym3(m, v);
        v = mv.normalized().unwrap_or(mv);
    }
    v
}

/// Rayleigh quotient `vᵀMv / vᵀv` as an eigenvalue estimate.
fn rayleigh_quotient(m: &[[f64; 3]; 3], v: Vec3) -> f64 {
    v.dot(apply_sym3(m, v)) / v.dot(v).max(1e-12)
}

fn apply_sym3(m: &[[f64; 3]; 3], v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}

/// Orthogonal projection of a point onto a plane.
#[must_use]
pub fn project_to_plane(point: Point3, plane: &Plane) -> Point3 {
    match plane.normal.normalized() {
        Some(n) => {
            let d = n.dot(point.sub_point(plane.origin));
            point - n.mul_scalar(d)
        }
        None => point,
    }
}

/// Intersection of an infinite line with a plane.
///
/// Returns `None` when the line is parallel to the plane (the dot of the
/// direction with the normal vanishes) or when either vector is degenerate.
#[must_use]
pub fn intersect_line_plane(
    origin: Point3,
    direction: Vec3,
    plane: &Plane,
    tol: Tolerance,
) -> Option<Point3> {
    let dir = direction.normalized()?;
    let n = plane.normal.normalized()?;
    let denom = n.dot(dir);
    if tol.approx_zero_f64(denom) {
        return None;
    }
    let t = n.dot(plane.origin.sub_point(origin)) / denom;
    Some(origin + dir.mul_scalar(t))
}

/// Distance from a point to the infinite line through `a` and `b`.
/// Collapses to point distance when the line itself is degenerate.
#[must_use]
pub fn point_line_distance(point: Point3, a: Point3, b: Point3) -> f64 {
    let along = b.sub_point(a);
    let len = along.length();
    if len > 0.0 && len.is_finite() {
        point.sub_point(a).cross(along).length() / len
    } else {
        point.distance_to(a)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
