mod core;
mod plane;
mod scatter;

pub use core::{BBox, Point3, Tolerance, Transform, Vec3};
pub use plane::{
    Plane, PlaneFitError, fit_plane, intersect_line_plane, point_line_distance,
    project_to_plane,
};
pub use scatter::{sample_disc, spiral_sphere};

#[cfg(test)]
mod tests;
