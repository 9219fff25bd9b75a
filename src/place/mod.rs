mod align;
mod drop;
mod grow;
mod sampled;
mod spray;

pub use align::compute_alignment;
pub use drop::{
    DropTrace, drop_instances, drop_points_move, drop_points_trace, write_traces,
};
pub use grow::{GrowOptions, GrowPlacement, grow_instances, write_growth};
pub use sampled::{GroundAnchor, GroundFit, fit_by_sampled_geometry};
pub use spray::{SPRAY_CONFIRM_THRESHOLD, spray_rays};
