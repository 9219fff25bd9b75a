//! Growing instances under tagged marker points.
//!
//! Walks an entity tree looking for marker points on matching layers, casts
//! each one straight down, and plants a randomly chosen candidate definition
//! at the landing point, scaled so it reaches back up to the marker. Markers
//! already sitting on the ground get a random size between the configured
//! bounds instead.
//!
//! Placements are collected during the walk and written afterwards, so new
//! instances never shadow a later cast.

use rand::Rng;
use regex::Regex;

use crate::geom::{Point3, Transform};
use crate::scene::{
    DefinitionId, DefinitionInfo, EntitySet, Ray, SceneQuery, SceneWriter,
};

/// Tuning for a grow pass.
#[derive(Debug, Clone)]
pub struct GrowOptions {
    /// Markers on layers matching this pattern participate. `None` matches
    /// every layer.
    pub layer_filter: Option<Regex>,
    /// Size range used when a marker already touches the ground.
    pub min_size: f64,
    pub max_size: f64,
    pub stop_at_ground: bool,
}

impl Default for GrowOptions {
    fn default() -> Self {
        Self {
            layer_filter: None,
            min_size: 5.0,
            max_size: 15.0,
            stop_at_ground: false,
        }
    }
}

impl GrowOptions {
    #[must_use]
    pub fn with_layer_filter(mut self, filter: Option<Regex>) -> Self {
        self.layer_filter = filter;
        self
    }

    #[must_use]
    pub fn with_sizes(mut self, min: f64, max: f64) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    #[must_use]
    pub fn with_stop_at_ground(mut self, stop: bool) -> Self {
        self.stop_at_ground = stop;
        self
    }
}

/// One instance to plant: which definition, and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowPlacement {
    pub definition: DefinitionId,
    pub transform: Transform,
}

/// Collects a placement for every matching marker with ground below it.
///
/// The walk recurses through nested instances, accumulating their transforms
/// so marker positions are evaluated in world space. Instances of the
/// candidate definitions themselves are never entered; whatever grows must
/// not grow again.
///
/// The scale stretches the definition's own height over the gap between
/// marker and ground. A marker with no gap draws a uniform size from
/// `[min_size, max_size]` instead. Definitions with no height are skipped.
pub fn grow_instances<S, R>(
    root: &EntitySet,
    candidates: &[DefinitionInfo],
    options: &GrowOptions,
    scene: &S,
    rng: &mut R,
) -> Vec<GrowPlacement>
where
    S: SceneQuery + ?Sized,
    R: Rng + ?Sized,
{
    let mut placements = Vec::new();
    if candidates.is_empty() {
        return placements;
    }
    collect_from_set(
        root,
        Transform::identity(),
        candidates,
        options,
        scene,
        rng,
        &mut placements,
    );
    placements
}

fn collect_from_set<S, R>(
    entities: &EntitySet,
    acc: Transform,
    candidates: &[DefinitionInfo],
    options: &GrowOptions,
    scene: &S,
    rng: &mut R,
    out: &mut Vec<GrowPlacement>,
) where
    S: SceneQuery + ?Sized,
    R: Rng + ?Sized,
{
    for marker in &entities.markers {
        let matches = options
            .layer_filter
            .as_ref()
            .is_none_or(|filter| filter.is_match(&marker.layer));
        if !matches {
            continue;
        }
        let world = acc.apply_point(marker.position);
        let Some(hit) = Ray::down_from(world).test(scene, options.stop_at_ground) else {
            continue;
        };

        let choice = &candidates[rng.random_range(0..candidates.len())];
        let depth = choice.bounds.depth();
        if depth <= 0.0 {
            log::warn!("grow: definition {:?} has no height, skipping", choice.id);
            continue;
        }

        let gap = world.distance_to(hit.point);
        let size = if gap > 0.0 {
            gap
        } else {
            options.min_size + rng.random::<f64>() * (options.max_size - options.min_size)
        };
        let transform = Transform::translate(hit.point - Point3::ORIGIN)
            .compose(Transform::uniform_scale(size / depth));
        out.push(GrowPlacement {
            definition: choice.id,
            transform,
        });
    }

    for instance in &entities.instances {
        if candidates.iter().any(|c| c.id == instance.definition) {
            continue;
        }
        collect_from_set(
            &instance.entities,
            acc.compose(instance.transform),
            candidates,
            options,
            scene,
            rng,
            out,
        );
    }
}

/// Plants collected placements in one transaction, assigning each new
/// instance to `layer`.
pub fn write_growth<W: SceneWriter + ?Sized>(
    writer: &mut W,
    placements: &[GrowPlacement],
    layer: &str,
) {
    writer.begin_transaction("Grow");
    for placement in placements {
        let id = writer.add_instance(placement.definition, placement.transform);
        writer.assign_layer(id, layer);
    }
    writer.commit_transaction();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
