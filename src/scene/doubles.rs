//! In-memory scene doubles for tests.
//!
//! `RiggedScene` models a single infinite surface plane with a configurable
//! containment path, which covers most placement scenarios. `ScriptedScene`
//! replays a fixed sequence of cast results for tests that need per-cast
//! control. `RecordingWriter` captures every mutation for assertions.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use crate::geom::{Plane, Point3, Transform, Vec3};

use super::{DefinitionId, EntityId, RayHit, SceneQuery, SceneWriter};

/// Forward-only intersection used by the plane-backed doubles. Hits at zero
/// distance are allowed; hits behind the origin are not.
fn forward_plane_hit(plane: &Plane, origin: Point3, direction: Vec3) -> Option<Point3> {
    let dir = direction.normalized()?;
    let n = plane.normal.normalized()?;
    let denom = n.dot(dir);
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = n.dot(plane.origin.sub_point(origin)) / denom;
    if t < 0.0 {
        return None;
    }
    Some(origin + dir.mul_scalar(t))
}

/// A scene whose geometry is one infinite plane. Every forward cast hits it
/// and reports the configured containment path.
#[derive(Debug)]
pub struct RiggedScene {
    pub plane: Plane,
    pub path: Vec<EntityId>,
    pub transforms: HashMap<EntityId, Transform>,
    pub normals: HashMap<EntityId, Vec3>,
    /// The `stop_at_ground` flag seen by the most recent cast.
    pub last_ground_flag: Cell<Option<bool>>,
}

impl RiggedScene {
    pub fn new(plane: Plane) -> Self {
        let leaf = EntityId(1);
        let mut normals = HashMap::new();
        normals.insert(leaf, plane.normal);
        Self {
            plane,
            path: vec![leaf],
            transforms: HashMap::new(),
            normals,
            last_ground_flag: Cell::new(None),
        }
    }

    /// Horizontal floor at the given height.
    pub fn flat(height: f64) -> Self {
        Self::new(Plane::new(Point3::new(0.0, 0.0, height), Vec3::Z))
    }

    #[must_use]
    pub fn with_path(mut self, path: Vec<EntityId>) -> Self {
        self.path = path;
        self
    }

    #[must_use]
    pub fn with_transform(mut self, id: EntityId, transform: Transform) -> Self {
        self.transforms.insert(id, transform);
        self
    }

    #[must_use]
    pub fn with_face_normal(mut self, id: EntityId, normal: Vec3) -> Self {
        self.normals.insert(id, normal);
        self
    }

    /// Drop all face normals, making every hit unorientable.
    #[must_use]
    pub fn without_normals(mut self) -> Self {
        self.normals.clear();
        self
    }
}

impl SceneQuery for RiggedScene {
    fn ray_test(&self, origin: Point3, direction: Vec3, stop_at_ground: bool) -> Option<RayHit> {
        self.last_ground_flag.set(Some(stop_at_ground));
        let point = forward_plane_hit(&self.plane, origin, direction)?;
        Some(RayHit::new(point, self.path.clone()))
    }

    fn entity_transform(&self, id: EntityId) -> Option<Transform> {
        self.transforms.get(&id).copied()
    }

    fn face_normal(&self, id: EntityId) -> Option<Vec3> {
        self.normals.get(&id).copied()
    }
}

/// Replays a fixed list of cast results in call order; casts beyond the
/// script miss.
#[derive(Debug)]
pub struct ScriptedScene {
    script: RefCell<VecDeque<Option<RayHit>>>,
}

impl ScriptedScene {
    pub fn new(results: Vec<Option<RayHit>>) -> Self {
        Self {
            script: RefCell::new(results.into()),
        }
    }
}

impl SceneQuery for ScriptedScene {
    fn ray_test(&self, _origin: Point3, _direction: Vec3, _stop: bool) -> Option<RayHit> {
        self.script.borrow_mut().pop_front().flatten()
    }

    fn entity_transform(&self, _id: EntityId) -> Option<Transform> {
        None
    }

    fn face_normal(&self, _id: EntityId) -> Option<Vec3> {
        None
    }
}

/// A scene with no geometry at all.
#[derive(Debug, Default)]
pub struct VoidScene;

impl SceneQuery for VoidScene {
    fn ray_test(&self, _origin: Point3, _direction: Vec3, _stop: bool) -> Option<RayHit> {
        None
    }

    fn entity_transform(&self, _id: EntityId) -> Option<Transform> {
        None
    }

    fn face_normal(&self, _id: EntityId) -> Option<Vec3> {
        None
    }
}

/// One recorded scene mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum WriterOp {
    Begin(String),
    Commit,
    PointMarker(Point3),
    LineMarker(Point3, Point3),
    Instance(DefinitionId, Transform),
    Layer(EntityId, String),
}

/// Captures mutations instead of applying them.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    pub ops: Vec<WriterOp>,
    next_entity: u64,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            next_entity: 1000,
        }
    }

    /// The placed instances, in insertion order.
    pub fn instances(&self) -> Vec<(DefinitionId, Transform)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                WriterOp::Instance(d, t) => Some((*d, *t)),
                _ => None,
            })
            .collect()
    }

    /// Whether the recorded ops form exactly one begin/commit pair wrapping
    /// everything else.
    pub fn single_transaction(&self) -> bool {
        matches!(self.ops.first(), Some(WriterOp::Begin(_)))
            && matches!(self.ops.last(), Some(WriterOp::Commit))
            && self
                .ops
                .iter()
                .filter(|op| matches!(op, WriterOp::Begin(_) | WriterOp::Commit))
                .count()
                == 2
    }
}

impl SceneWriter for RecordingWriter {
    fn begin_transaction(&mut self, name: &str) {
        self.ops.push(WriterOp::Begin(name.to_string()));
    }

    fn commit_transaction(&mut self) {
        self.ops.push(WriterOp::Commit);
    }

    fn add_point_marker(&mut self, point: Point3) {
        self.ops.push(WriterOp::PointMarker(point));
    }

    fn add_line_marker(&mut self, from: Point3, to: Point3) {
        self.ops.push(WriterOp::LineMarker(from, to));
    }

    fn add_instance(&mut self, definition: DefinitionId, transform: Transform) -> EntityId {
        self.next_entity += 1;
        self.ops.push(WriterOp::Instance(definition, transform));
        EntityId(self.next_entity)
    }

    fn assign_layer(&mut self, entity: EntityId, layer: &str) {
        self.ops.push(WriterOp::Layer(entity, layer.to_string()));
    }
}
