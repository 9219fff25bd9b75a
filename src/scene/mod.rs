//! Host-scene boundary: the queries this engine consumes and the mutations it
//! hands back.
//!
//! The engine never owns scene storage. First-hit ray queries, entity
//! introspection and scene writes are trait seams implemented by the
//! embedding host; the engine only composes them. Tests use small in-memory
//! doubles instead of a real scene graph.
//!
//! Scene casts are forward-only: a `ray_test` reports the nearest surface in
//! the ray's own direction or nothing at all, and nothing is never an error.

use crate::geom::{BBox, Point3, Transform, Vec3};

#[cfg(test)]
pub mod doubles;

/// Identifier of a scene entity (instance, group, face or marker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Identifier of a reusable object definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefinitionId(pub u64);

/// Result of a scene cast: the hit point plus the ordered containment path
/// of the surface that was struck, outermost entity first, the leaf last.
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    pub point: Point3,
    pub path: Vec<EntityId>,
}

impl RayHit {
    #[must_use]
    pub fn new(point: Point3, path: Vec<EntityId>) -> Self {
        Self { point, path }
    }

    /// The innermost entity on the containment path.
    #[must_use]
    pub fn leaf(&self) -> Option<EntityId> {
        self.path.last().copied()
    }

    /// Whether the containment path traverses the given entity. Used to
    /// filter out rays that struck the object that cast them.
    #[must_use]
    pub fn involves(&self, id: EntityId) -> bool {
        self.path.contains(&id)
    }
}

/// A directed single-hit scene query. Immutable once constructed; the
/// direction need not be unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub const fn new(origin: Point3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// A ray from `origin` straight down.
    #[must_use]
    pub const fn down_from(origin: Point3) -> Self {
        Self::new(origin, Vec3::DOWN)
    }

    /// Cast against the scene. With `stop_at_ground` set the query is
    /// restricted to the host's designated ground surface category; the flag
    /// passes through untouched. A miss is a normal outcome.
    pub fn test<S: SceneQuery + ?Sized>(&self, scene: &S, stop_at_ground: bool) -> Option<RayHit> {
        scene.ray_test(self.origin, self.direction, stop_at_ground)
    }
}

/// Read access to the host scene.
pub trait SceneQuery {
    /// Nearest forward hit of a ray against the scene's surfaces, or `None`.
    /// `stop_at_ground` restricts the query to the designated ground
    /// category, however the host defines that.
    fn ray_test(&self, origin: Point3, direction: Vec3, stop_at_ground: bool) -> Option<RayHit>;

    /// Local placement transform of an entity, for entities that carry one
    /// (instances and groups). Faces and markers return `None`.
    fn entity_transform(&self, id: EntityId) -> Option<Transform>;

    /// Local normal of a face entity. Non-face entities, and faces without
    /// an orientable normal, return `None`.
    fn face_normal(&self, id: EntityId) -> Option<Vec3>;
}

/// Write access to the host scene. Mutations between a `begin_transaction`
/// and `commit_transaction` pair form one undoable step on the host side.
pub trait SceneWriter {
    fn begin_transaction(&mut self, name: &str);
    fn commit_transaction(&mut self);

    /// Add a construction-point marker.
    fn add_point_marker(&mut self, point: Point3);

    /// Add a construction-line marker between two points.
    fn add_line_marker(&mut self, from: Point3, to: Point3);

    /// Place an instance of a definition and return its new entity id.
    fn add_instance(&mut self, definition: DefinitionId, transform: Transform) -> EntityId;

    /// Move an entity onto a named layer.
    fn assign_layer(&mut self, entity: EntityId, layer: &str);
}

/// A placeable definition as introspected from the host, with its local
/// bounds. The vertical extent of `bounds` is the definition's depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefinitionInfo {
    pub id: DefinitionId,
    pub bounds: BBox,
}

/// A construction-point marker inside an entity set, in local coordinates of
/// the set that holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPoint {
    pub position: Point3,
    pub layer: String,
}

/// The contents of one entity container: loose markers plus nested
/// instances. The model root and every definition are both entity sets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntitySet {
    pub markers: Vec<MarkerPoint>,
    pub instances: Vec<InstanceNode>,
}

/// An instance in the scene tree: its placement within the parent set and
/// the entity set of its definition.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceNode {
    pub id: EntityId,
    pub definition: DefinitionId,
    pub transform: Transform,
    pub entities: EntitySet,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
