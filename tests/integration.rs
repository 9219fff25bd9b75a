use raycast_engine::geom::{BBox, Plane, Point3, Tolerance, Transform, Vec3};
use raycast_engine::place::{
    GrowOptions, compute_alignment, drop_points_move, fit_by_sampled_geometry, grow_instances,
    spray_rays, write_growth, write_traces,
};
use raycast_engine::scene::{
    DefinitionId, DefinitionInfo, EntityId, EntitySet, MarkerPoint, Ray, RayHit, SceneQuery,
    SceneWriter,
};
use raycast_engine::spraycan::{PointerFlags, SpraySession};

fn seeded(seed: u64) -> rand::prelude::StdRng {
    rand::SeedableRng::seed_from_u64(seed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Scene doubles
// ─────────────────────────────────────────────────────────────────────────────

/// An infinite terrain plane, optionally with a hole past some x.
struct TerrainScene {
    plane: Plane,
    hole_beyond_x: Option<f64>,
}

impl TerrainScene {
    fn new(plane: Plane) -> Self {
        Self {
            plane,
            hole_beyond_x: None,
        }
    }

    fn flat(height: f64) -> Self {
        Self::new(Plane::new(Point3::new(0.0, 0.0, height), Vec3::Z))
    }

    fn with_hole_beyond_x(mut self, x: f64) -> Self {
        self.hole_beyond_x = Some(x);
        self
    }
}

impl SceneQuery for TerrainScene {
    fn ray_test(&self, origin: Point3, direction: Vec3, _stop_at_ground: bool) -> Option<RayHit> {
        if let Some(limit) = self.hole_beyond_x {
            if origin.x > limit {
                return None;
            }
        }
        let unit = direction.normalized()?;
        let denom = unit.dot(self.plane.normal);
        if denom.abs() < 1e-12 {
            return None;
        }
        let t = self.plane.origin.sub_point(origin).dot(self.plane.normal) / denom;
        if t < 0.0 {
            return None;
        }
        Some(RayHit::new(
            origin.add_vec(unit.mul_scalar(t)),
            vec![EntityId(1)],
        ))
    }

    fn entity_transform(&self, _id: EntityId) -> Option<Transform> {
        None
    }

    fn face_normal(&self, id: EntityId) -> Option<Vec3> {
        (id == EntityId(1)).then_some(self.plane.normal)
    }
}

#[derive(Debug)]
enum Event {
    Begin(String),
    Commit,
    Point(Point3),
    Line(Point3, Point3),
    Instance(DefinitionId, Transform),
    Layer(EntityId, String),
}

/// Records writer calls for inspection.
#[derive(Default)]
struct ProbeWriter {
    events: Vec<Event>,
    next_id: u64,
}

impl SceneWriter for ProbeWriter {
    fn begin_transaction(&mut self, name: &str) {
        self.events.push(Event::Begin(name.to_owned()));
    }

    fn commit_transaction(&mut self) {
        self.events.push(Event::Commit);
    }

    fn add_point_marker(&mut self, point: Point3) {
        self.events.push(Event::Point(point));
    }

    fn add_line_marker(&mut self, from: Point3, to: Point3) {
        self.events.push(Event::Line(from, to));
    }

    fn add_instance(&mut self, definition: DefinitionId, transform: Transform) -> EntityId {
        self.next_id += 1;
        self.events.push(Event::Instance(definition, transform));
        EntityId(self.next_id)
    }

    fn assign_layer(&mut self, entity: EntityId, layer: &str) {
        self.events.push(Event::Layer(entity, layer.to_owned()));
    }
}

impl ProbeWriter {
    fn one_transaction_named(&self, name: &str) -> bool {
        matches!(self.events.first(), Some(Event::Begin(n)) if n == name)
            && matches!(self.events.last(), Some(Event::Commit))
            && self
                .events
                .iter()
                .filter(|e| matches!(e, Event::Begin(_) | Event::Commit))
                .count()
                == 2
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Alignment and dropping
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn footprint_alignment_lands_on_tilted_ground() {
    let tol = Tolerance::DEFAULT;
    // Ground rising 0.05 per unit of y.
    let normal = Vec3::new(0.0, -0.05, 1.0).normalized().unwrap();
    let scene = TerrainScene::new(Plane::new(Point3::ORIGIN, normal));

    let bounds = BBox::new(Point3::new(0.0, 0.0, 5.0), Point3::new(2.0, 2.0, 6.0));
    let origin = Point3::new(0.0, 0.0, 5.0);
    let transform =
        compute_alignment(bounds.base_corners(), origin, &scene, false, tol).expect("aligns");

    for corner in bounds.base_corners() {
        let landed = transform.apply_point(corner);
        assert!(
            scene.plane.distance_to(landed) < 1e-9,
            "corner {corner:?} off the ground by {}",
            scene.plane.distance_to(landed)
        );
    }
    // The origin drops straight down onto the plane.
    assert!(tol.approx_eq_point3(transform.apply_point(origin), Point3::ORIGIN));
}

#[test]
fn alignment_is_all_or_nothing() {
    // The far corners hang over the hole, so nothing is aligned at all.
    let scene = TerrainScene::flat(0.0).with_hole_beyond_x(1.0);
    let bounds = BBox::new(Point3::new(0.0, 0.0, 5.0), Point3::new(2.0, 2.0, 6.0));
    let origin = Point3::new(1.0, 1.0, 5.0);

    assert!(
        compute_alignment(bounds.base_corners(), origin, &scene, false, Tolerance::DEFAULT)
            .is_none()
    );

    // Shrunk to solid ground the same call succeeds.
    let solid = BBox::new(Point3::new(0.0, 0.0, 5.0), Point3::new(0.9, 2.0, 6.0));
    assert!(
        compute_alignment(
            solid.base_corners(),
            origin,
            &TerrainScene::flat(0.0).with_hole_beyond_x(1.0),
            false,
            Tolerance::DEFAULT
        )
        .is_some()
    );
}

#[test]
fn dropped_points_translate_onto_the_ground() {
    let normal = Vec3::new(0.1, 0.0, 1.0).normalized().unwrap();
    let scene = TerrainScene::new(Plane::new(Point3::ORIGIN, normal)).with_hole_beyond_x(5.0);

    let points = [
        Point3::new(0.0, 0.0, 10.0),
        Point3::new(9.0, 0.0, 10.0), // over the hole
        Point3::new(2.0, 3.0, 10.0),
    ];
    let moves = drop_points_move(&points, &scene, false);

    // Index 1 had nothing below it; the survivors keep their own indexes.
    assert_eq!(moves.len(), 2);
    assert_eq!(moves[0].0, 0);
    assert_eq!(moves[1].0, 2);
    for (index, offset) in &moves {
        let landed = points[*index].add_vec(*offset);
        assert!(scene.plane.distance_to(landed) < 1e-9);
        // Straight drop: only z moves.
        assert!(offset.x.abs() < 1e-12 && offset.y.abs() < 1e-12);
    }
}

#[test]
fn sampled_ground_fit_prefers_near_noncollinear_anchors() {
    let scene = TerrainScene::flat(0.0);
    // The three closest hits line up along y = 0; the fourth breaks the
    // line and must become the third anchor.
    let samples = [
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 2.0),
        Point3::new(2.0, 0.0, 3.0),
        Point3::new(0.0, 1.0, 4.0),
    ];

    let fit = fit_by_sampled_geometry(&samples, None, &scene, false, Tolerance::LOOSE)
        .expect("fit exists");

    assert_eq!(fit.anchors[0].hit, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(fit.anchors[1].hit, Point3::new(1.0, 0.0, 0.0));
    assert_eq!(fit.anchors[2].hit, Point3::new(0.0, 1.0, 0.0));
    assert!(fit.plane.distance_to(Point3::new(5.0, 5.0, 0.0)) < 1e-9);
}

// ─────────────────────────────────────────────────────────────────────────────
// Spraycan stroke
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn spraycan_stroke_accumulates_then_plants() {
    let scene = TerrainScene::flat(0.0);
    let mut session = SpraySession::new(vec![DefinitionId(7), DefinitionId(8)]);
    let mut rng = seeded(21);

    let pick = Ray::down_from(Point3::new(0.0, 0.0, 30.0))
        .test(&scene, false)
        .expect("pick");
    session.pointer_moved(0.0, Some(&pick), PointerFlags::default(), &scene, &mut rng);

    let mut request = session.pointer_pressed(0.0, &scene, &mut rng);
    let mut now = 0.0;
    let mut last_delay = f64::INFINITY;
    for _ in 0..4 {
        assert!(request.delay <= last_delay, "squeeze must not slow down");
        last_delay = request.delay;
        now += request.delay;
        request = session
            .wakeup(request.token, now, &scene, &mut rng)
            .expect("held squeeze keeps waking");
    }
    let collected = session.accumulated().len();
    assert_eq!(collected, 10, "five bursts of two rays, all of which land");

    let mut writer = ProbeWriter::default();
    session.pointer_released(&mut writer, &mut rng);

    assert!(writer.one_transaction_named("Spraycan"));
    let planted = writer
        .events
        .iter()
        .filter(|e| matches!(e, Event::Instance(_, _)))
        .count();
    assert_eq!(planted, collected);
    assert!(session.accumulated().is_empty());

    // The finished stroke's token is dead.
    assert!(session.wakeup(request.token, now + 1.0, &scene, &mut rng).is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Growing and spraying
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn grow_plants_between_marker_and_ground() {
    let scene = TerrainScene::flat(0.0);
    let mut root = EntitySet::default();
    root.markers.push(MarkerPoint {
        position: Point3::new(4.0, 4.0, 8.0),
        layer: "6113".to_owned(),
    });
    root.markers.push(MarkerPoint {
        position: Point3::new(5.0, 5.0, 6.0),
        layer: "roads".to_owned(),
    });

    let candidates = [DefinitionInfo {
        id: DefinitionId(3),
        bounds: BBox::new(Point3::ORIGIN, Point3::new(1.0, 1.0, 2.0)),
    }];
    let options = GrowOptions::default()
        .with_layer_filter(Some(regex::Regex::new("6113").unwrap()));

    let placements = grow_instances(&root, &candidates, &options, &scene, &mut seeded(17));
    assert_eq!(placements.len(), 1, "only the filtered layer grows");

    // The definition's 2-unit height is stretched over the 8-unit gap.
    let top = placements[0].transform.apply_point(Point3::new(0.0, 0.0, 2.0));
    assert!(Tolerance::DEFAULT.approx_eq_point3(top, Point3::new(4.0, 4.0, 8.0)));

    let mut writer = ProbeWriter::default();
    write_growth(&mut writer, &placements, "Vegetation");
    assert!(writer.one_transaction_named("Grow"));
    assert!(
        writer
            .events
            .iter()
            .any(|e| matches!(e, Event::Layer(_, layer) if layer == "Vegetation"))
    );
}

#[test]
fn spray_rays_trace_only_what_they_hit() {
    let scene = TerrainScene::flat(0.0);
    let source = Point3::new(0.0, 0.0, 4.0);

    let traces = spray_rays(&[source], 30, &scene, false);
    assert_eq!(traces.len(), 15, "only the downward hemisphere lands");

    let mut writer = ProbeWriter::default();
    write_traces(&mut writer, "Trace Ray Spray", &traces);
    assert!(writer.one_transaction_named("Trace Ray Spray"));

    // Each trace writes its landing marker and then the ray line.
    let mut markers = 0;
    for pair in writer.events[1..writer.events.len() - 1].chunks(2) {
        match pair {
            [Event::Point(hit), Event::Line(from, to)] => {
                assert_eq!(from, &source);
                assert_eq!(to, hit);
                markers += 1;
            }
            other => panic!("unexpected event pair {other:?}"),
        }
    }
    assert_eq!(markers, 15);
}
