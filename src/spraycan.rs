//! Interactive spraycan placement.
//!
//! A [`SpraySession`] tracks one press-drag-release cycle of a spraycan
//! tool. While the pointer moves, the session keeps an emission ray aimed
//! from a standoff point above the cursor pick back at the surface. While
//! the button is held, bursts of rays scatter through a disc around the
//! pick point and every landing spot accumulates; releasing the button
//! plants one instance per accumulated point in a single transaction.
//!
//! Hold-to-spray timing follows a squeeze ramp: emissions start at one per
//! 0.1s and tighten to one per 0.01s over three seconds of holding. The
//! session never schedules anything itself. Each press or wake-up returns a
//! [`WakeRequest`] naming the delay until the next wake-up, and the host
//! calls [`SpraySession::wakeup`] with the request's token when the time
//! comes. Tokens go stale on release or deactivation, so a late timer
//! callback from a finished squeeze is ignored instead of spraying into the
//! next stroke.
//!
//! Time is a caller-supplied monotonic seconds value; the session does no
//! clock reads of its own.

use rand::Rng;

use crate::geom::{Point3, Transform, Vec3, sample_disc};
use crate::scene::{DefinitionId, Ray, RayHit, SceneQuery, SceneWriter};

/// Disc radius of a fresh session.
pub const DEFAULT_RADIUS: f64 = 20.0;

/// Rays per emission burst.
const SPRAY_DENSITY: usize = 2;
/// Seconds of holding until the emission interval bottoms out.
const RAMP_DURATION: f64 = 3.0;
const INTERVAL_SLOW: f64 = 0.1;
const INTERVAL_FAST: f64 = 0.01;
/// Minimum seconds between a drag-move emission and the one before it.
const DRAG_COOLDOWN: f64 = 0.1;
/// Standoff distance of the emission source, in radii.
const SOURCE_STANDOFF: f64 = 2.0;

/// Pointer state relevant to a move event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerFlags {
    /// Primary button held down.
    pub primary: bool,
    /// Modifier that locks the current surface normal.
    pub constrain: bool,
}

/// Identifies one press's wake-up chain. Stale tokens are rejected by
/// [`SpraySession::wakeup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeToken(u64);

/// Ask the host to call [`SpraySession::wakeup`] with `token` after `delay`
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WakeRequest {
    pub delay: f64,
    pub token: WakeToken,
}

/// State of one spraycan stroke cycle.
#[derive(Debug)]
pub struct SpraySession {
    definitions: Vec<DefinitionId>,
    radius: f64,
    normal: Vec3,
    pick_point: Option<Point3>,
    source_point: Option<Point3>,
    emission_ray: Option<Ray>,
    accumulated: Vec<Point3>,
    last_emission: Vec<Point3>,
    pressed_at: Option<f64>,
    last_spray_at: Option<f64>,
    generation: u64,
}

impl SpraySession {
    /// A session planting instances of `definitions`, chosen uniformly at
    /// commit time.
    #[must_use]
    pub fn new(definitions: Vec<DefinitionId>) -> Self {
        Self {
            definitions,
            radius: DEFAULT_RADIUS,
            normal: Vec3::Z,
            pick_point: None,
            source_point: None,
            emission_ray: None,
            accumulated: Vec::new(),
            last_emission: Vec::new(),
            pressed_at: None,
            last_spray_at: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Last surface point under the cursor, if any.
    #[must_use]
    pub fn pick_point(&self) -> Option<Point3> {
        self.pick_point
    }

    /// Emission source, two radii above the pick point along the normal.
    #[must_use]
    pub fn source_point(&self) -> Option<Point3> {
        self.source_point
    }

    /// Every landing point collected since the last commit.
    #[must_use]
    pub fn accumulated(&self) -> &[Point3] {
        &self.accumulated
    }

    /// Landing points of the most recent burst only.
    #[must_use]
    pub fn last_emission(&self) -> &[Point3] {
        &self.last_emission
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pointer events
    // ─────────────────────────────────────────────────────────────────────

    /// Updates the aim from a cursor pick and, while the primary button is
    /// held, emits a burst if the drag cooldown has passed.
    ///
    /// Without `constrain`, the surface normal is rederived from the pick:
    /// the leaf entity's face normal carried through the transforms of the
    /// containing path, or world up when the leaf has no face normal. With
    /// `constrain`, the previous normal stays locked. A `None` pick keeps
    /// the previous aim entirely.
    pub fn pointer_moved<S, R>(
        &mut self,
        now: f64,
        pick: Option<&RayHit>,
        flags: PointerFlags,
        scene: &S,
        rng: &mut R,
    ) where
        S: SceneQuery + ?Sized,
        R: Rng + ?Sized,
    {
        if let Some(hit) = pick {
            if !flags.constrain {
                self.normal = derive_normal(hit, scene);
            }
            self.retarget(hit.point);
        }

        if flags.primary {
            let cooled = self
                .last_spray_at
                .is_none_or(|last| now - last > DRAG_COOLDOWN);
            if cooled {
                self.emit(now, scene, rng);
            }
        }
    }

    /// Starts a squeeze: emits immediately and returns the first wake-up
    /// request. Any previous wake-up chain goes stale.
    pub fn pointer_pressed<S, R>(&mut self, now: f64, scene: &S, rng: &mut R) -> WakeRequest
    where
        S: SceneQuery + ?Sized,
        R: Rng + ?Sized,
    {
        self.generation += 1;
        self.pressed_at = Some(now);
        self.emit(now, scene, rng);
        WakeRequest {
            delay: emission_interval(0.0),
            token: WakeToken(self.generation),
        }
    }

    /// Timer callback for a scheduled wake-up. Emits a burst and returns
    /// the next request, or `None` when the token is stale or the button
    /// has been released, which ends the chain.
    pub fn wakeup<S, R>(
        &mut self,
        token: WakeToken,
        now: f64,
        scene: &S,
        rng: &mut R,
    ) -> Option<WakeRequest>
    where
        S: SceneQuery + ?Sized,
        R: Rng + ?Sized,
    {
        if token.0 != self.generation {
            log::debug!("spraycan: dropping stale wakeup");
            return None;
        }
        let pressed_at = self.pressed_at?;
        self.emit(now, scene, rng);
        Some(WakeRequest {
            delay: emission_interval(now - pressed_at),
            token,
        })
    }

    /// Ends the squeeze and plants everything collected: one instance per
    /// accumulated point, definition chosen uniformly per point, placed by
    /// translation only, all inside a single "Spraycan" transaction.
    pub fn pointer_released<W, R>(&mut self, writer: &mut W, rng: &mut R)
    where
        W: SceneWriter + ?Sized,
        R: Rng + ?Sized,
    {
        self.generation += 1;
        self.pressed_at = None;
        self.last_emission.clear();

        let points = std::mem::take(&mut self.accumulated);
        writer.begin_transaction("Spraycan");
        if !self.definitions.is_empty() {
            for point in points {
                let index = rng.random_range(0..self.definitions.len());
                let transform = Transform::translate(point - Point3::ORIGIN);
                writer.add_instance(self.definitions[index], transform);
            }
        }
        writer.commit_transaction();
    }

    /// Applies a radius typed into the measurement box. Input that fails to
    /// parse as a positive number keeps the previous radius; either way the
    /// aim is rebuilt against the current pick so the standoff matches.
    pub fn set_radius_text(&mut self, text: &str) {
        match text.trim().parse::<f64>() {
            Ok(radius) if radius.is_finite() && radius > 0.0 => self.radius = radius,
            _ => log::debug!("spraycan: keeping radius {} over {text:?}", self.radius),
        }
        if let Some(pick) = self.pick_point {
            self.retarget(pick);
        }
    }

    /// Invalidates pending wake-ups and drops uncommitted state. Nothing is
    /// planted.
    pub fn deactivate(&mut self) {
        self.generation += 1;
        self.pressed_at = None;
        self.last_spray_at = None;
        self.accumulated.clear();
        self.last_emission.clear();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Emission
    // ─────────────────────────────────────────────────────────────────────

    /// Rebuilds source point and emission ray for a pick point under the
    /// current normal and radius.
    fn retarget(&mut self, pick: Point3) {
        let source = pick.offset(self.normal, self.radius * SOURCE_STANDOFF);
        self.pick_point = Some(pick);
        self.source_point = Some(source);
        self.emission_ray = Some(Ray::new(source, pick - source));
    }

    /// One burst: scatter a disc of targets around the pick point and cast
    /// a ray from the source through each, collecting the hits. A no-op
    /// until a pick has established the emission ray.
    fn emit<S, R>(&mut self, now: f64, scene: &S, rng: &mut R)
    where
        S: SceneQuery + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(ray) = self.emission_ray else {
            return;
        };
        let Some(unit) = ray.direction.normalized() else {
            return;
        };
        self.last_spray_at = Some(now);

        // Disc frame sits at the pick point, facing down the emission ray.
        let target = ray.origin + ray.direction;
        let Some((axis_x, axis_y)) = unit.orthonormal_frame() else {
            return;
        };
        let frame = Transform::from_axes(target, axis_x, axis_y, unit);

        let mut hits = Vec::with_capacity(SPRAY_DENSITY);
        for (x, y) in sample_disc(self.radius, SPRAY_DENSITY, false, rng) {
            let through = frame.apply_point(Point3::new(x, y, 0.0));
            let spray = Ray::new(ray.origin, through - ray.origin);
            if let Some(hit) = spray.test(scene, false) {
                hits.push(hit.point);
            }
        }
        self.accumulated.extend_from_slice(&hits);
        self.last_emission = hits;
    }
}

/// Interval until the next emission, `elapsed` seconds into a squeeze.
/// Ramps linearly from [`INTERVAL_SLOW`] down to [`INTERVAL_FAST`] over
/// [`RAMP_DURATION`], clamped at both ends.
fn emission_interval(elapsed: f64) -> f64 {
    let ramp = (elapsed / RAMP_DURATION).clamp(0.0, 1.0);
    INTERVAL_SLOW - ramp * (INTERVAL_SLOW - INTERVAL_FAST)
}

/// Surface normal for a pick: the leaf's face normal pushed through the
/// transforms of its containing path, or world up when the leaf is not a
/// face.
fn derive_normal<S: SceneQuery + ?Sized>(hit: &RayHit, scene: &S) -> Vec3 {
    let Some((leaf, rest)) = hit.path.split_last() else {
        return Vec3::Z;
    };
    let Some(face_normal) = scene.face_normal(*leaf) else {
        return Vec3::Z;
    };
    let mut chain = Transform::identity();
    for id in rest {
        if let Some(transform) = scene.entity_transform(*id) {
            chain = chain.compose(transform);
        }
    }
    chain.apply_vec(face_normal)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
